//! Component registry.
//!
//! The static list of fragments a page may receive, keyed by placeholder id.

use serde::{Deserialize, Serialize};

/// Placeholder id of the site header.
pub const HEADER_COMPONENT: &str = "header-component";
/// Placeholder id of the site footer.
pub const FOOTER_COMPONENT: &str = "footer-component";
/// Placeholder id of the mobile navigation drawer.
pub const MOBILE_NAV_COMPONENT: &str = "mobile-nav-component";
/// Placeholder id of the sidebar.
pub const SIDEBAR_COMPONENT: &str = "sidebar-component";
/// Placeholder id of shared page elements (search popup, scroll-to-top).
pub const COMMON_ELEMENTS_COMPONENT: &str = "common-elements-component";

/// Highest priority value that still counts as layout-critical.
pub const HIGH_PRIORITY_THRESHOLD: u32 = 2;

/// One fragment to load into one placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDescriptor {
    /// Id of the placeholder element.
    pub element_id: String,
    /// Fragment path, relative to the fragment source.
    pub path: String,
    /// Lower loads earlier. See [`HIGH_PRIORITY_THRESHOLD`].
    pub priority: u32,
}

impl ComponentDescriptor {
    /// Create a descriptor.
    pub fn new(element_id: impl Into<String>, path: impl Into<String>, priority: u32) -> Self {
        Self { element_id: element_id.into(), path: path.into(), priority }
    }

    /// Loading tier derived from the priority.
    pub fn tier(&self) -> PriorityTier {
        if self.priority <= HIGH_PRIORITY_THRESHOLD { PriorityTier::High } else { PriorityTier::Low }
    }
}

/// Coarse loading class used by the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    /// Awaited before the page counts as ready.
    High,
    /// Loaded in the background.
    Low,
}

impl PriorityTier {
    /// Get the string representation of the tier.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Low => "low",
        }
    }
}

/// Ordered set of component descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRegistry {
    components: Vec<ComponentDescriptor>,
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new(vec![
            ComponentDescriptor::new(HEADER_COMPONENT, "components/header.html", 1),
            ComponentDescriptor::new(FOOTER_COMPONENT, "components/footer.html", 2),
            ComponentDescriptor::new(MOBILE_NAV_COMPONENT, "components/mobile-nav.html", 3),
            ComponentDescriptor::new(SIDEBAR_COMPONENT, "components/sidebar.html", 4),
            ComponentDescriptor::new(
                COMMON_ELEMENTS_COMPONENT,
                "components/common-elements.html",
                5,
            ),
        ])
    }
}

impl ComponentRegistry {
    /// Build a registry, ordered by priority. Ties keep their given order.
    pub fn new(mut components: Vec<ComponentDescriptor>) -> Self {
        components.sort_by_key(|component| component.priority);
        Self { components }
    }

    /// All descriptors in priority order.
    pub fn components(&self) -> &[ComponentDescriptor] {
        &self.components
    }

    /// Look up the descriptor for a placeholder id.
    pub fn get(&self, element_id: &str) -> Option<&ComponentDescriptor> {
        self.components.iter().find(|component| component.element_id == element_id)
    }

    /// Split into (high, low) tiers, each in priority order.
    pub fn partition(&self) -> (Vec<ComponentDescriptor>, Vec<ComponentDescriptor>) {
        self.components.iter().cloned().partition(|component| component.tier() == PriorityTier::High)
    }

    /// Number of descriptors.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
