//! Mobile navigation drawer toggle.
//!
//! The drawer is collapsed or expanded, as recorded by the `expanded` class on
//! the wrapper. Installation happens at most once per runtime and hands back a
//! [`MobileNavHandle`]; clicks are delivered through that handle, so there is
//! exactly one handler per toggler no matter how often installation is
//! attempted.

use crate::dom::Document;
use std::sync::OnceLock;
use tracing::{debug, info};

/// Class of elements that open or close the drawer.
pub const TOGGLER_CLASS: &str = "mobile-nav__toggler";
/// Class of the drawer wrapper.
pub const WRAPPER_CLASS: &str = "mobile-nav__wrapper";
/// Class of the backdrop behind the open drawer.
pub const OVERLAY_CLASS: &str = "mobile-nav__overlay";
/// Wrapper class present while the drawer is open.
pub const EXPANDED_CLASS: &str = "expanded";
/// Wrapper class present while a transition is running.
pub const ANIMATING_CLASS: &str = "animating";
/// Body class locking page scroll while the drawer is open.
pub const LOCKED_CLASS: &str = "locked";
/// Overlay class present while the drawer is open.
pub const OVERLAY_ACTIVE_CLASS: &str = "active";

/// Drawer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MobileNavState {
    /// Drawer closed.
    Collapsed,
    /// Drawer open.
    Expanded,
}

impl MobileNavState {
    /// Read the state from the document.
    pub fn of(document: &Document) -> Self {
        match document.first_by_class(WRAPPER_CLASS) {
            Some(wrapper) if document.has_class(wrapper, EXPANDED_CLASS) => Self::Expanded,
            _ => Self::Collapsed,
        }
    }
}

/// One-shot installer for the drawer toggle.
#[derive(Debug, Default)]
pub struct MobileNavToggle {
    handle: OnceLock<MobileNavHandle>,
}

impl MobileNavToggle {
    /// Create an uninstalled toggle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the toggle against the togglers currently in `document`.
    ///
    /// Returns the handle on the first call and `None` on every later call.
    /// Installation completes even if the document has no togglers yet.
    pub fn install(&self, document: &Document) -> Option<MobileNavHandle> {
        let mut installed_now = false;
        let handle = self.handle.get_or_init(|| {
            installed_now = true;
            MobileNavHandle {
                togglers: document.elements_by_class(TOGGLER_CLASS).len(),
                has_overlay: document.first_by_class(OVERLAY_CLASS).is_some(),
            }
        });

        if installed_now {
            info!(togglers = handle.togglers, "Mobile navigation events initialized");
            Some(handle.clone())
        } else {
            debug!("Mobile navigation events already initialized");
            None
        }
    }

    /// Whether installation already happened.
    pub fn is_installed(&self) -> bool {
        self.handle.get().is_some()
    }

    /// The installed handle, if any.
    pub fn handle(&self) -> Option<MobileNavHandle> {
        self.handle.get().cloned()
    }
}

/// Capability for delivering clicks to the installed toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileNavHandle {
    togglers: usize,
    has_overlay: bool,
}

impl MobileNavHandle {
    /// Number of togglers present at installation.
    pub fn toggler_count(&self) -> usize {
        self.togglers
    }

    /// Whether an overlay was present at installation.
    pub fn has_overlay(&self) -> bool {
        self.has_overlay
    }

    /// A toggler was clicked: flip the drawer and the scroll lock.
    ///
    /// Ignored while the wrapper is mid-transition or when no toggler was
    /// installed.
    pub fn click_toggler(&self, document: &mut Document) -> MobileNavState {
        if self.togglers == 0 {
            return MobileNavState::of(document);
        }
        let Some(wrapper) = document.first_by_class(WRAPPER_CLASS) else {
            return MobileNavState::Collapsed;
        };
        if document.has_class(wrapper, ANIMATING_CLASS) {
            return MobileNavState::of(document);
        }

        document.toggle_class(wrapper, EXPANDED_CLASS);
        if let Some(body) = document.body() {
            document.toggle_class(body, LOCKED_CLASS);
        }
        MobileNavState::of(document)
    }

    /// The overlay was clicked: force the drawer closed.
    pub fn click_overlay(&self, document: &mut Document) -> MobileNavState {
        if !self.has_overlay {
            return MobileNavState::of(document);
        }
        let (Some(wrapper), Some(overlay)) =
            (document.first_by_class(WRAPPER_CLASS), document.first_by_class(OVERLAY_CLASS))
        else {
            return MobileNavState::of(document);
        };

        if document.has_class(wrapper, EXPANDED_CLASS) {
            document.remove_class(wrapper, EXPANDED_CLASS);
            document.remove_class(overlay, OVERLAY_ACTIVE_CLASS);
            if let Some(body) = document.body() {
                document.remove_class(body, LOCKED_CLASS);
            }
        }
        MobileNavState::Collapsed
    }
}
