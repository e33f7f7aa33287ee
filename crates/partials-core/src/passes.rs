//! Deferred passes run after fragments are injected.
//!
//! Each pass is idempotent: running it again over the same document leaves
//! the document unchanged.

use crate::dom::{Document, NodeId};
use chrono::Datelike;
use std::collections::HashSet;

/// Class of the primary navigation list in the header fragment.
pub const NAV_LIST_CLASS: &str = "main-menu__list";
/// Class of one navigation entry.
pub const NAV_ITEM_CLASS: &str = "nav-item";
/// Class marking the entry for the current page.
pub const ACTIVE_NAV_CLASS: &str = "current";
/// Class of the container receiving the cloned navigation list.
pub const MOBILE_NAV_CONTAINER_CLASS: &str = "mobile-nav__container";
/// Class list given to the cloned navigation list.
pub const MOBILE_NAV_LIST_CLASSES: &str = "mobile-nav__list list-unstyled";
/// Class of elements showing the current year.
pub const DYNAMIC_YEAR_CLASS: &str = "dynamic-year";

/// Page used when the location path has no final segment.
pub const DEFAULT_PAGE: &str = "index.html";

/// The location of the page being assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLocation {
    pathname: String,
}

impl Default for PageLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl PageLocation {
    /// Create a location from a URL path such as `/site/about.html`.
    pub fn new(pathname: impl Into<String>) -> Self {
        Self { pathname: pathname.into() }
    }

    /// The full path.
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Final path segment, or [`DEFAULT_PAGE`] if it is empty.
    pub fn current_page(&self) -> &str {
        match self.pathname.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => segment,
            _ => DEFAULT_PAGE,
        }
    }
}

/// A unit of work scheduled for the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredPass {
    /// Mark the navigation entry for the current page.
    ActivateNavigation,
    /// Copy the primary navigation into the mobile drawer.
    CloneMobileNavigation,
    /// Write the current year into footer placeholders.
    UpdateDynamicYear,
}

impl DeferredPass {
    /// Get the string representation of the pass.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ActivateNavigation => "activate_navigation",
            Self::CloneMobileNavigation => "clone_mobile_navigation",
            Self::UpdateDynamicYear => "update_dynamic_year",
        }
    }
}

/// Mark the navigation entry whose link equals `current_page`.
///
/// Every entry under a primary navigation list loses the active class; the
/// entry whose first link has an `href` exactly equal to `current_page` gets
/// it back. Returns the activated entry, if any.
pub fn set_active_navigation(document: &mut Document, current_page: &str) -> Option<NodeId> {
    let mut seen = HashSet::new();
    let items: Vec<NodeId> = document
        .elements_by_class(NAV_LIST_CLASS)
        .into_iter()
        .flat_map(|list| document.descendants_by_class(list, NAV_ITEM_CLASS))
        .filter(|item| seen.insert(*item))
        .collect();

    let mut active = None;
    for item in items {
        document.remove_class(item, ACTIVE_NAV_CLASS);
        let href = document
            .first_descendant_by_tag(item, "a")
            .and_then(|link| document.attr(link, "href"));
        if href == Some(current_page) {
            document.add_class(item, ACTIVE_NAV_CLASS);
            active.get_or_insert(item);
        }
    }
    active
}

/// Clone the primary navigation list into the mobile container.
///
/// Does nothing unless both exist and the container has no child nodes.
/// Returns true if a clone was appended.
pub fn clone_mobile_navigation(document: &mut Document) -> bool {
    let (Some(list), Some(container)) = (
        document.first_by_class(NAV_LIST_CLASS),
        document.first_by_class(MOBILE_NAV_CONTAINER_CLASS),
    ) else {
        return false;
    };
    if document.has_child_nodes(container) {
        return false;
    }

    let copy = document.deep_clone(list);
    document.set_attr(copy, "class", MOBILE_NAV_LIST_CLASSES);
    document.append_child(container, copy);
    true
}

/// Write `year` into every dynamic-year element. Returns how many were updated.
pub fn update_dynamic_year(document: &mut Document, year: i32) -> usize {
    let targets = document.elements_by_class(DYNAMIC_YEAR_CLASS);
    let text = year.to_string();
    for &target in &targets {
        document.set_text(target, &text);
    }
    targets.len()
}

/// The current local year.
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
