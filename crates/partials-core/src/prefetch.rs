//! Prefetch hints for linked pages.
//!
//! When the pointer enters a link to another page, a `<link rel="prefetch">`
//! for its target is appended to the document head. Each href is hinted once.

use crate::dom::{Document, NodeId};
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::debug;

/// Suffix a link target must have to be prefetched.
pub const PREFETCH_SUFFIX: &str = ".html";

/// Tracks which hrefs were already hinted.
#[derive(Debug, Default)]
pub struct PrefetchHinter {
    hinted: Mutex<HashSet<String>>,
}

impl PrefetchHinter {
    /// Create a hinter with nothing hinted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer entered `node`.
    ///
    /// Returns the href that was hinted, or `None` if `node` is not a page
    /// link, the document has no head, or the href was already hinted.
    pub async fn pointer_enter(&self, document: &mut Document, node: NodeId) -> Option<String> {
        if document.tag_name(node) != Some("a") {
            return None;
        }
        let href = document.attr(node, "href").filter(|href| href.ends_with(PREFETCH_SUFFIX))?;
        let href = href.to_string();
        let head = document.head()?;

        if !self.hinted.lock().await.insert(href.clone()) {
            return None;
        }

        let link = document.create_element("link", &[("rel", "prefetch"), ("href", &href)]);
        document.append_child(head, link);
        debug!(href = %href, "Prefetch hint added");
        Some(href)
    }

    /// Number of distinct hrefs hinted.
    pub async fn hinted_count(&self) -> usize {
        self.hinted.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head></head><body>
<a id="about" href="about.html">About</a>
<a id="ext" href="https://example.org/">Out</a>
<span id="plain">text</span>
</body></html>"#;

    fn prefetch_links(document: &Document) -> Vec<String> {
        document
            .elements_by_tag("link")
            .into_iter()
            .filter(|&link| document.attr(link, "rel") == Some("prefetch"))
            .filter_map(|link| document.attr(link, "href").map(str::to_string))
            .collect()
    }

    #[tokio::test]
    async fn test_hint_page_link_once() {
        let mut document = Document::parse(PAGE);
        let hinter = PrefetchHinter::new();
        let about = document.element_by_id("about").unwrap();

        assert_eq!(hinter.pointer_enter(&mut document, about).await.as_deref(), Some("about.html"));
        assert!(hinter.pointer_enter(&mut document, about).await.is_none());
        assert_eq!(prefetch_links(&document), vec!["about.html"]);
        assert_eq!(hinter.hinted_count().await, 1);
    }

    #[tokio::test]
    async fn test_non_page_targets_ignored() {
        let mut document = Document::parse(PAGE);
        let hinter = PrefetchHinter::new();
        let ext = document.element_by_id("ext").unwrap();
        let plain = document.element_by_id("plain").unwrap();

        assert!(hinter.pointer_enter(&mut document, ext).await.is_none());
        assert!(hinter.pointer_enter(&mut document, plain).await.is_none());
        assert!(prefetch_links(&document).is_empty());
    }

    #[tokio::test]
    async fn test_serialized_hint() {
        let mut document = Document::parse(PAGE);
        let hinter = PrefetchHinter::new();
        let about = document.element_by_id("about").unwrap();
        hinter.pointer_enter(&mut document, about).await;

        let head = document.head().unwrap();
        assert_eq!(document.inner_html(head), r#"<link rel="prefetch" href="about.html" />"#);
    }
}
