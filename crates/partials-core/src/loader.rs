//! Fragment loader.
//!
//! Loads one fragment into one placeholder. A load always settles: a missing
//! placeholder is skipped, a cached fragment is rendered without touching the
//! source, and any fetch failure renders a fallback marker instead of
//! propagating.

use crate::cache::FragmentCache;
use crate::dispatch::PostLoadDispatcher;
use crate::dom::Document;
use crate::fetch::FragmentFetcher;
use crate::registry::ComponentDescriptor;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Document shared between concurrent loads.
pub type SharedDocument = Arc<Mutex<Document>>;

/// Default bound on a single fragment fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(3000);

/// Marker rendered into a placeholder whose fragment failed to load.
pub fn fallback_marker(path: &str) -> String {
    format!("<!-- Component {} failed to load -->", path)
}

/// How a load settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The placeholder is not in the document; nothing was done.
    Skipped,
    /// Rendered from the cache.
    Cached,
    /// Rendered from a fresh fetch.
    Fetched,
    /// The fallback marker was rendered.
    Failed(FailureKind),
}

impl LoadOutcome {
    /// Whether fragment text was rendered.
    pub fn is_rendered(&self) -> bool {
        matches!(self, Self::Cached | Self::Fetched)
    }
}

/// Why a load fell back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The fetch did not settle within the timeout.
    Timeout,
    /// The source reported an error or non-success status.
    Fetch,
}

/// Outcome of loading one registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentOutcome {
    /// Placeholder id.
    pub element_id: String,
    /// Fragment path.
    pub path: String,
    /// How the load settled.
    pub outcome: LoadOutcome,
}

/// Loads fragments into a shared document.
///
/// Cloning is cheap; clones share the document, cache, source and dispatcher.
#[derive(Clone)]
pub struct FragmentLoader {
    document: SharedDocument,
    fetcher: Arc<dyn FragmentFetcher>,
    cache: FragmentCache,
    dispatcher: Arc<PostLoadDispatcher>,
    timeout: Duration,
}

impl std::fmt::Debug for FragmentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FragmentLoader")
            .field("fetcher", &self.fetcher.name())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl FragmentLoader {
    /// Create a loader with the default timeout.
    pub fn new(
        document: SharedDocument,
        fetcher: Arc<dyn FragmentFetcher>,
        dispatcher: Arc<PostLoadDispatcher>,
    ) -> Self {
        Self { document, fetcher, cache: FragmentCache::new(), dispatcher, timeout: DEFAULT_TIMEOUT }
    }

    /// Override the fetch timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The fragment cache.
    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    /// The fetch timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Load the fragment at `path` into the element with id `element_id`.
    pub async fn load(&self, element_id: &str, path: &str) -> LoadOutcome {
        if self.document.lock().await.element_by_id(element_id).is_none() {
            return LoadOutcome::Skipped;
        }

        if let Some(text) = self.cache.get(path).await {
            debug!(element_id, path, "Rendering cached component");
            return self.render_and_dispatch(element_id, path, &text, LoadOutcome::Cached).await;
        }

        match tokio::time::timeout(self.timeout, self.fetcher.fetch(path)).await {
            Ok(Ok(text)) => {
                let text = self.cache.insert(path, text).await;
                self.render_and_dispatch(element_id, path, &text, LoadOutcome::Fetched).await
            }
            Ok(Err(e)) => {
                warn!(path, source = self.fetcher.name(), error = %e, "Failed to load component");
                self.render_fallback(element_id, path).await;
                LoadOutcome::Failed(FailureKind::Fetch)
            }
            Err(_) => {
                warn!(path, timeout_ms = self.timeout.as_millis() as u64, "Component timed out");
                self.render_fallback(element_id, path).await;
                LoadOutcome::Failed(FailureKind::Timeout)
            }
        }
    }

    /// Load one registry entry.
    pub async fn load_component(&self, component: &ComponentDescriptor) -> ComponentOutcome {
        let outcome = self.load(&component.element_id, &component.path).await;
        ComponentOutcome {
            element_id: component.element_id.clone(),
            path: component.path.clone(),
            outcome,
        }
    }

    async fn render_and_dispatch(
        &self,
        element_id: &str,
        path: &str,
        html: &str,
        outcome: LoadOutcome,
    ) -> LoadOutcome {
        if !self.render(element_id, html).await {
            return LoadOutcome::Skipped;
        }
        self.dispatcher.dispatch(element_id, path).await;
        outcome
    }

    async fn render_fallback(&self, element_id: &str, path: &str) {
        self.render(element_id, &fallback_marker(path)).await;
    }

    /// Replace the placeholder content. Returns false if it vanished meanwhile.
    async fn render(&self, element_id: &str, html: &str) -> bool {
        let mut document = self.document.lock().await;
        match document.element_by_id(element_id) {
            Some(node) => {
                document.set_inner_html(node, html);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::passes::PageLocation;

    fn loader_for(html: &str, fetcher: Arc<MemoryFetcher>) -> FragmentLoader {
        let document = Arc::new(Mutex::new(Document::parse(html)));
        let dispatcher = Arc::new(PostLoadDispatcher::new(PageLocation::default(), false));
        FragmentLoader::new(document, fetcher, dispatcher)
    }

    async fn slot_html(loader: &FragmentLoader, id: &str) -> String {
        let document = loader.document.lock().await;
        document.inner_html(document.element_by_id(id).unwrap())
    }

    #[tokio::test]
    async fn test_load_renders_fetched_fragment() {
        let fetcher = Arc::new(MemoryFetcher::new().with_fragment("s.html", "<aside>side</aside>"));
        let loader = loader_for(r#"<div id="sidebar-component"></div>"#, fetcher);

        assert_eq!(loader.load("sidebar-component", "s.html").await, LoadOutcome::Fetched);
        assert_eq!(slot_html(&loader, "sidebar-component").await, "<aside>side</aside>");
    }

    #[tokio::test]
    async fn test_second_load_is_served_from_cache() {
        let fetcher = Arc::new(MemoryFetcher::new().with_fragment("s.html", "<p>x</p>"));
        let loader = loader_for(r#"<div id="a"></div>"#, Arc::clone(&fetcher));

        assert_eq!(loader.load("a", "s.html").await, LoadOutcome::Fetched);
        let first = slot_html(&loader, "a").await;
        assert_eq!(loader.load("a", "s.html").await, LoadOutcome::Cached);
        assert_eq!(slot_html(&loader, "a").await, first);
        assert_eq!(fetcher.request_count("s.html").await, 1);
    }

    #[tokio::test]
    async fn test_missing_element_skips_without_fetching() {
        let fetcher = Arc::new(MemoryFetcher::new().with_fragment("s.html", "<p>x</p>"));
        let loader = loader_for("<main></main>", Arc::clone(&fetcher));

        assert_eq!(loader.load("sidebar-component", "s.html").await, LoadOutcome::Skipped);
        assert!(fetcher.requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_non_success_status_renders_fallback() {
        let fetcher = Arc::new(MemoryFetcher::new().with_status("s.html", 500));
        let loader = loader_for(r#"<div id="a">old</div>"#, fetcher);

        assert_eq!(loader.load("a", "s.html").await, LoadOutcome::Failed(FailureKind::Fetch));
        assert_eq!(slot_html(&loader, "a").await, fallback_marker("s.html"));
        assert!(!loader.cache().contains("s.html").await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_renders_fallback() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_fragment("slow.html", "<p>late</p>")
                .with_delay(Duration::from_secs(10)),
        );
        let loader = loader_for(r#"<div id="a"></div>"#, fetcher);

        assert_eq!(loader.load("a", "slow.html").await, LoadOutcome::Failed(FailureKind::Timeout));
        assert_eq!(slot_html(&loader, "a").await, "<!-- Component slow.html failed to load -->");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_within_timeout_succeeds() {
        let fetcher = Arc::new(
            MemoryFetcher::new()
                .with_fragment("slow.html", "<p>ok</p>")
                .with_delay(Duration::from_millis(2500)),
        );
        let loader = loader_for(r#"<div id="a"></div>"#, fetcher);
        assert_eq!(loader.load("a", "slow.html").await, LoadOutcome::Fetched);
    }

    #[test]
    fn test_fallback_marker_text() {
        assert_eq!(
            fallback_marker("components/footer.html"),
            "<!-- Component components/footer.html failed to load -->"
        );
    }
}
