//! Page runtime and bootstrap sequencing.
//!
//! A [`PageRuntime`] owns everything one page session needs: the document,
//! the loader with its cache, the dispatcher with its frame queue and
//! listeners, and the prefetch hinter. [`PageRuntime::bootstrap`] loads the
//! registry in two tiers. Layout-critical fragments are awaited, everything
//! else loads on spawned tasks.

use crate::config::PartialsConfig;
use crate::dispatch::PostLoadDispatcher;
use crate::dom::{Document, NodeId};
use crate::fetch::{FetchError, FileFetcher, FragmentFetcher};
use crate::loader::{ComponentOutcome, DEFAULT_TIMEOUT, FragmentLoader, SharedDocument};
use crate::mobile_nav::MobileNavHandle;
use crate::passes::PageLocation;
use crate::prefetch::PrefetchHinter;
use crate::registry::ComponentRegistry;
use futures::future::join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Builder for [`PageRuntime`].
pub struct PageRuntimeBuilder {
    document: Document,
    fetcher: Arc<dyn FragmentFetcher>,
    registry: ComponentRegistry,
    location: PageLocation,
    timeout: Duration,
    mobile_nav_toggle: bool,
}

impl PageRuntimeBuilder {
    /// Replace the default registry.
    #[must_use]
    pub fn registry(mut self, registry: ComponentRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Set the page location used by navigation highlighting.
    #[must_use]
    pub fn location(mut self, location: PageLocation) -> Self {
        self.location = location;
        self
    }

    /// Set the per-fragment fetch timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Enable or disable the mobile drawer toggle.
    #[must_use]
    pub fn mobile_nav_toggle(mut self, enabled: bool) -> Self {
        self.mobile_nav_toggle = enabled;
        self
    }

    /// Build the runtime.
    pub fn build(self) -> PageRuntime {
        let document = Arc::new(Mutex::new(self.document));
        let dispatcher = Arc::new(PostLoadDispatcher::new(self.location, self.mobile_nav_toggle));
        let loader = FragmentLoader::new(Arc::clone(&document), self.fetcher, Arc::clone(&dispatcher))
            .with_timeout(self.timeout);
        PageRuntime {
            document,
            loader,
            dispatcher,
            registry: self.registry,
            prefetch: PrefetchHinter::new(),
            bootstrapped: AtomicBool::new(false),
        }
    }
}

/// One page session.
pub struct PageRuntime {
    document: SharedDocument,
    loader: FragmentLoader,
    dispatcher: Arc<PostLoadDispatcher>,
    registry: ComponentRegistry,
    prefetch: PrefetchHinter,
    bootstrapped: AtomicBool,
}

impl std::fmt::Debug for PageRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageRuntime")
            .field("loader", &self.loader)
            .field("registry", &self.registry)
            .field("bootstrapped", &self.bootstrapped)
            .finish_non_exhaustive()
    }
}

impl PageRuntime {
    /// Start building a runtime for `document` fed by `fetcher`.
    pub fn builder(document: Document, fetcher: Arc<dyn FragmentFetcher>) -> PageRuntimeBuilder {
        PageRuntimeBuilder {
            document,
            fetcher,
            registry: ComponentRegistry::default(),
            location: PageLocation::default(),
            timeout: DEFAULT_TIMEOUT,
            mobile_nav_toggle: true,
        }
    }

    /// Build a runtime from configuration.
    ///
    /// Fragments come from `loader.base_url` when set, otherwise from files
    /// under `site.root`.
    pub fn from_config(
        config: &PartialsConfig,
        document: Document,
        location: PageLocation,
    ) -> crate::Result<Self> {
        let fetcher = fetcher_for(config)?;
        Ok(Self::builder(document, fetcher)
            .registry(config.loader.registry())
            .location(location)
            .timeout(config.loader.timeout())
            .mobile_nav_toggle(config.loader.mobile_nav_toggle)
            .build())
    }

    /// The shared document.
    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// The fragment loader.
    pub fn loader(&self) -> &FragmentLoader {
        &self.loader
    }

    /// The post-load dispatcher.
    pub fn dispatcher(&self) -> &Arc<PostLoadDispatcher> {
        &self.dispatcher
    }

    /// The component registry.
    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Whether [`Self::bootstrap`] already ran.
    pub fn is_bootstrapped(&self) -> bool {
        self.bootstrapped.load(Ordering::SeqCst)
    }

    /// Load the registry into the document.
    ///
    /// High-tier fragments load concurrently and are awaited, then one frame
    /// runs. Low-tier fragments are spawned and not awaited. Each spawned load
    /// runs a frame once it finishes, so deferred passes happen even if the
    /// returned handle is dropped without [`BootstrapHandle::settle`]. Returns
    /// `None` if the runtime was already bootstrapped.
    pub async fn bootstrap(&self) -> Option<BootstrapHandle> {
        if self.bootstrapped.swap(true, Ordering::SeqCst) {
            debug!("Components already bootstrapped");
            return None;
        }

        let (high, low) = self.registry.partition();
        info!(high = high.len(), low = low.len(), "Loading components");

        let high = join_all(high.iter().map(|component| self.loader.load_component(component))).await;
        self.run_frame().await;

        let background = low
            .into_iter()
            .map(|component| {
                let loader = self.loader.clone();
                let document = Arc::clone(&self.document);
                let dispatcher = Arc::clone(&self.dispatcher);
                tokio::spawn(async move {
                    let outcome = loader.load_component(&component).await;
                    let mut document = document.lock().await;
                    dispatcher.run_frame(&mut document).await;
                    outcome
                })
            })
            .collect();

        Some(BootstrapHandle {
            high,
            background,
            document: Arc::clone(&self.document),
            dispatcher: Arc::clone(&self.dispatcher),
        })
    }

    /// Drain the deferred pass queue against the document.
    pub async fn run_frame(&self) -> usize {
        let mut document = self.document.lock().await;
        self.dispatcher.run_frame(&mut document).await
    }

    /// Pointer entered `node`; adds a prefetch hint for page links.
    pub async fn pointer_enter(&self, node: NodeId) -> Option<String> {
        let mut document = self.document.lock().await;
        self.prefetch.pointer_enter(&mut document, node).await
    }

    /// The installed mobile drawer handle, once the mobile pass has run.
    pub fn mobile_nav(&self) -> Option<MobileNavHandle> {
        self.dispatcher.mobile_nav()
    }

    /// Serialize the current document.
    pub async fn html(&self) -> String {
        self.document.lock().await.to_html()
    }
}

fn fetcher_for(config: &PartialsConfig) -> Result<Arc<dyn FragmentFetcher>, FetchError> {
    match &config.loader.base_url {
        #[cfg(feature = "http")]
        Some(base_url) => Ok(Arc::new(crate::fetch::HttpFetcher::new(base_url)?)),
        #[cfg(not(feature = "http"))]
        Some(base_url) => Err(FetchError::InvalidPath(format!(
            "HTTP fragment source disabled at build time: {}",
            base_url
        ))),
        None => Ok(Arc::new(FileFetcher::new(config.site.root.clone()))),
    }
}

/// Handle on a started bootstrap.
#[derive(Debug)]
pub struct BootstrapHandle {
    high: Vec<ComponentOutcome>,
    background: Vec<JoinHandle<ComponentOutcome>>,
    document: SharedDocument,
    dispatcher: Arc<PostLoadDispatcher>,
}

impl BootstrapHandle {
    /// Outcomes of the awaited tier, in priority order.
    pub fn high(&self) -> &[ComponentOutcome] {
        &self.high
    }

    /// Number of background loads started.
    pub fn background_count(&self) -> usize {
        self.background.len()
    }

    /// Wait for the background loads and run the trailing frame.
    pub async fn settle(self) -> BootstrapReport {
        let mut low = Vec::with_capacity(self.background.len());
        for task in join_all(self.background).await {
            match task {
                Ok(outcome) => low.push(outcome),
                Err(e) => error!(error = %e, "Background component task failed"),
            }
        }

        let passes = {
            let mut document = self.document.lock().await;
            self.dispatcher.run_frame(&mut document).await
        };
        debug!(passes, "Trailing frame complete");

        BootstrapReport { high: self.high, low }
    }
}

/// Outcomes of a settled bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapReport {
    /// Awaited tier, in priority order.
    pub high: Vec<ComponentOutcome>,
    /// Background tier, in priority order.
    pub low: Vec<ComponentOutcome>,
}

impl BootstrapReport {
    /// All outcomes, high tier first.
    pub fn outcomes(&self) -> impl Iterator<Item = &ComponentOutcome> {
        self.high.iter().chain(&self.low)
    }

    /// Number of fragments rendered.
    pub fn rendered(&self) -> usize {
        self.outcomes().filter(|o| o.outcome.is_rendered()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::MemoryFetcher;
    use crate::loader::LoadOutcome;
    use crate::registry::ComponentDescriptor;

    const PAGE: &str = r#"<html><head></head><body><div id="header-component"></div><main><a id="link" href="about.html">About</a></main><div id="footer-component"></div><div id="sidebar-component"></div></body></html>"#;

    fn fetcher() -> Arc<MemoryFetcher> {
        Arc::new(
            MemoryFetcher::new()
                .with_fragment(
                    "components/header.html",
                    r#"<ul class="main-menu__list"><li class="nav-item"><a href="about.html">About</a></li></ul>"#,
                )
                .with_fragment("components/footer.html", r#"<span class="dynamic-year"></span>"#)
                .with_fragment("components/sidebar.html", "<aside>side</aside>"),
        )
    }

    #[tokio::test]
    async fn test_bootstrap_runs_once() {
        let runtime = PageRuntime::builder(Document::parse(PAGE), fetcher()).build();
        assert!(runtime.bootstrap().await.is_some());
        assert!(runtime.is_bootstrapped());
        assert!(runtime.bootstrap().await.is_none());
    }

    #[tokio::test]
    async fn test_high_tier_rendered_before_return() {
        let runtime = PageRuntime::builder(Document::parse(PAGE), fetcher())
            .location(PageLocation::new("/about.html"))
            .build();
        let handle = runtime.bootstrap().await.unwrap();

        let outcomes: Vec<_> = handle.high().iter().map(|o| o.outcome).collect();
        assert_eq!(outcomes, vec![LoadOutcome::Fetched, LoadOutcome::Fetched]);
        assert_eq!(handle.background_count(), 3);

        let html = runtime.html().await;
        assert!(html.contains(r#"<li class="nav-item current">"#));
        assert!(!html.contains(r#"<span class="dynamic-year"></span>"#));

        let report = handle.settle().await;
        assert_eq!(report.low.len(), 3);
        assert_eq!(report.rendered(), 3);
    }

    #[tokio::test]
    async fn test_pointer_enter_hints_once() {
        let runtime = PageRuntime::builder(Document::parse(PAGE), fetcher()).build();
        let link = runtime.document().lock().await.element_by_id("link").unwrap();

        assert_eq!(runtime.pointer_enter(link).await.as_deref(), Some("about.html"));
        assert!(runtime.pointer_enter(link).await.is_none());
        assert!(runtime.html().await.contains(r#"<link rel="prefetch" href="about.html" />"#));
    }

    #[test]
    fn test_from_config_uses_file_fetcher() {
        let runtime =
            PageRuntime::from_config(&PartialsConfig::default(), Document::new(), PageLocation::default())
                .unwrap();
        assert_eq!(runtime.registry().len(), 5);
        assert_eq!(runtime.loader().timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_from_config_rejects_bad_base_url() {
        let mut config = PartialsConfig::default();
        config.loader.base_url = Some("not a url".to_string());
        let err = PageRuntime::from_config(&config, Document::new(), PageLocation::default())
            .unwrap_err();
        assert!(matches!(err, crate::PartialsError::Fetch(FetchError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn test_background_loads_run_frames_without_settle() {
        let page = r#"<body><div id="footer-component"></div><div id="sidebar-component"></div></body>"#;
        let runtime = PageRuntime::builder(Document::parse(page), fetcher())
            .registry(ComponentRegistry::new(vec![ComponentDescriptor::new(
                "footer-component",
                "components/footer.html",
                3,
            )]))
            .build();
        let handle = runtime.bootstrap().await.unwrap();
        assert_eq!(handle.background_count(), 1);
        drop(handle);

        let expected = format!(r#"<span class="dynamic-year">{}</span>"#, crate::passes::current_year());
        for _ in 0..100 {
            if runtime.html().await.contains(&expected) {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(runtime.html().await.contains(&expected));
        assert!(runtime.dispatcher().pending_passes().await.is_empty());
    }
}
