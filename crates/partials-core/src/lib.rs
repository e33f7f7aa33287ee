//! Partials - HTML fragment inclusion for static sites.
//!
//! This crate provides:
//! - A component registry and a fragment loader with cache, timeout and fallback
//! - Post-load passes (navigation highlighting, mobile navigation, footer year)
//! - A two-tier bootstrap over an in-memory page document
//! - Offline site tools: page migration and stylesheet injection
//!
//! # Example
//!
//! ```rust,no_run
//! use partials_core::{Document, FileFetcher, PageLocation, PageRuntime};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let page = std::fs::read_to_string("about.html").unwrap_or_default();
//!     let runtime = PageRuntime::builder(Document::parse(&page), Arc::new(FileFetcher::new(".")))
//!         .location(PageLocation::new("/about.html"))
//!         .build();
//!     if let Some(handle) = runtime.bootstrap().await {
//!         handle.settle().await;
//!     }
//!     println!("{}", runtime.html().await);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod dispatch;
pub mod dom;
pub mod error;
pub mod fetch;
pub mod loader;
pub mod migrate;
pub mod mobile_nav;
pub mod passes;
pub mod prefetch;
pub mod registry;
pub mod runtime;
pub mod stylesheet;

pub use cache::{CacheStats, FragmentCache};
pub use config::{ConfigError, LoaderConfig, PartialsConfig, SiteConfig, StylesheetConfig};
pub use dispatch::{ComponentListener, ComponentLoaded, FnListener, ListenerId, PostLoadDispatcher};
pub use dom::{Document, NodeId};
pub use error::{PartialsError, Result};
#[cfg(feature = "http")]
pub use fetch::HttpFetcher;
pub use fetch::{FetchError, FileFetcher, FragmentFetcher, MemoryFetcher};
pub use loader::{
    ComponentOutcome, DEFAULT_TIMEOUT, FailureKind, FragmentLoader, LoadOutcome, SharedDocument,
    fallback_marker,
};
pub use migrate::{MarkerError, MigrationError, MigrationSummary, PageMigrator, migrate_site};
pub use mobile_nav::{MobileNavHandle, MobileNavState, MobileNavToggle};
pub use passes::{DeferredPass, PageLocation};
pub use prefetch::PrefetchHinter;
pub use registry::{ComponentDescriptor, ComponentRegistry, PriorityTier};
pub use runtime::{BootstrapHandle, BootstrapReport, PageRuntime, PageRuntimeBuilder};
pub use stylesheet::{InjectionStatus, PageInjection, StylesheetError, StylesheetInjector};
