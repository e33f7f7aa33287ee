//! Fragment text cache.
//!
//! Keyed by fragment path. Entries are never evicted or invalidated; the cache
//! lives exactly as long as the loader that owns it.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory cache of fetched fragment text.
///
/// Cloning shares the underlying storage.
#[derive(Debug, Clone, Default)]
pub struct FragmentCache {
    entries: Arc<RwLock<HashMap<String, Arc<str>>>>,
}

impl FragmentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached text for `path`.
    pub async fn get(&self, path: &str) -> Option<Arc<str>> {
        self.entries.read().await.get(path).cloned()
    }

    /// Store `text` for `path` unless an entry already exists.
    ///
    /// Returns the text that is cached afterwards, so concurrent loads of the
    /// same path all render the first stored value.
    pub async fn insert(&self, path: &str, text: String) -> Arc<str> {
        let mut entries = self.entries.write().await;
        Arc::clone(entries.entry(path.to_string()).or_insert_with(|| Arc::from(text)))
    }

    /// Whether `path` is cached.
    pub async fn contains(&self, path: &str) -> bool {
        self.entries.read().await.contains_key(path)
    }

    /// Get cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats { entries: entries.len(), bytes: entries.values().map(|text| text.len()).sum() }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cached fragments.
    pub entries: usize,
    /// Total cached text size in bytes.
    pub bytes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_and_get() {
        let cache = FragmentCache::new();
        assert!(cache.get("components/header.html").await.is_none());

        cache.insert("components/header.html", "<header></header>".to_string()).await;
        assert_eq!(cache.get("components/header.html").await.as_deref(), Some("<header></header>"));
        assert!(cache.contains("components/header.html").await);
    }

    #[tokio::test]
    async fn test_first_insert_wins() {
        let cache = FragmentCache::new();
        let first = cache.insert("a.html", "first".to_string()).await;
        let second = cache.insert("a.html", "second".to_string()).await;
        assert_eq!(&*first, "first");
        assert_eq!(&*second, "first");
    }

    #[tokio::test]
    async fn test_clones_share_storage() {
        let cache = FragmentCache::new();
        let other = cache.clone();
        other.insert("a.html", "abc".to_string()).await;
        assert_eq!(cache.stats().await, CacheStats { entries: 1, bytes: 3 });
    }
}
