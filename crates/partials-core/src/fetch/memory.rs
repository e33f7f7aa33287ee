//! In-memory fragment source.
//!
//! Serves fragments from a map, optionally after a delay, and records every
//! request it receives. Used for embedding and for tests.

use super::{FetchError, FragmentFetcher};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;

/// Fragment source backed by a map of path to text.
#[derive(Debug, Default)]
pub struct MemoryFetcher {
    fragments: HashMap<String, String>,
    statuses: HashMap<String, u16>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl MemoryFetcher {
    /// Create an empty source; every path answers 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` for `path`.
    #[must_use]
    pub fn with_fragment(mut self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.fragments.insert(path.into(), text.into());
        self
    }

    /// Answer `path` with a non-success `status`.
    #[must_use]
    pub fn with_status(mut self, path: impl Into<String>, status: u16) -> Self {
        self.statuses.insert(path.into(), status);
        self
    }

    /// Wait `delay` before answering any request.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every path requested so far, in order.
    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// How many times `path` was requested.
    pub async fn request_count(&self, path: &str) -> usize {
        self.requests.lock().await.iter().filter(|p| p.as_str() == path).count()
    }
}

#[async_trait]
impl FragmentFetcher for MemoryFetcher {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        self.requests.lock().await.push(path.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(&status) = self.statuses.get(path) {
            return Err(FetchError::Status { status, reason: String::new() });
        }
        self.fragments.get(path).cloned().ok_or_else(FetchError::not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_serves_and_records() {
        let fetcher = MemoryFetcher::new().with_fragment("a.html", "A");
        assert_eq!(fetcher.fetch("a.html").await.unwrap(), "A");
        assert!(fetcher.fetch("b.html").await.is_err());
        assert_eq!(fetcher.requests().await, vec!["a.html", "b.html"]);
        assert_eq!(fetcher.request_count("a.html").await, 1);
    }

    #[tokio::test]
    async fn test_status_override() {
        let fetcher = MemoryFetcher::new().with_fragment("a.html", "A").with_status("a.html", 503);
        match fetcher.fetch("a.html").await {
            Err(FetchError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("Expected status error, got {:?}", other),
        }
    }
}
