//! Fragment source backed by an HTTP origin.

use super::{FetchError, FragmentFetcher};
use async_trait::async_trait;
use reqwest::{Client, Url};

/// Fetches fragments relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
}

impl HttpFetcher {
    /// Create a fetcher for `base_url`, e.g. `https://example.org/`.
    ///
    /// A missing trailing slash is added so fragment paths resolve below the
    /// given directory rather than beside it.
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let normalized =
            if base_url.ends_with('/') { base_url.to_string() } else { format!("{}/", base_url) };
        let base_url = Url::parse(&normalized)
            .map_err(|e| FetchError::InvalidPath(format!("{}: {}", base_url, e)))?;
        Ok(Self { client: Client::new(), base_url })
    }

    /// The base URL fragments are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn resolve(&self, path: &str) -> Result<Url, FetchError> {
        self.base_url.join(path).map_err(|e| FetchError::InvalidPath(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl FragmentFetcher for HttpFetcher {
    fn name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let url = self.resolve(path)?;
        let response =
            self.client.get(url).send().await.map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response.text().await.map_err(|e| FetchError::Network(e.to_string()))
    }
}
