//! Fragment sources.
//!
//! The loader never talks to the network or filesystem directly; it asks a
//! [`FragmentFetcher`] for the text of a fragment path. Timeouts are applied
//! by the loader, not by the fetcher.

pub mod file;
#[cfg(feature = "http")]
pub mod http;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;

pub use file::FileFetcher;
#[cfg(feature = "http")]
pub use http::HttpFetcher;
pub use memory::MemoryFetcher;

/// Errors a fragment source can report.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source answered with a non-success status.
    #[error("HTTP {status}: {reason}")]
    Status {
        /// Numeric status code.
        status: u16,
        /// Reason phrase, empty if unknown.
        reason: String,
    },

    /// The request could not be completed.
    #[error("network error: {0}")]
    Network(String),

    /// Local read failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fragment path cannot be resolved by this source.
    #[error("invalid fragment path: {0}")]
    InvalidPath(String),
}

impl FetchError {
    /// Status-style error for a missing fragment.
    pub fn not_found() -> Self {
        Self::Status { status: 404, reason: "Not Found".to_string() }
    }
}

/// A source of fragment text.
#[async_trait]
pub trait FragmentFetcher: Send + Sync {
    /// Get the name of the source, for logging.
    fn name(&self) -> &str;

    /// Fetch the raw text of the fragment at `path`.
    async fn fetch(&self, path: &str) -> Result<String, FetchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = FetchError::Status { status: 500, reason: "Internal Server Error".to_string() };
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
        assert_eq!(FetchError::not_found().to_string(), "HTTP 404: Not Found");
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: FetchError = io_err.into();
        assert!(matches!(err, FetchError::Io(_)));
    }
}
