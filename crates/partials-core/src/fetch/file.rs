//! Fragment source backed by a local site directory.

use super::{FetchError, FragmentFetcher};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// Reads fragments relative to a site root directory.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    /// Create a fetcher rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The site root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a fragment path, refusing anything that escapes the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(path.trim_start_matches("./"));
        let escapes = relative
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes || path.is_empty() {
            return Err(FetchError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl FragmentFetcher for FileFetcher {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, path: &str) -> Result<String, FetchError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FetchError::not_found()),
            Err(e) => Err(FetchError::Io(e)),
        }
    }
}
