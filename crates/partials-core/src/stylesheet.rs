//! Stylesheet injection.
//!
//! Adds the mobile navigation stylesheet to every page of a site, right after
//! the main theme stylesheet link.

use crate::config::StylesheetConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Pages whose file name starts with this prefix are never touched.
pub const EXCLUDED_PREFIX: &str = "create-";

/// Errors that can occur while injecting stylesheets.
#[derive(Debug, Error)]
pub enum StylesheetError {
    /// The site root cannot be listed.
    #[error("Failed to list {path}: {source}")]
    ReadDir {
        /// Site root.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A page cannot be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Page path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// What happened to one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectionStatus {
    /// The page already references the stylesheet.
    AlreadyPresent,
    /// The link was inserted after `anchors` anchor links.
    Inserted {
        /// Number of anchors found.
        anchors: usize,
    },
    /// No anchor link; the page was left alone.
    AnchorMissing,
}

/// Result of injecting into page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Injection {
    /// Nothing to write; see the status.
    Unchanged(InjectionStatus),
    /// New page text.
    Updated {
        /// Rewritten page.
        content: String,
        /// Number of anchors found.
        anchors: usize,
    },
}

impl Injection {
    /// Status to report for this injection.
    pub fn status(&self) -> InjectionStatus {
        match self {
            Self::Unchanged(status) => *status,
            Self::Updated { anchors, .. } => InjectionStatus::Inserted { anchors: *anchors },
        }
    }
}

/// Report for one page of a site run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInjection {
    /// File name relative to the site root.
    pub file: String,
    /// What happened.
    pub status: InjectionStatus,
}

/// Inserts a stylesheet link after an anchor stylesheet link.
#[derive(Debug, Clone)]
pub struct StylesheetInjector {
    anchor: String,
    insertion: String,
    presence_marker: String,
}

impl StylesheetInjector {
    /// Create an injector from configuration.
    pub fn new(config: &StylesheetConfig) -> Self {
        let anchor = format!(r#"<link rel="stylesheet" href="{}" />"#, config.anchor_href);
        let insertion = format!(
            "\n    <!-- {} -->\n    <link rel=\"stylesheet\" href=\"{}\" />",
            config.marker, config.href
        );
        let presence_marker =
            config.href.rsplit('/').next().unwrap_or(config.href.as_str()).to_string();
        Self { anchor, insertion, presence_marker }
    }

    /// Inject into page text.
    pub fn inject(&self, content: &str) -> Injection {
        if content.contains(&self.presence_marker) {
            return Injection::Unchanged(InjectionStatus::AlreadyPresent);
        }
        let anchors = content.matches(&self.anchor).count();
        if anchors == 0 {
            return Injection::Unchanged(InjectionStatus::AnchorMissing);
        }
        let replacement = format!("{}{}", self.anchor, self.insertion);
        Injection::Updated { content: content.replace(&self.anchor, &replacement), anchors }
    }

    /// Inject into one page file, writing it only if it changed.
    pub async fn inject_file(&self, path: &Path) -> Result<InjectionStatus, StylesheetError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| StylesheetError::Io { path: path.to_path_buf(), source })?;

        let injection = self.inject(&content);
        if let Injection::Updated { content, .. } = &injection {
            tokio::fs::write(path, content)
                .await
                .map_err(|source| StylesheetError::Io { path: path.to_path_buf(), source })?;
        }
        Ok(injection.status())
    }

    /// Inject into every eligible page under `root`, in file name order.
    pub async fn inject_site(&self, root: &Path) -> crate::Result<Vec<PageInjection>> {
        let mut reports = Vec::new();
        for file in site_pages(root).await? {
            let status = self.inject_file(&root.join(&file)).await?;
            match status {
                InjectionStatus::AlreadyPresent => debug!(file = %file, "Stylesheet already present"),
                InjectionStatus::Inserted { anchors } => info!(file = %file, anchors, "Stylesheet added"),
                InjectionStatus::AnchorMissing => warn!(file = %file, "No stylesheet insertion point"),
            }
            reports.push(PageInjection { file, status });
        }
        Ok(reports)
    }
}

/// `*.html` file names directly under `root`, excluding [`EXCLUDED_PREFIX`], sorted.
pub async fn site_pages(root: &Path) -> Result<Vec<String>, StylesheetError> {
    let read_dir_err = |source| StylesheetError::ReadDir { path: root.to_path_buf(), source };
    let mut entries = tokio::fs::read_dir(root).await.map_err(read_dir_err)?;

    let mut pages = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(read_dir_err)? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        if is_file
            && Path::new(&name).extension().is_some_and(|ext| ext == "html")
            && !name.starts_with(EXCLUDED_PREFIX)
        {
            pages.push(name);
        }
    }
    pages.sort();
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PartialsError;
    use tempfile::TempDir;

    const PAGE: &str = "<head>\n    <link rel=\"stylesheet\" href=\"assets/css/cleenhearts.css\" />\n</head>";

    fn injector() -> StylesheetInjector {
        StylesheetInjector::new(&StylesheetConfig::default())
    }

    #[test]
    fn test_inject_inserts_after_anchor() {
        let Injection::Updated { content, anchors } = injector().inject(PAGE) else {
            panic!("expected an update");
        };
        assert_eq!(anchors, 1);
        assert_eq!(
            content,
            "<head>\n    <link rel=\"stylesheet\" href=\"assets/css/cleenhearts.css\" />\n    <!-- mobile navigation fixes -->\n    <link rel=\"stylesheet\" href=\"assets/css/mobile-nav-fix.css\" />\n</head>"
        );
    }

    #[test]
    fn test_inject_is_idempotent() {
        let Injection::Updated { content, .. } = injector().inject(PAGE) else {
            panic!("expected an update");
        };
        assert_eq!(injector().inject(&content).status(), InjectionStatus::AlreadyPresent);
    }

    #[test]
    fn test_inject_without_anchor() {
        assert_eq!(
            injector().inject("<head></head>"),
            Injection::Unchanged(InjectionStatus::AnchorMissing)
        );
    }

    #[tokio::test]
    async fn test_inject_site() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("index.html"), PAGE).unwrap();
        std::fs::write(dir.path().join("about.html"), "<head></head>").unwrap();
        std::fs::write(dir.path().join("create-page.html"), PAGE).unwrap();
        std::fs::write(dir.path().join("notes.txt"), PAGE).unwrap();

        let reports = injector().inject_site(dir.path()).await.unwrap();
        assert_eq!(
            reports,
            vec![
                PageInjection { file: "about.html".to_string(), status: InjectionStatus::AnchorMissing },
                PageInjection {
                    file: "index.html".to_string(),
                    status: InjectionStatus::Inserted { anchors: 1 }
                },
            ]
        );
        assert_eq!(std::fs::read_to_string(dir.path().join("create-page.html")).unwrap(), PAGE);
        assert_eq!(std::fs::read_to_string(dir.path().join("about.html")).unwrap(), "<head></head>");

        let again = injector().inject_site(dir.path()).await.unwrap();
        assert_eq!(again[1].status, InjectionStatus::AlreadyPresent);
    }

    #[tokio::test]
    async fn test_inject_site_missing_root() {
        let err = injector().inject_site(Path::new("/nonexistent/site")).await.unwrap_err();
        assert!(matches!(err, PartialsError::Stylesheet(StylesheetError::ReadDir { .. })));
    }
}
