//! Page migration.
//!
//! Rewrites static pages to the fragment layout: the text between the closing
//! header and the opening footer becomes the page body of the shared template.
//! Chrome now provided by fragments (mobile navigation wrapper, search popup,
//! scroll-to-top control, sidebar) is stripped from that text first.

use regex::Regex;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Pages rewritten by [`migrate_site`], relative to the site root.
pub const PAGES_TO_UPDATE: [&str; 5] =
    ["about.html", "contact.html", "donate.html", "gallery.html", "what-we-do.html"];

/// Block in the template that receives the page content.
pub const CONTENT_PLACEHOLDER: &str = "<!-- PAGE CONTENT GOES HERE -->\n        <main>\n            <!-- Add your page-specific content here -->\n        </main>";

/// Marker whose end starts the page content.
pub const HEADER_END_MARKER: &str = "</header>";
/// Marker whose start ends the page content.
pub const FOOTER_START_MARKER: &str = "<footer";

/// Suffix of the copy written before a page is overwritten.
pub const BACKUP_SUFFIX: &str = ".backup";

const CHROME_PATTERNS: [&str; 4] = [
    r#"<div class="mobile-nav__wrapper">[\s\S]*?</div>\s*<!-- /.mobile-nav__wrapper -->"#,
    r#"<div class="search-popup[\s\S]*?</div>\s*<!-- /.search-popup -->"#,
    r##"<a href="#"[\s\S]*?scroll-to-top[\s\S]*?</a>"##,
    r#"<aside class="sidebar-one">[\s\S]*?</aside>"#,
];

/// Why the content boundaries of a page could not be found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MarkerError {
    /// No closing header.
    #[error("closing header marker not found")]
    MissingHeader,

    /// No opening footer.
    #[error("opening footer marker not found")]
    MissingFooter,

    /// The footer starts before the header ends.
    #[error("footer starts before the header ends")]
    OutOfOrder,
}

/// Errors that can occur while migrating pages.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The page does not exist.
    #[error("File {0} not found")]
    NotFound(PathBuf),

    /// The page has no usable header/footer boundaries.
    #[error("Could not find header/footer boundaries in {path}: {source}")]
    Markers {
        /// Page path.
        path: PathBuf,
        /// Which boundary was wrong.
        source: MarkerError,
    },

    /// The template cannot be read.
    #[error("Failed to read template {path}: {source}")]
    Template {
        /// Template path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The template has no content placeholder.
    #[error("Template {0} has no page content placeholder")]
    PlaceholderMissing(PathBuf),

    /// Reading or writing a page failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Page or backup path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A chrome pattern failed to compile.
    #[error("Invalid chrome pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Merges page content into the template.
#[derive(Debug, Clone)]
pub struct PageMigrator {
    template: String,
    chrome: Vec<Regex>,
}

impl PageMigrator {
    /// Create a migrator for `template`.
    ///
    /// The template must contain [`CONTENT_PLACEHOLDER`]; `template_path` is
    /// only used in the error.
    pub fn new(template: impl Into<String>, template_path: &Path) -> Result<Self, MigrationError> {
        let template = template.into();
        if !template.contains(CONTENT_PLACEHOLDER) {
            return Err(MigrationError::PlaceholderMissing(template_path.to_path_buf()));
        }
        let chrome = CHROME_PATTERNS.iter().map(|p| Regex::new(p)).collect::<Result<_, _>>()?;
        Ok(Self { template, chrome })
    }

    /// Text between the end of the closing header and the start of the footer, trimmed.
    pub fn extract_main_content<'a>(&self, original: &'a str) -> Result<&'a str, MarkerError> {
        let header_end = original.find(HEADER_END_MARKER).ok_or(MarkerError::MissingHeader)?;
        let footer_start = original.find(FOOTER_START_MARKER).ok_or(MarkerError::MissingFooter)?;
        let content_start = header_end + HEADER_END_MARKER.len();
        if footer_start < content_start {
            return Err(MarkerError::OutOfOrder);
        }
        Ok(original[content_start..footer_start].trim())
    }

    /// Remove every chrome block from `content`.
    pub fn strip_chrome(&self, content: &str) -> String {
        self.chrome
            .iter()
            .fold(content.to_string(), |text, pattern| pattern.replace_all(&text, "").into_owned())
    }

    /// The migrated page for `original`.
    pub fn merge(&self, original: &str) -> Result<String, MarkerError> {
        let content = self.strip_chrome(self.extract_main_content(original)?);
        Ok(self.template.replacen(CONTENT_PLACEHOLDER, &content, 1))
    }

    /// Migrate one page in place. Returns the backup path.
    ///
    /// Nothing is written unless the page has both markers.
    pub async fn migrate_page(&self, path: &Path) -> Result<PathBuf, MigrationError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(MigrationError::NotFound(path.to_path_buf()));
        }
        let original = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| MigrationError::Io { path: path.to_path_buf(), source })?;

        let updated = self
            .merge(&original)
            .map_err(|source| MigrationError::Markers { path: path.to_path_buf(), source })?;

        let backup = backup_path(path);
        tokio::fs::write(&backup, &original)
            .await
            .map_err(|source| MigrationError::Io { path: backup.clone(), source })?;
        tokio::fs::write(path, updated)
            .await
            .map_err(|source| MigrationError::Io { path: path.to_path_buf(), source })?;

        Ok(backup)
    }
}

/// `<page>.backup`.
pub fn backup_path(page: &Path) -> PathBuf {
    let mut name = page.as_os_str().to_owned();
    name.push(BACKUP_SUFFIX);
    PathBuf::from(name)
}

/// Result of migrating one page.
#[derive(Debug)]
pub struct PageMigration {
    /// Page name as listed in [`PAGES_TO_UPDATE`].
    pub page: String,
    /// Backup path, or why the page was skipped.
    pub result: Result<PathBuf, MigrationError>,
}

/// Result of a site migration.
#[derive(Debug, Default)]
pub struct MigrationSummary {
    /// One entry per listed page, in list order.
    pub pages: Vec<PageMigration>,
}

impl MigrationSummary {
    /// Number of pages rewritten.
    pub fn updated(&self) -> usize {
        self.pages.iter().filter(|page| page.result.is_ok()).count()
    }

    /// Number of pages left untouched.
    pub fn skipped(&self) -> usize {
        self.pages.len() - self.updated()
    }
}

/// Migrate every page in [`PAGES_TO_UPDATE`] under `root`.
///
/// Per-page failures are logged and recorded in the summary. Only a missing or
/// unusable template fails the whole run.
pub async fn migrate_site(root: &Path, template: &str) -> crate::Result<MigrationSummary> {
    let template_path = root.join(template);
    let template_text = tokio::fs::read_to_string(&template_path)
        .await
        .map_err(|source| MigrationError::Template { path: template_path.clone(), source })?;
    let migrator = PageMigrator::new(template_text, &template_path)?;

    let mut summary = MigrationSummary::default();
    for page in PAGES_TO_UPDATE {
        let path = root.join(page);
        let result = migrator.migrate_page(&path).await;
        match &result {
            Ok(backup) => info!(page, backup = %backup.display(), "Page updated"),
            Err(MigrationError::NotFound(_)) => info!(page, "Page not found"),
            Err(e) => warn!(page, error = %e, "Page skipped"),
        }
        summary.pages.push(PageMigration { page: page.to_string(), result });
    }
    Ok(summary)
}
