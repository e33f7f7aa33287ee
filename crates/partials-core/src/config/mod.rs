//! Configuration file support.
//!
//! Settings live in TOML. Discovery reads the global file
//! (`~/.partials/config.toml`) and then the local one (`./partials.toml`);
//! keys set locally override the global value, table by table.

use crate::loader::DEFAULT_TIMEOUT;
use crate::registry::{ComponentDescriptor, ComponentRegistry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default page template, relative to the site root.
pub const DEFAULT_TEMPLATE: &str = "components/page-template.html";
/// Default stylesheet the mobile fixes are inserted after.
pub const DEFAULT_ANCHOR_HREF: &str = "assets/css/cleenhearts.css";
/// Default mobile fixes stylesheet.
pub const DEFAULT_STYLESHEET_HREF: &str = "assets/css/mobile-nav-fix.css";
/// Default comment placed above the inserted stylesheet link.
pub const DEFAULT_STYLESHEET_MARKER: &str = "mobile navigation fixes";

/// Complete configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialsConfig {
    /// Site layout.
    #[serde(default)]
    pub site: SiteConfig,

    /// Fragment loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Stylesheet injector settings.
    #[serde(default)]
    pub stylesheet: StylesheetConfig,
}

/// Site layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Directory holding the pages and `components/`.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Page template used by the migration, relative to `root`.
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self { root: default_root(), template: default_template() }
    }
}

/// Fragment loader settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Bound on a single fragment fetch, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// HTTP origin serving fragments. Fragments are read from `site.root`
    /// when unset.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Install the drawer toggle after the mobile navigation loads.
    #[serde(default = "default_true")]
    pub mobile_nav_toggle: bool,

    /// Replacement component list. The built-in registry is used when unset.
    #[serde(default)]
    pub components: Option<Vec<ComponentDescriptor>>,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT.as_millis() as u64
}

fn default_true() -> bool {
    true
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
            base_url: None,
            mobile_nav_toggle: true,
            components: None,
        }
    }
}

impl LoaderConfig {
    /// The fetch timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The configured registry, or the built-in one.
    pub fn registry(&self) -> ComponentRegistry {
        self.components.clone().map_or_else(ComponentRegistry::default, ComponentRegistry::new)
    }
}

/// Stylesheet injector settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StylesheetConfig {
    /// Stylesheet whose link element anchors the insertion.
    #[serde(default = "default_anchor_href")]
    pub anchor_href: String,

    /// Stylesheet to insert.
    #[serde(default = "default_stylesheet_href")]
    pub href: String,

    /// Comment text written above the inserted link.
    #[serde(default = "default_stylesheet_marker")]
    pub marker: String,
}

fn default_anchor_href() -> String {
    DEFAULT_ANCHOR_HREF.to_string()
}

fn default_stylesheet_href() -> String {
    DEFAULT_STYLESHEET_HREF.to_string()
}

fn default_stylesheet_marker() -> String {
    DEFAULT_STYLESHEET_MARKER.to_string()
}

impl Default for StylesheetConfig {
    fn default() -> Self {
        Self {
            anchor_href: default_anchor_href(),
            href: default_stylesheet_href(),
            marker: default_stylesheet_marker(),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    /// Failed to read configuration file.
    #[error("Failed to read configuration file: {0}")]
    ReadError(String),

    /// Failed to parse configuration file.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl PartialsConfig {
    /// Load configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let value = read_table(path)?;
        Self::from_value(value, path)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Get default global configuration file path.
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".partials")
            .join("config.toml")
    }

    /// Get default local configuration file path.
    pub fn default_local_path() -> PathBuf {
        PathBuf::from("partials.toml")
    }

    /// Discover and load configuration files.
    ///
    /// Loads configuration from:
    /// 1. Global config (~/.partials/config.toml)
    /// 2. Local config (./partials.toml)
    ///
    /// Missing files are skipped. A file that exists but cannot be read or
    /// parsed is an error.
    pub fn discover_and_load() -> ConfigResult<Self> {
        Self::load_layered(&[Self::default_global_path(), Self::default_local_path()])
    }

    /// Load and merge `paths` in order, later files overriding earlier ones.
    pub fn load_layered(paths: &[PathBuf]) -> ConfigResult<Self> {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let mut last = PathBuf::from("<defaults>");
        for path in paths {
            match read_table(path) {
                Ok(value) => {
                    merge_values(&mut merged, value);
                    last.clone_from(path);
                }
                Err(ConfigError::NotFound(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Self::from_value(merged, &last)
    }

    /// Check values that serde cannot.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.loader.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue("loader.timeout_ms must be positive".to_string()));
        }
        if let Some(components) = &self.loader.components {
            let mut ids = HashSet::new();
            for component in components {
                if !ids.insert(component.element_id.as_str()) {
                    return Err(ConfigError::InvalidValue(format!(
                        "duplicate component element id: {}",
                        component.element_id
                    )));
                }
            }
        }
        if self.stylesheet.anchor_href.is_empty() || self.stylesheet.href.is_empty() {
            return Err(ConfigError::InvalidValue("stylesheet hrefs must not be empty".to_string()));
        }
        Ok(())
    }

    fn from_value(value: toml::Value, path: &Path) -> ConfigResult<Self> {
        let config: Self = value
            .try_into()
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }
}

fn read_table(path: &Path) -> ConfigResult<toml::Value> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Merge `overlay` into `base`. Tables merge key by key; anything else replaces.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PartialsConfig::default();
        assert_eq!(config.site.root, PathBuf::from("."));
        assert_eq!(config.site.template, DEFAULT_TEMPLATE);
        assert_eq!(config.loader.timeout(), Duration::from_millis(3000));
        assert!(config.loader.mobile_nav_toggle);
        assert_eq!(config.loader.registry(), ComponentRegistry::default());
        assert_eq!(config.stylesheet.href, DEFAULT_STYLESHEET_HREF);
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(PartialsConfig::from_toml_str("").unwrap(), PartialsConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("partials.toml");
        std::fs::write(
            &path,
            r#"
[site]
root = "public"

[loader]
timeout_ms = 1500
mobile_nav_toggle = false

[[loader.components]]
element_id = "header-component"
path = "parts/header.html"
priority = 1
"#,
        )
        .unwrap();

        let config = PartialsConfig::load_from_file(&path).unwrap();
        assert_eq!(config.site.root, PathBuf::from("public"));
        assert_eq!(config.site.template, DEFAULT_TEMPLATE);
        assert_eq!(config.loader.timeout_ms, 1500);
        assert!(!config.loader.mobile_nav_toggle);
        let registry = config.loader.registry();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("header-component").unwrap().path, "parts/header.html");
    }

    #[test]
    fn test_missing_file() {
        let err = PartialsConfig::load_from_file(Path::new("/nonexistent/partials.toml"));
        assert!(matches!(err, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_layered_local_overrides_global() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let local = dir.path().join("local.toml");
        std::fs::write(&global, "[loader]\ntimeout_ms = 1000\nbase_url = \"https://example.org/\"\n")
            .unwrap();
        std::fs::write(&local, "[loader]\ntimeout_ms = 2000\n").unwrap();

        let config = PartialsConfig::load_layered(&[global, local, dir.path().join("absent.toml")])
            .unwrap();
        assert_eq!(config.loader.timeout_ms, 2000);
        assert_eq!(config.loader.base_url.as_deref(), Some("https://example.org/"));
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[loader\n").unwrap();
        assert!(matches!(
            PartialsConfig::load_layered(&[path]),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let err = PartialsConfig::from_toml_str("[loader]\ntimeout_ms = 0\n");
        assert!(matches!(err, Err(ConfigError::InvalidValue(_))));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let err = PartialsConfig::from_toml_str(
            r#"
[[loader.components]]
element_id = "a"
path = "a.html"
priority = 1

[[loader.components]]
element_id = "a"
path = "b.html"
priority = 2
"#,
        );
        assert!(matches!(err, Err(ConfigError::InvalidValue(_))));
    }
}
