//! CLI configuration loading.

use partials_core::PartialsConfig;
use std::path::Path;

/// Load configuration.
///
/// Configuration precedence:
/// 1. `--config <file>` (discovery is skipped)
/// 2. Local config file (./partials.toml)
/// 3. Global config file (~/.partials/config.toml)
/// 4. Defaults
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<PartialsConfig> {
    let config = match explicit {
        Some(path) => PartialsConfig::load_from_file(path)?,
        None => PartialsConfig::discover_and_load()?,
    };
    tracing::debug!(root = %config.site.root.display(), "Configuration loaded");
    Ok(config)
}
