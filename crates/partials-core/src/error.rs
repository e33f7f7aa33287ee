//! Error types for partials.

use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::migrate::MigrationError;
use crate::stylesheet::StylesheetError;
use thiserror::Error;

/// Crate-level error.
#[derive(Error, Debug)]
pub enum PartialsError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Fragment source errors
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Page migration errors
    #[error("Migration error: {0}")]
    Migration(#[from] MigrationError),

    /// Stylesheet injection errors
    #[error("Stylesheet error: {0}")]
    Stylesheet(#[from] StylesheetError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for partials operations.
pub type Result<T> = std::result::Result<T, PartialsError>;
