/// Structured error types for oneonone-core.
///
/// Binary crates (oneonone-cli) use `anyhow` for convenience,
/// library consumers get structured, composable errors.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for oneonone-core operations
#[derive(Error, Debug)]
pub enum CoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file could not be parsed
    #[error("Invalid config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Config could not be serialized
    #[error("Failed to serialize config: {source}")]
    ConfigSerialize {
        #[from]
        source: toml::ser::Error,
    },

    /// Config value is present but unusable
    #[error("Invalid config value for '{key}': {reason}")]
    InvalidValue { key: &'static str, reason: String },

    /// Config file missing when one was explicitly requested
    #[error("Config not found at {path:?}\n\nRun: oneonone config init")]
    ConfigNotFound { path: PathBuf },
}

/// Result type alias for oneonone-core operations
pub type Result<T> = std::result::Result<T, CoreError>;

impl CoreError {
    /// Create an invalid value error
    pub fn invalid_value(key: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key,
            reason: reason.into(),
        }
    }
}
