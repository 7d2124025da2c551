//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Settings document was not valid JSON or had unknown values
    #[error("Failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}
