//! Errors raised by graph definition and navigation.

use thiserror::Error;

/// Errors that can occur when defining states or moving between them.
///
/// Every variant is a caller contract violation; nothing here is transient.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("state '{name}' does not exist in {scope}")]
    NotFound { name: String, scope: String },

    #[error("state '{name}' is already defined in {scope}")]
    AlreadyDefined { name: String, scope: String },

    #[error("already at state '{name}'")]
    AlreadyActive { name: String },

    #[error("a state definition needs at least one name")]
    MissingName,

    #[error("state '{name}' is detached from its root graph")]
    Detached { name: String },
}

impl GraphError {
    /// Returns whether the error names a state that was never defined.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }

    /// Short stable code, handy for host-side error reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphError::NotFound { .. } => "NOT_FOUND",
            GraphError::AlreadyDefined { .. } => "ALREADY_DEFINED",
            GraphError::AlreadyActive { .. } => "ALREADY_ACTIVE",
            GraphError::MissingName => "MISSING_NAME",
            GraphError::Detached { .. } => "DETACHED",
        }
    }
}
