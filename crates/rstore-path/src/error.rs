//! Error types for path parsing.

use thiserror::Error;

/// Errors produced when a raw string is not a valid storage path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    /// The path is malformed or lies outside a module namespace.
    #[error("invalid path {path:?}: {reason}")]
    Invalid { path: String, reason: String },
}

impl PathError {
    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Convenience type alias for path operations.
pub type Result<T> = std::result::Result<T, PathError>;
