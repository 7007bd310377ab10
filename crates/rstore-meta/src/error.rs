//! Error types for metadata operations.

use thiserror::Error;

/// Errors from version store operations.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A content type was set on a path that has no version entry.
    #[error("no version entry for {0}")]
    MissingEntry(String),

    /// A version counter cannot be incremented any further.
    #[error("version overflow for {0}")]
    Overflow(String),

    /// The persisted table could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the backing file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A lock guarding the table was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for metadata operations.
pub type MetaResult<T> = Result<T, MetaError>;
