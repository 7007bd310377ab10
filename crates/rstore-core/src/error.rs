use rstore_blob::BlobError;
use rstore_meta::MetaError;
use rstore_path::{PathError, StoragePath};

/// Errors surfaced by the storage coordinator.
///
/// `InvalidPath` and `DocumentNotFound` are expected outcomes a caller
/// reports back to its client. `Blob` and `Meta` are storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The path is malformed, or names a folder where a document is
    /// required (or the other way around).
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The document does not exist, or its content and metadata disagree.
    #[error("document not found: {0}")]
    DocumentNotFound(StoragePath),

    /// The blob store failed.
    #[error("blob storage error: {0}")]
    Blob(BlobError),

    /// The version store failed.
    #[error("metadata storage error: {0}")]
    Meta(#[from] MetaError),
}

impl StorageError {
    pub(crate) fn not_a(path: &StoragePath, expected: &str) -> Self {
        Self::InvalidPath {
            path: path.to_string(),
            reason: format!("not a {expected}"),
        }
    }

    /// Whether the error comes from the underlying storage rather than the
    /// request itself.
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Blob(_) | Self::Meta(_))
    }
}

impl From<PathError> for StorageError {
    fn from(e: PathError) -> Self {
        match e {
            PathError::Invalid { path, reason } => Self::InvalidPath { path, reason },
        }
    }
}

impl From<BlobError> for StorageError {
    fn from(e: BlobError) -> Self {
        match e {
            BlobError::DocumentMissing(path) => Self::DocumentNotFound(path),
            BlobError::WrongKind { path, expected } => Self::not_a(&path, expected),
            other => Self::Blob(other),
        }
    }
}

/// Result alias for coordinator operations.
pub type StorageResult<T> = Result<T, StorageError>;
