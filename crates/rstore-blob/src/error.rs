use std::io;

use rstore_path::StoragePath;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// No document exists at the path.
    #[error("document missing: {0}")]
    DocumentMissing(StoragePath),

    /// The operation needs a document path but got a folder, or vice versa.
    #[error("{path} is not a {expected}")]
    WrongKind {
        path: StoragePath,
        expected: &'static str,
    },

    /// An ancestor directory could not be created.
    #[error("unable to create directory for {path}: {source}")]
    CreateDirectory {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// Document content could not be written or published.
    #[error("unable to write document {path}: {source}")]
    WriteContent {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// Document content could not be read.
    #[error("unable to read document {path}: {source}")]
    ReadContent {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// The document file could not be removed.
    #[error("unable to delete document {path}: {source}")]
    RemoveDocument {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// An emptied folder could not be removed.
    #[error("unable to delete folder {path}: {source}")]
    RemoveDirectory {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// A folder could not be enumerated.
    #[error("unable to read folder {path}: {source}")]
    ListDirectory {
        path: StoragePath,
        #[source]
        source: io::Error,
    },

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl BlobError {
    /// Whether this error reports a missing document rather than a failure.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::DocumentMissing(_))
    }
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
