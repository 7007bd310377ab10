use std::collections::BTreeMap;

use rstore_path::StoragePath;

use crate::error::BlobResult;

/// One immediate child of a folder, as seen by the blob store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlobEntry {
    /// A subfolder. Its listing name ends with `/`.
    Folder,
    /// A document with its current content length.
    Document { size: u64 },
}

impl BlobEntry {
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder)
    }

    /// Content length for documents, `None` for folders.
    pub fn size(&self) -> Option<u64> {
        match self {
            Self::Folder => None,
            Self::Document { size } => Some(*size),
        }
    }
}

/// Folder contents keyed by child name, sorted by name.
pub type BlobListing = BTreeMap<String, BlobEntry>;

/// Hierarchical document content store.
///
/// All implementations must satisfy these invariants:
/// - A folder exists exactly while some document lives below it.
/// - `put` creates missing ancestors and never exposes partial content.
/// - `delete` removes every ancestor that became empty, closest first,
///   stopping at the first non-empty one or at the module root.
/// - `list` of a folder that does not exist is empty, not an error.
pub trait BlobStore: Send + Sync {
    /// Read a document's content.
    ///
    /// Returns [`BlobError::DocumentMissing`](crate::BlobError::DocumentMissing)
    /// if there is no document at `path`.
    fn get(&self, path: &StoragePath) -> BlobResult<Vec<u8>>;

    /// Create or replace a document, creating missing ancestor folders.
    fn put(&self, path: &StoragePath, content: &[u8]) -> BlobResult<()>;

    /// Delete a document and every ancestor folder left empty.
    ///
    /// Returns the folders that were physically removed, closest first.
    fn delete(&self, path: &StoragePath) -> BlobResult<Vec<StoragePath>>;

    /// List the immediate children of a folder.
    fn list(&self, folder: &StoragePath) -> BlobResult<BlobListing>;

    /// Content length of a document, `None` if it does not exist.
    fn size(&self, path: &StoragePath) -> BlobResult<Option<u64>>;

    /// Check whether a document exists.
    fn exists(&self, path: &StoragePath) -> BlobResult<bool> {
        Ok(self.size(path)?.is_some())
    }
}
