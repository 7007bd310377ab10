//! In-memory blob store for testing and embedding.

use std::collections::BTreeMap;
use std::io;
use std::sync::RwLock;

use rstore_path::StoragePath;

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobEntry, BlobListing, BlobStore};

/// In-memory, `BTreeMap`-based blob store.
///
/// Only documents are stored; a folder exists while some document path has
/// it as a prefix, which matches the filesystem backend's behavior of
/// pruning emptied directories.
pub struct InMemoryBlobStore {
    documents: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of documents currently stored.
    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or_default()
    }

    /// Returns `true` if the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> BlobError {
        BlobError::LockPoisoned(e.to_string())
    }
}

/// Whether any key lies below `prefix` (a folder path ending in `/`).
fn has_descendant(documents: &BTreeMap<String, Vec<u8>>, prefix: &str) -> bool {
    documents
        .range(prefix.to_string()..)
        .next()
        .is_some_and(|(k, _)| k.starts_with(prefix))
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn get(&self, path: &StoragePath) -> BlobResult<Vec<u8>> {
        let documents = self.documents.read().map_err(Self::poisoned)?;
        documents
            .get(path.as_str())
            .cloned()
            .ok_or_else(|| BlobError::DocumentMissing(path.clone()))
    }

    fn put(&self, path: &StoragePath, content: &[u8]) -> BlobResult<()> {
        if path.is_folder() {
            return Err(BlobError::WrongKind {
                path: path.clone(),
                expected: "document",
            });
        }
        let mut documents = self.documents.write().map_err(Self::poisoned)?;

        // Mirror the filesystem: a document cannot shadow a folder, and a
        // folder cannot be created where a document lives.
        for folder in path.ancestors() {
            let as_document = folder.as_str().trim_end_matches('/');
            if documents.contains_key(as_document) {
                return Err(BlobError::CreateDirectory {
                    path: path.clone(),
                    source: io::Error::other(format!("{as_document} is a document")),
                });
            }
        }
        if has_descendant(&documents, &format!("{path}/")) {
            return Err(BlobError::WriteContent {
                path: path.clone(),
                source: io::Error::other(format!("{path} is a folder")),
            });
        }

        documents.insert(path.as_str().to_string(), content.to_vec());
        Ok(())
    }

    fn delete(&self, path: &StoragePath) -> BlobResult<Vec<StoragePath>> {
        let mut documents = self.documents.write().map_err(Self::poisoned)?;
        if documents.remove(path.as_str()).is_none() {
            return Err(BlobError::DocumentMissing(path.clone()));
        }

        let mut removed = Vec::new();
        for folder in path.ancestors() {
            if has_descendant(&documents, folder.as_str()) {
                break;
            }
            removed.push(folder);
        }
        Ok(removed)
    }

    fn list(&self, folder: &StoragePath) -> BlobResult<BlobListing> {
        if !folder.is_folder() {
            return Err(BlobError::WrongKind {
                path: folder.clone(),
                expected: "folder",
            });
        }
        let documents = self.documents.read().map_err(Self::poisoned)?;
        let prefix = folder.as_str();

        let mut listing = BlobListing::new();
        for (key, content) in documents
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
        {
            let rest = &key[prefix.len()..];
            match rest.find('/') {
                Some(i) => {
                    listing.insert(rest[..=i].to_string(), BlobEntry::Folder);
                }
                None => {
                    listing.insert(
                        rest.to_string(),
                        BlobEntry::Document {
                            size: content.len() as u64,
                        },
                    );
                }
            }
        }
        Ok(listing)
    }

    fn size(&self, path: &StoragePath) -> BlobResult<Option<u64>> {
        let documents = self.documents.read().map_err(Self::poisoned)?;
        Ok(documents.get(path.as_str()).map(|c| c.len() as u64))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("document_count", &self.len())
            .finish()
    }
}
