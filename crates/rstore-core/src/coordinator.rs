use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use rstore_blob::{BlobEntry, BlobStore, InMemoryBlobStore};
use rstore_meta::{InMemoryVersionStore, VersionBatch, VersionStore};
use rstore_path::StoragePath;
use tracing::{debug, warn};

use crate::error::{StorageError, StorageResult};
use crate::types::{Document, FolderItem, FolderListing};

/// Coordinates document content and version metadata.
///
/// Every mutation writes the blob first and then applies the whole version
/// cascade as one batch. If the batch fails, the blob change stays and the
/// metadata is unchanged; reads treat that mismatch as "not found".
///
/// A cascade never leaves the user's namespace, so mutations are serialized
/// per user: a put or delete holds its user's lock exclusively from the blob
/// change until the batch is applied, and reads hold it shared.
pub struct StorageCoordinator {
    blobs: Arc<dyn BlobStore>,
    versions: Arc<dyn VersionStore>,
    namespaces: Mutex<HashMap<String, Arc<RwLock<()>>>>,
}

impl StorageCoordinator {
    pub fn new(blobs: Arc<dyn BlobStore>, versions: Arc<dyn VersionStore>) -> Self {
        Self {
            blobs,
            versions,
            namespaces: Mutex::new(HashMap::new()),
        }
    }

    fn namespace(&self, path: &StoragePath) -> Arc<RwLock<()>> {
        // No lock here guards state a panic could leave half-updated.
        let mut namespaces = self
            .namespaces
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(namespaces.entry(path.user().to_string()).or_default())
    }

    /// A coordinator over fresh in-memory stores.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryBlobStore::new()),
            Arc::new(InMemoryVersionStore::new()),
        )
    }

    /// Store a document and bump it and all its versioned ancestors.
    ///
    /// Returns the document's new version.
    pub fn put_document(
        &self,
        path: &StoragePath,
        content_type: &str,
        content: &[u8],
    ) -> StorageResult<u64> {
        if path.is_folder() {
            return Err(StorageError::not_a(path, "document"));
        }

        let namespace = self.namespace(path);
        let _guard = namespace.write().unwrap_or_else(PoisonError::into_inner);

        self.blobs.put(path, content)?;

        let mut batch = VersionBatch::new();
        batch
            .bump(path.clone())
            .set_content_type(path.clone(), content_type);
        for folder in path.ancestors() {
            batch.bump(folder);
        }
        let versions = self.versions.apply(&batch)?;
        let version = versions.first().copied().unwrap_or_default();

        debug!(path = %path, version, bytes = content.len(), "document stored");
        Ok(version)
    }

    /// Read a document with its content type and version.
    pub fn get_document(&self, path: &StoragePath) -> StorageResult<Document> {
        if path.is_folder() {
            return Err(StorageError::not_a(path, "document"));
        }

        let namespace = self.namespace(path);
        let _guard = namespace.read().unwrap_or_else(PoisonError::into_inner);

        let record = self
            .versions
            .record(path)?
            .ok_or_else(|| StorageError::DocumentNotFound(path.clone()))?;
        let content_type = record
            .content_type
            .ok_or_else(|| StorageError::DocumentNotFound(path.clone()))?;
        let content = self.blobs.get(path)?;

        Ok(Document {
            content,
            content_type,
            version: record.version,
        })
    }

    /// Current version of a document or folder; `None` means it does not
    /// exist (or is an empty folder).
    pub fn version(&self, path: &StoragePath) -> StorageResult<Option<u64>> {
        Ok(self.versions.version(path)?)
    }

    /// Delete a document, clearing emptied ancestors and bumping the rest.
    ///
    /// Returns every path that ceased to exist: the document first, then the
    /// folders removed with it, closest first.
    pub fn delete_document(&self, path: &StoragePath) -> StorageResult<Vec<StoragePath>> {
        if path.is_folder() {
            return Err(StorageError::not_a(path, "document"));
        }

        let namespace = self.namespace(path);
        let _guard = namespace.write().unwrap_or_else(PoisonError::into_inner);

        if self.versions.version(path)?.is_none() || !self.blobs.exists(path)? {
            return Err(StorageError::DocumentNotFound(path.clone()));
        }

        let removed_folders = self.blobs.delete(path)?;

        let mut batch = VersionBatch::new();
        batch.clear(path.clone());
        for folder in path.ancestors() {
            if removed_folders.contains(&folder) {
                batch.clear(folder);
            } else {
                batch.bump(folder);
            }
        }
        self.versions.apply(&batch)?;

        debug!(path = %path, removed_folders = removed_folders.len(), "document deleted");
        let mut removed = Vec::with_capacity(removed_folders.len() + 1);
        removed.push(path.clone());
        removed.extend(removed_folders);
        Ok(removed)
    }

    /// Describe a folder's immediate children.
    ///
    /// A folder that was never written to yields an empty listing. Children
    /// without metadata (left behind by a failed cascade) are omitted and
    /// logged.
    pub fn folder(&self, path: &StoragePath) -> StorageResult<FolderListing> {
        if !path.is_folder() {
            return Err(StorageError::not_a(path, "folder"));
        }

        let namespace = self.namespace(path);
        let _guard = namespace.read().unwrap_or_else(PoisonError::into_inner);

        let entries = self.blobs.list(path)?;
        let mut listing = FolderListing::new(self.versions.version(path)?);

        for (name, entry) in entries {
            let child = match path.child(&name) {
                Ok(child) => child,
                Err(e) => {
                    warn!(folder = %path, name = %name, error = %e, "skipping unaddressable entry");
                    continue;
                }
            };
            let item = match entry {
                BlobEntry::Folder => self.versions.version(&child)?.map(FolderItem::folder),
                BlobEntry::Document { size } => {
                    self.versions.record(&child)?.and_then(|record| {
                        record
                            .content_type
                            .map(|ct| FolderItem::document(record.version, ct, size))
                    })
                }
            };
            match item {
                Some(item) => {
                    listing.items.insert(name, item);
                }
                None => warn!(path = %child, "entry has no version metadata; omitted from listing"),
            }
        }

        Ok(listing)
    }
}

impl std::fmt::Debug for StorageCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageCoordinator").finish_non_exhaustive()
    }
}
