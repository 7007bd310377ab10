//! The [`VersionStore`] trait defining the metadata storage interface.

use rstore_path::StoragePath;

use crate::batch::VersionBatch;
use crate::error::MetaResult;
use crate::table::VersionRecord;

/// Durable path -> version (and content type) mapping.
///
/// Implementations must be thread-safe (`Send + Sync`) and apply each
/// [`VersionBatch`] atomically: concurrent batches touching the same path
/// are serialized, and a failing batch leaves no trace.
pub trait VersionStore: Send + Sync {
    /// Read the full record for a path.
    ///
    /// Returns `Ok(None)` if the path has no version entry.
    fn record(&self, path: &StoragePath) -> MetaResult<Option<VersionRecord>>;

    /// Apply a batch all-or-nothing.
    ///
    /// Returns the new versions produced by the batch's bump operations,
    /// in the order they appear.
    fn apply(&self, batch: &VersionBatch) -> MetaResult<Vec<u64>>;

    /// Current version of a path, `None` if absent.
    fn version(&self, path: &StoragePath) -> MetaResult<Option<u64>> {
        Ok(self.record(path)?.map(|r| r.version))
    }

    /// Content type recorded for a document, `None` if absent.
    fn content_type(&self, path: &StoragePath) -> MetaResult<Option<String>> {
        Ok(self.record(path)?.and_then(|r| r.content_type))
    }

    /// Atomically create the entry at 1 or increment it.
    fn bump_or_create(&self, path: &StoragePath) -> MetaResult<u64> {
        let mut batch = VersionBatch::new();
        batch.bump(path.clone());
        let versions = self.apply(&batch)?;
        Ok(versions.first().copied().unwrap_or_default())
    }

    /// Record the content type of an existing document entry.
    fn set_content_type(&self, path: &StoragePath, content_type: &str) -> MetaResult<()> {
        let mut batch = VersionBatch::new();
        batch.set_content_type(path.clone(), content_type);
        self.apply(&batch).map(|_| ())
    }

    /// Remove the entry for a path. Clearing an absent entry is a no-op.
    fn clear(&self, path: &StoragePath) -> MetaResult<()> {
        let mut batch = VersionBatch::new();
        batch.clear(path.clone());
        self.apply(&batch).map(|_| ())
    }
}
