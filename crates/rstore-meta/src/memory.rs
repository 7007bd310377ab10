//! In-memory version store for tests and ephemeral use.

use std::sync::RwLock;

use rstore_path::StoragePath;

use crate::batch::VersionBatch;
use crate::error::{MetaError, MetaResult};
use crate::table::{VersionRecord, VersionTable};
use crate::traits::VersionStore;

/// A [`VersionStore`] holding its table behind a `RwLock`.
///
/// Batches run under the write lock, which serializes every mutation.
/// Data is lost when the store is dropped.
#[derive(Debug, Default)]
pub struct InMemoryVersionStore {
    table: RwLock<VersionTable>,
}

impl InMemoryVersionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the current table.
    pub fn snapshot(&self) -> MetaResult<VersionTable> {
        let table = self
            .table
            .read()
            .map_err(|e| MetaError::LockPoisoned(e.to_string()))?;
        Ok(table.clone())
    }
}

impl VersionStore for InMemoryVersionStore {
    fn record(&self, path: &StoragePath) -> MetaResult<Option<VersionRecord>> {
        let table = self
            .table
            .read()
            .map_err(|e| MetaError::LockPoisoned(e.to_string()))?;
        Ok(table.get(path.as_str()).cloned())
    }

    fn apply(&self, batch: &VersionBatch) -> MetaResult<Vec<u64>> {
        let mut table = self
            .table
            .write()
            .map_err(|e| MetaError::LockPoisoned(e.to_string()))?;
        Ok(table.apply(batch)?.versions)
    }
}
