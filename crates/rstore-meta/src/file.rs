//! File-backed version store.
//!
//! The whole table is kept in memory and written out as one JSON document
//! after every batch. Publishing goes through a temp file in the same
//! directory followed by a rename, so the file on disk always holds either
//! the state before a batch or the state after it.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use rstore_path::StoragePath;
use tracing::{debug, info, warn};

use crate::batch::VersionBatch;
use crate::error::{MetaError, MetaResult};
use crate::table::{VersionRecord, VersionTable};
use crate::traits::VersionStore;

/// A [`VersionStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileVersionStore {
    path: PathBuf,
    table: RwLock<VersionTable>,
}

impl FileVersionStore {
    /// Open the table at `path`, starting empty if the file does not exist.
    pub fn open(path: impl Into<PathBuf>) -> MetaResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let table = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| MetaError::Serialization(format!("{}: {e}", path.display())))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => VersionTable::new(),
            Err(e) => return Err(e.into()),
        };
        info!(path = %path.display(), entries = table.len(), "opened version table");

        Ok(Self {
            path,
            table: RwLock::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn publish(&self, table: &VersionTable) -> MetaResult<()> {
        let bytes = serde_json::to_vec_pretty(table)
            .map_err(|e| MetaError::Serialization(e.to_string()))?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| MetaError::Io(e.error))?;
        Ok(())
    }
}

impl VersionStore for FileVersionStore {
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

        let applied = table.apply(batch)?;
        if let Err(e) = self.publish(&table) {
            warn!(path = %self.path.display(), error = %e, "publishing version table failed; rolling back");
            table.rollback(applied);
            return Err(e);
        }

        debug!(ops = batch.len(), "version batch committed");
        Ok(applied.versions)
    }
}
