use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rstore_core::{FileVersionStore, FsBlobStore, StorageCoordinator};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            storage: StorageConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load a TOML config file. Missing keys take their defaults.
    pub fn load(path: &Path) -> ServerResult<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw).map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))
    }
}

/// Where documents and version metadata live.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Root of all storage. Documents go to `<data_dir>/documents`.
    pub data_dir: PathBuf,
    /// Version table file; defaults to `<data_dir>/versions.json`.
    pub metadata_file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            metadata_file: None,
        }
    }
}

impl StorageConfig {
    pub fn documents_dir(&self) -> PathBuf {
        self.data_dir.join("documents")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.metadata_file
            .clone()
            .unwrap_or_else(|| self.data_dir.join("versions.json"))
    }

    /// Open the filesystem backends and wire them into a coordinator.
    pub fn open_coordinator(&self) -> ServerResult<StorageCoordinator> {
        let blobs = FsBlobStore::open(self.documents_dir())?;
        let versions = FileVersionStore::open(self.metadata_path())
            .map_err(|e| ServerError::Config(format!("version table: {e}")))?;
        tracing::info!(
            documents = %self.documents_dir().display(),
            metadata = %self.metadata_path().display(),
            "storage opened"
        );
        Ok(StorageCoordinator::new(Arc::new(blobs), Arc::new(versions)))
    }
}
