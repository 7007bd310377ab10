//! Filesystem-backed blob store.
//!
//! Documents are plain files under a base directory, mirroring the storage
//! path exactly: `/alice/notes/todo.txt` lives at `<base>/alice/notes/todo.txt`.
//! New content is staged in `<base>/.staging/` and renamed into place. User
//! names cannot start with `.`, so the staging area is outside every
//! namespace.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use rstore_path::StoragePath;
use tracing::{debug, warn};

use crate::error::{BlobError, BlobResult};
use crate::traits::{BlobEntry, BlobListing, BlobStore};

/// Directory under the base that holds in-flight writes.
pub const STAGING_DIR: &str = ".staging";

/// Blob store rooted at a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    base_dir: PathBuf,
    staging_dir: PathBuf,
}

impl FsBlobStore {
    /// Open a store rooted at `base_dir`, creating the directory if needed.
    ///
    /// Writes interrupted by an earlier crash are discarded.
    pub fn open(base_dir: impl Into<PathBuf>) -> io::Result<Self> {
        let base_dir = base_dir.into();
        let staging_dir = base_dir.join(STAGING_DIR);
        fs::create_dir_all(&staging_dir)?;

        let mut discarded = 0usize;
        for entry in fs::read_dir(&staging_dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                fs::remove_file(entry.path())?;
                discarded += 1;
            }
        }
        if discarded > 0 {
            warn!(discarded, "discarded interrupted writes");
        }

        debug!(base_dir = %base_dir.display(), "opened blob store");
        Ok(Self {
            base_dir,
            staging_dir,
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn fs_path(&self, path: &StoragePath) -> PathBuf {
        self.base_dir.join(path.as_str().trim_start_matches('/'))
    }

    fn require_document(path: &StoragePath) -> BlobResult<()> {
        if path.is_folder() {
            return Err(BlobError::WrongKind {
                path: path.clone(),
                expected: "document",
            });
        }
        Ok(())
    }

    fn is_empty_dir(&self, folder: &StoragePath) -> BlobResult<bool> {
        let mut entries = fs::read_dir(self.fs_path(folder)).map_err(|source| {
            BlobError::ListDirectory {
                path: folder.clone(),
                source,
            }
        })?;
        Ok(entries.next().is_none())
    }
}

impl BlobStore for FsBlobStore {
    fn get(&self, path: &StoragePath) -> BlobResult<Vec<u8>> {
        Self::require_document(path)?;
        let target = self.fs_path(path);
        match fs::metadata(&target) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(BlobError::DocumentMissing(path.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BlobError::DocumentMissing(path.clone()))
            }
            Err(source) => {
                return Err(BlobError::ReadContent {
                    path: path.clone(),
                    source,
                })
            }
        }
        fs::read(&target).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => BlobError::DocumentMissing(path.clone()),
            _ => BlobError::ReadContent {
                path: path.clone(),
                source,
            },
        })
    }

    fn put(&self, path: &StoragePath, content: &[u8]) -> BlobResult<()> {
        Self::require_document(path)?;
        let target = self.fs_path(path);
        let dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.base_dir.clone());

        fs::create_dir_all(&dir).map_err(|source| BlobError::CreateDirectory {
            path: path.clone(),
            source,
        })?;

        let write_err = |source: io::Error| BlobError::WriteContent {
            path: path.clone(),
            source,
        };
        let mut tmp = tempfile::NamedTempFile::new_in(&self.staging_dir).map_err(write_err)?;
        tmp.write_all(content).map_err(write_err)?;
        tmp.as_file().sync_data().map_err(write_err)?;
        tmp.persist(&target).map_err(|e| write_err(e.error))?;

        debug!(path = %path, bytes = content.len(), "document written");
        Ok(())
    }

    fn delete(&self, path: &StoragePath) -> BlobResult<Vec<StoragePath>> {
        Self::require_document(path)?;
        let target = self.fs_path(path);
        match fs::symlink_metadata(&target) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Err(BlobError::DocumentMissing(path.clone())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(BlobError::DocumentMissing(path.clone()))
            }
            Err(source) => {
                return Err(BlobError::RemoveDocument {
                    path: path.clone(),
                    source,
                })
            }
        }
        fs::remove_file(&target).map_err(|source| BlobError::RemoveDocument {
            path: path.clone(),
            source,
        })?;

        let mut removed = Vec::new();
        for folder in path.ancestors() {
            if !self.is_empty_dir(&folder)? {
                break;
            }
            if let Err(source) = fs::remove_dir(self.fs_path(&folder)) {
                // A concurrent writer may have populated the folder since the
                // emptiness check; it stays, and so do its ancestors.
                if !self.is_empty_dir(&folder)? {
                    warn!(folder = %folder, "folder repopulated during delete");
                    break;
                }
                return Err(BlobError::RemoveDirectory {
                    path: folder,
                    source,
                });
            }
            debug!(folder = %folder, "removed empty folder");
            removed.push(folder);
        }

        debug!(path = %path, removed = removed.len(), "document deleted");
        Ok(removed)
    }

    fn list(&self, folder: &StoragePath) -> BlobResult<BlobListing> {
        if !folder.is_folder() {
            return Err(BlobError::WrongKind {
                path: folder.clone(),
                expected: "folder",
            });
        }
        let list_err = |source: io::Error| BlobError::ListDirectory {
            path: folder.clone(),
            source,
        };

        let entries = match fs::read_dir(self.fs_path(folder)) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BlobListing::new()),
            Err(e) => return Err(list_err(e)),
        };

        let mut listing = BlobListing::new();
        for entry in entries {
            let entry = entry.map_err(list_err)?;
            let Ok(name) = entry.file_name().into_string() else {
                warn!(folder = %folder, "skipping non UTF-8 entry");
                continue;
            };
            let file_type = entry.file_type().map_err(list_err)?;
            if file_type.is_dir() {
                listing.insert(format!("{name}/"), BlobEntry::Folder);
            } else if file_type.is_file() {
                let size = entry.metadata().map_err(list_err)?.len();
                listing.insert(name, BlobEntry::Document { size });
            }
        }
        Ok(listing)
    }

    fn size(&self, path: &StoragePath) -> BlobResult<Option<u64>> {
        Self::require_document(path)?;
        match fs::metadata(self.fs_path(path)) {
            Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(BlobError::ReadContent {
                path: path.clone(),
                source,
            }),
        }
    }
}
