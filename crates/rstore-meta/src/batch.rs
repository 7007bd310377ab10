//! Grouping of version mutations into one atomic unit.

use rstore_path::StoragePath;

/// A single metadata mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VersionOp {
    /// Create the entry at version 1, or increment it.
    BumpOrCreate(StoragePath),
    /// Record the content type of an existing document entry.
    SetContentType(StoragePath, String),
    /// Remove the entry entirely.
    Clear(StoragePath),
}

/// An ordered list of mutations applied all-or-nothing.
///
/// ```
/// use rstore_meta::{InMemoryVersionStore, VersionBatch, VersionStore};
/// use rstore_path::StoragePath;
///
/// let doc = StoragePath::parse("/admin/notes/a.txt").unwrap();
/// let mut batch = VersionBatch::new();
/// batch.bump(doc.clone()).set_content_type(doc.clone(), "text/plain");
///
/// let store = InMemoryVersionStore::new();
/// assert_eq!(store.apply(&batch).unwrap(), vec![1]);
/// assert_eq!(store.content_type(&doc).unwrap().as_deref(), Some("text/plain"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VersionBatch {
    ops: Vec<VersionOp>,
}

impl VersionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&mut self, path: StoragePath) -> &mut Self {
        self.ops.push(VersionOp::BumpOrCreate(path));
        self
    }

    pub fn set_content_type(&mut self, path: StoragePath, content_type: impl Into<String>) -> &mut Self {
        self.ops
            .push(VersionOp::SetContentType(path, content_type.into()));
        self
    }

    pub fn clear(&mut self, path: StoragePath) -> &mut Self {
        self.ops.push(VersionOp::Clear(path));
        self
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn ops(&self) -> &[VersionOp] {
        &self.ops
    }
}
