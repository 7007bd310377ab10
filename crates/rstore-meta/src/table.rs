//! The version table shared by all backends.
//!
//! [`VersionTable::apply`] runs a batch against the table while keeping an
//! undo log of every entry it touches. If any operation fails, the log is
//! replayed in reverse before the error is returned, so a batch is never
//! left half-applied. Backends that publish the table somewhere durable
//! keep the [`AppliedBatch`] until publishing succeeds and hand it back to
//! [`VersionTable::rollback`] otherwise.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::batch::{VersionBatch, VersionOp};
use crate::error::{MetaError, MetaResult};

/// Metadata stored for a single path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRecord {
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Result of a successfully applied batch.
#[derive(Debug)]
pub struct AppliedBatch {
    /// New versions produced by the batch's bump operations, in order.
    pub versions: Vec<u64>,
    undo: Vec<(String, Option<VersionRecord>)>,
}

/// Flat path-keyed version table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTable {
    records: BTreeMap<String, VersionRecord>,
}

impl VersionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&VersionRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all records in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VersionRecord)> {
        self.records.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Apply every operation of `batch`, or none of them.
    pub fn apply(&mut self, batch: &VersionBatch) -> MetaResult<AppliedBatch> {
        let mut applied = AppliedBatch {
            versions: Vec::new(),
            undo: Vec::with_capacity(batch.len()),
        };
        for op in batch.ops() {
            if let Err(e) = self.apply_one(op, &mut applied) {
                self.rollback(applied);
                return Err(e);
            }
        }
        Ok(applied)
    }

    /// Revert a batch previously returned by [`apply`](Self::apply).
    ///
    /// Must be called before any other batch is applied to the table.
    pub fn rollback(&mut self, applied: AppliedBatch) {
        for (key, previous) in applied.undo.into_iter().rev() {
            match previous {
                Some(record) => {
                    self.records.insert(key, record);
                }
                None => {
                    self.records.remove(&key);
                }
            }
        }
    }

    fn apply_one(&mut self, op: &VersionOp, applied: &mut AppliedBatch) -> MetaResult<()> {
        match op {
            VersionOp::BumpOrCreate(path) => {
                let key = path.as_str();
                let previous = self.records.get(key).cloned();
                let version = match &previous {
                    Some(record) => record
                        .version
                        .checked_add(1)
                        .ok_or_else(|| MetaError::Overflow(key.to_string()))?,
                    None => 1,
                };
                let content_type = previous.as_ref().and_then(|r| r.content_type.clone());
                applied.undo.push((key.to_string(), previous));
                self.records.insert(
                    key.to_string(),
                    VersionRecord {
                        version,
                        content_type,
                    },
                );
                applied.versions.push(version);
            }
            VersionOp::SetContentType(path, content_type) => {
                let key = path.as_str();
                let record = self
                    .records
                    .get_mut(key)
                    .ok_or_else(|| MetaError::MissingEntry(key.to_string()))?;
                applied.undo.push((key.to_string(), Some(record.clone())));
                record.content_type = Some(content_type.clone());
            }
            VersionOp::Clear(path) => {
                let key = path.as_str();
                if let Some(previous) = self.records.remove(key) {
                    applied.undo.push((key.to_string(), Some(previous)));
                }
            }
        }
        Ok(())
    }
}
