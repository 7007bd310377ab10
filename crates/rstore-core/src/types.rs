//! Values returned by the coordinator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// JSON-LD context of a folder description.
pub const FOLDER_CONTEXT: &str = "http://remotestorage.io/spec/folder-description";

/// A document read back from storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub content: Vec<u8>,
    pub content_type: String,
    pub version: u64,
}

/// One entry of a folder listing.
///
/// Folders carry only an ETag; documents also carry their content type and
/// current length.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderItem {
    #[serde(rename = "ETag", with = "etag")]
    pub etag: u64,
    #[serde(
        rename = "Content-Type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_type: Option<String>,
    #[serde(
        rename = "Content-Length",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub content_length: Option<u64>,
}

impl FolderItem {
    pub fn folder(etag: u64) -> Self {
        Self {
            etag,
            content_type: None,
            content_length: None,
        }
    }

    pub fn document(etag: u64, content_type: String, content_length: u64) -> Self {
        Self {
            etag,
            content_type: Some(content_type),
            content_length: Some(content_length),
        }
    }
}

/// A folder description in the remoteStorage JSON-LD format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderListing {
    #[serde(rename = "@context")]
    pub context: String,
    pub items: BTreeMap<String, FolderItem>,
    /// The folder's own version; not part of the JSON body.
    #[serde(skip)]
    pub version: Option<u64>,
}

impl FolderListing {
    pub fn new(version: Option<u64>) -> Self {
        Self {
            context: FOLDER_CONTEXT.to_string(),
            items: BTreeMap::new(),
            version,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// ETags travel as strings on the wire.
mod etag {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(version: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(version)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
