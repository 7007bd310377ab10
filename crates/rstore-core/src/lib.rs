//! Storage coordination for rstore.
//!
//! [`StorageCoordinator`] is the only entry point adapters use. It keeps
//! document content (a [`BlobStore`]) and version metadata (a
//! [`VersionStore`]) consistent, and derives folder listings from both.
//!
//! # The cascade
//!
//! Writing or deleting a document changes the version of every folder
//! between the document and the module root (`/<user>/`, never versioned):
//!
//! ```text
//! put /admin/messages/foo/hello.txt    hello.txt=1  foo/=1  messages/=1
//! put /admin/messages/foo/bar.txt      bar.txt=1    foo/=2  messages/=2
//! delete /admin/messages/foo/hello.txt              foo/=3  messages/=3
//! delete /admin/messages/foo/bar.txt                foo/ and messages/ cleared
//! ```
//!
//! Each cascade is a single [`VersionBatch`](rstore_meta::VersionBatch),
//! so the metadata side of an operation applies completely or not at all.

pub mod coordinator;
pub mod error;
pub mod types;

pub use coordinator::StorageCoordinator;
pub use error::{StorageError, StorageResult};
pub use types::{Document, FolderItem, FolderListing, FOLDER_CONTEXT};

pub use rstore_blob::{BlobStore, FsBlobStore, InMemoryBlobStore};
pub use rstore_meta::{FileVersionStore, InMemoryVersionStore, VersionStore};
pub use rstore_path::StoragePath;
