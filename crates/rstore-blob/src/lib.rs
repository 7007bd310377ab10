//! Document content storage for rstore.
//!
//! A blob store holds the raw bytes of every document, keyed by its
//! [`StoragePath`](rstore_path::StoragePath). Folders are not stored
//! explicitly: they exist while at least one document lives below them.
//! Writing a document creates its missing ancestor folders, deleting one
//! removes every ancestor that became empty (up to the module root).
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`FsBlobStore`] -- plain directory tree under a base directory
//! - [`InMemoryBlobStore`] -- `BTreeMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Content writes are published atomically (write to a temp file, rename).
//! 2. Listing a folder that does not exist yields an empty listing.
//! 3. The store never interprets document contents.
//! 4. All I/O errors are propagated with the path that caused them.

pub mod error;
pub mod fs;
pub mod memory;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use traits::{BlobEntry, BlobListing, BlobStore};
