//! Version metadata for rstore.
//!
//! Every document and every non-empty folder has a version counter that
//! clients see as its ETag. Documents additionally carry a content type.
//! The metadata is a flat table keyed by the normalized path string:
//!
//! ```json
//! {
//!   "/admin/messages/": { "version": 2 },
//!   "/admin/messages/hello.txt": { "version": 1, "contentType": "text/plain" }
//! }
//! ```
//!
//! # Modules
//!
//! - [`error`]: [`MetaError`] and the [`MetaResult`] alias
//! - [`batch`]: [`VersionBatch`], an all-or-nothing group of mutations
//! - [`table`]: [`VersionTable`], the shared table logic with rollback
//! - [`traits`]: the [`VersionStore`] trait
//! - [`memory`]: [`InMemoryVersionStore`]
//! - [`file`]: [`FileVersionStore`], a JSON table published by rename

pub mod batch;
pub mod error;
pub mod file;
pub mod memory;
pub mod table;
pub mod traits;

pub use batch::{VersionBatch, VersionOp};
pub use error::{MetaError, MetaResult};
pub use file::FileVersionStore;
pub use memory::InMemoryVersionStore;
pub use table::{AppliedBatch, VersionRecord, VersionTable};
pub use traits::VersionStore;
