//! Storage paths for rstore.
//!
//! Every document and folder is addressed by a `/`-separated path. The first
//! segment names the user (account), the second the module (or `public`
//! followed by the module). Folder paths end with `/`, document paths never
//! do.
//!
//! ```text
//! /admin/                      module root (user folder, never versioned)
//! /admin/messages/             module folder
//! /admin/messages/foo/         folder
//! /admin/messages/foo/bar.txt  document
//! /admin/public/photos/a.jpg   public document in module "photos"
//! ```
//!
//! # Modules
//!
//! - [`error`]: [`PathError`] for rejected paths
//! - [`path`]: [`StoragePath`] parsing and structural queries

pub mod error;
pub mod path;

pub use error::{PathError, Result};
pub use path::{Ancestors, StoragePath, PUBLIC_SEGMENT};
