//! HTTP adapter for rstore.
//!
//! Translates remoteStorage-style requests into [`StorageCoordinator`]
//! calls and coordinator results into responses:
//!
//! | Request                     | Coordinator call   | Success                          |
//! |-----------------------------|--------------------|----------------------------------|
//! | `GET /storage/<document>`   | `get_document`     | 200, body, `Content-Type`, `ETag` |
//! | `GET /storage/<folder>/`    | `folder`           | 200, `application/ld+json`       |
//! | `PUT /storage/<document>`   | `put_document`     | 200, `ETag`                      |
//! | `DELETE /storage/<document>`| `delete_document`  | 200                              |
//!
//! Invalid paths answer 400, missing documents 404, storage failures 500.
//! Authentication is not handled here.
//!
//! [`StorageCoordinator`]: rstore_core::StorageCoordinator

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::RstoreServer;
