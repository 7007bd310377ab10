use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use rstore_core::{StorageCoordinator, StorageError, StoragePath, StorageResult};
use serde_json::json;

use crate::error::{ServerError, ServerResult};

/// Content type of folder descriptions.
pub const FOLDER_CONTENT_TYPE: &str = "application/ld+json";

/// Content type assumed when a PUT carries none.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<StorageCoordinator>,
}

impl AppState {
    pub fn new(storage: StorageCoordinator) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

/// Health check handler.
pub async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET a document, or the description of a folder.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ServerResult<Response> {
    let path = parse_path(&raw)?;
    let storage = Arc::clone(&state.storage);

    if path.is_folder() {
        let listing = blocking(move || storage.folder(&path)).await?;
        let body = serde_json::to_vec(&listing).map_err(|e| ServerError::Internal(e.to_string()))?;
        let mut response = (
            [(header::CONTENT_TYPE, HeaderValue::from_static(FOLDER_CONTENT_TYPE))],
            body,
        )
            .into_response();
        if let Some(version) = listing.version {
            response.headers_mut().insert(header::ETAG, etag_header(version)?);
        }
        return Ok(response);
    }

    let document = blocking(move || storage.get_document(&path)).await?;
    let content_type = HeaderValue::from_str(&document.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::ETAG, etag_header(document.version)?),
        ],
        Body::from(document.content),
    )
        .into_response())
}

/// PUT a document.
pub async fn put_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> ServerResult<Response> {
    let path = parse_path(&raw)?;
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let storage = Arc::clone(&state.storage);

    let version =
        blocking(move || storage.put_document(&path, &content_type, &body)).await?;
    Ok((
        StatusCode::OK,
        [(header::ETAG, etag_header(version)?)],
        Json(json!({})),
    )
        .into_response())
}

/// DELETE a document.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ServerResult<Json<serde_json::Value>> {
    let path = parse_path(&raw)?;
    let storage = Arc::clone(&state.storage);

    let removed = blocking(move || storage.delete_document(&path)).await?;
    let removed: Vec<String> = removed.into_iter().map(String::from).collect();
    Ok(Json(json!({ "removed": removed })))
}

fn parse_path(raw: &str) -> ServerResult<StoragePath> {
    StoragePath::parse(&format!("/{raw}"))
        .map_err(|e| ServerError::Storage(StorageError::from(e)))
}

/// A version as a strong ETag (`"3"`).
fn etag_header(version: u64) -> ServerResult<HeaderValue> {
    HeaderValue::try_from(format!("\"{version}\"")).map_err(|e| ServerError::Internal(e.to_string()))
}

/// Run a coordinator call off the async runtime.
async fn blocking<T, F>(f: F) -> ServerResult<T>
where
    F: FnOnce() -> StorageResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Internal(e.to_string()))?
        .map_err(ServerError::from)
}
