use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler::{self, AppState};

/// Build the axum router with all rstore endpoints.
///
/// Storage paths are served below `/storage`, so `/storage/admin/notes/a.txt`
/// addresses the document `/admin/notes/a.txt`.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handler::health_handler))
        .route(
            "/storage/*path",
            get(handler::get_handler)
                .put(handler::put_handler)
                .delete(handler::delete_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
