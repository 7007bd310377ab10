use tokio::net::TcpListener;

use rstore_core::StorageCoordinator;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::AppState;
use crate::router::build_router;

/// rstore HTTP server.
pub struct RstoreServer {
    config: ServerConfig,
    state: AppState,
}

impl RstoreServer {
    /// Open the configured storage and prepare a server for it.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let storage = config.storage.open_coordinator()?;
        Ok(Self::with_storage(config, storage))
    }

    /// Serve an already constructed coordinator.
    pub fn with_storage(config: ServerConfig, storage: StorageCoordinator) -> Self {
        Self {
            config,
            state: AppState::new(storage),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = self.router();
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("rstore server listening on {}", self.config.bind_addr);
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
