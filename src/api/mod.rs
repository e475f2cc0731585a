// Client API HTTP module
// This module wires the REST handlers into an axum server

pub mod handlers;


use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::engine::{ClientStorage, InMemoryStorage};
use handlers::{
    create_client, delete_client, get_client, health_check, list_clients, not_found,
    update_client, ClientApiState,
};

/// Client API server configuration
#[derive(Clone, Debug)]
pub struct ClientApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

impl Default for ClientApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            cors_enabled: false,
        }
    }
}

/// Client API Server
pub struct ClientApiServer {
    config: ClientApiConfig,
    state: ClientApiState,
}

impl ClientApiServer {
    /// Create a new server over the given storage backend
    pub fn new(config: ClientApiConfig, storage: Arc<dyn ClientStorage>) -> Self {
        Self {
            config,
            state: ClientApiState::new(storage),
        }
    }

    pub fn config(&self) -> &ClientApiConfig {
        &self.config
    }

    /// Create the Axum router with all client routes
    pub fn create_router(&self) -> Router {
        let api_router = Router::new()
            // Collection endpoints
            .route("/client", get(list_clients).post(create_client))

            // Single-record endpoints
            .route(
                "/client/:client_id",
                get(get_client).put(update_client).delete(delete_client),
            )

            // Health check
            .route("/health", get(health_check))

            // Fallback for unknown routes
            .fallback(not_found)

            // Add shared state
            .with_state(self.state.clone())
            .layer(TraceLayer::new_for_http());

        // Add CORS if enabled
        if self.config.cors_enabled {
            api_router.layer(CorsLayer::permissive())
        } else {
            api_router
        }
    }

    /// Run the server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let app = self.create_router();
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!("👥 Client API server starting");
        info!("📡 Server address: http://{}", addr);
        info!("🔗 API endpoints:");
        info!("   GET    http://{}/client", addr);
        info!("   POST   http://{}/client", addr);
        info!("   GET    http://{}/client/{{clientId}}", addr);
        info!("   PUT    http://{}/client/{{clientId}}", addr);
        info!("   DELETE http://{}/client/{{clientId}}", addr);
        info!("📋 Configuration:");
        info!("   Storage backend: {}", self.state.storage.backend_name());
        info!("   CORS enabled: {}", self.config.cors_enabled);

        // Start the server
        axum::Server::bind(&addr.parse()?)
            .serve(app.into_make_service())
            .await?;

        Ok(())
    }
}

/// Builder pattern for the Client API server
pub struct ClientApiServerBuilder {
    config: ClientApiConfig,
    storage: Option<Arc<dyn ClientStorage>>,
}

impl ClientApiServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientApiConfig::default(),
            storage: None,
        }
    }

    pub fn with_config(mut self, config: ClientApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn with_host(mut self, host: String) -> Self {
        self.config.host = host;
        self
    }

    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn ClientStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the server, falling back to in-memory storage
    pub fn build(self) -> ClientApiServer {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStorage::new()));

        ClientApiServer::new(self.config, storage)
    }
}

impl Default for ClientApiServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
