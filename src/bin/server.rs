// Client API - Main HTTP Server
// Serves the /client CRUD routes over the configured storage backend
// Run with: cargo run --bin server

//! # Client API Server Binary
//!
//! Starts the HTTP server. With no configuration at all it listens on
//! `0.0.0.0:5000` and keeps clients in `clients.json` in the working directory.
//!
//! ## Configuration
//!
//! Settings are layered (later wins):
//! 1. Built-in defaults
//! 2. `client_api.toml` (or the file named by `CLIENT_API_CONFIG`), if present
//! 3. Environment variables such as `CLIENT_API__SERVER__PORT=8080` or
//!    `CLIENT_API__STORAGE__BACKEND=memory`, optionally from a `.env` file
//!
//! ## Rust Learning Notes:
//!
//! ### Async Main Function
//! `#[tokio::main]` wraps the async main in a synchronous one that builds
//! the tokio runtime first, so `.await` works at the top level.
//!
//! ### Error Handling with Box<dyn Error>
//! `Box<dyn std::error::Error + Send + Sync>` can hold any error type, which
//! suits a `main` that mixes configuration, I/O and server errors.

use client_api::{ClientApiServerBuilder, Settings};
use dotenv::dotenv;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Load environment variables from .env file (optional)
    let dotenv_result = dotenv();

    // Initialize structured logging, honouring RUST_LOG when set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = dotenv_result {
        warn!("Could not load .env file: {}", e);
    }

    info!("🚀 Starting Client API Server...");

    let settings = Settings::load()?;
    info!("Server: {}:{}", settings.server.host, settings.server.port);
    info!("Storage backend: {:?}", settings.storage.backend);
    info!("ID strategy: {:?}", settings.storage.id_strategy);

    let storage = settings.build_storage().await?;

    ClientApiServerBuilder::new()
        .with_config(settings.api_config())
        .with_storage(storage)
        .build()
        .run()
        .await?;

    Ok(())
}
