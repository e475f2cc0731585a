// Client API - Rust Edition
// A small HTTP CRUD service for client records with pluggable storage

//! # Client API Library
//!
//! This is the main library crate for the Client API service. This file serves
//! as the **library root** and defines the public API used by the `server` and
//! `admin` binaries (and by the tests).
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Client`]: The single record type, a person with identifying and contact fields
//! - [`ClientId`]: Integer identifier assigned by the server
//!
//! ### Storage Layer
//! Abstracts persistence behind the [`ClientStorage`] trait:
//! - [`FileStorage`]: Whole-file JSON array, rewritten on every mutation
//! - [`InMemoryStorage`]: Process-lifetime map from ID to client
//!
//! ### HTTP API
//! - [`ClientApiServer`]: Axum router with the five `/client` routes
//! - [`Settings`]: Layered configuration (defaults, optional file, environment)
//!
//! ## Rust Learning Notes:
//!
//! ### Module System
//! Each `mod` declaration tells Rust to include code from either a `.rs` file
//! or a directory with a `mod.rs` file.
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the internal
//! module structure. Instead of `use client_api::models::client::Client`,
//! users can write `use client_api::Client`.

// Core domain models
pub mod models;

// Storage backends and the trait that abstracts them
pub mod engine;

// HTTP handlers and server bootstrap
pub mod api;

// Layered runtime configuration
pub mod settings;

// Re-export core domain types for easy access
pub use models::{Client, ClientId};

// Re-export storage types for convenience
pub use engine::{
    file_storage::FileStorage,
    storage::{ClientListing, ClientStorage, IdStrategy, InMemoryStorage},
};

// Re-export server and configuration types
pub use api::{ClientApiConfig, ClientApiServer, ClientApiServerBuilder};
pub use settings::{Settings, StorageBackend};

// Core error types
// Using the `thiserror` crate to make error handling easier
use thiserror::Error;

/// Error type for every Client API operation
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides human-readable error messages
/// - `#[from]` enables automatic conversion from other error types, so the
///   `?` operator can be used on `std::io::Result` and `serde_json::Result`
///
/// ### Mapping to HTTP
/// The `api` module implements `IntoResponse` for this enum, so handlers can
/// return `Result<_, ClientApiError>` directly.
#[derive(Error, Debug)]
pub enum ClientApiError {
    /// The `{clientId}` path segment is not an integer
    #[error("Invalid client ID")]
    InvalidClientId(String),

    /// The request body is not valid JSON for a client
    /// The message is the underlying parser error, surfaced verbatim
    #[error("{0}")]
    InvalidBody(String),

    /// No client is stored under the requested ID
    #[error("Client not found")]
    ClientNotFound(ClientId),

    /// Backend failures that don't fit the variants below
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// Backing file could not be read or written
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Backing file holds malformed JSON
    #[error("{0}")]
    Serialization(#[from] serde_json::Error),

    /// Startup configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, ClientApiError>;
