// Core domain models for the Client API
// These are the plain data structures shared by storage and HTTP layers

//! # Domain Models Module
//!
//! The service manages exactly one record type, [`Client`]. Keeping it in its
//! own module separates the schema (and its merge rule) from storage and HTTP
//! concerns.
//!
//! ## Rust Learning Notes:
//!
//! ### Module Declarations
//! `pub mod client;` tells Rust to include `client.rs` as a public submodule.
//!
//! ### Re-exports for Clean APIs
//! The `pub use` below lets callers write `use client_api::models::Client`
//! instead of `use client_api::models::client::Client`.

// Declares the `client` submodule from `client.rs`
// Contains Client and ClientId - the record schema and its identifier
pub mod client;

/// Re-export the record type and its identifier
pub use client::{Client, ClientId};
