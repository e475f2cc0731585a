// Client API storage engine
// This contains the storage abstraction and its backends

//! # Storage Engine Module
//!
//! The engine is the layer between the HTTP handlers and the bytes on disk
//! (or in memory).
//!
//! ## Engine Components
//!
//! ### Storage Abstraction (`storage` module)
//! - `ClientStorage` trait shared by every backend
//! - `InMemoryStorage`, the process-lifetime map backend
//! - `IdStrategy` and `ClientListing` helpers
//!
//! ### File Backend (`file_storage` module)
//! - `FileStorage`, a whole-file JSON array rewritten on every mutation

pub mod file_storage;
pub mod storage;

// Re-export commonly used types
pub use file_storage::FileStorage;
pub use storage::{ClientListing, ClientStorage, IdStrategy, InMemoryStorage};
