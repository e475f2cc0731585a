// Storage abstraction for the Client API
// This defines the interface for persisting client records

//! # Storage Abstraction Layer
//!
//! This module lets the HTTP handlers persist clients without knowing which
//! backend is in use. The abstraction separates request handling from storage
//! implementation details.
//!
//! ## Storage Architecture
//!
//! The storage layer follows the **Repository Pattern**:
//! - **ClientStorage trait**: Defines the interface for all storage operations
//! - **InMemoryStorage**: Process-lifetime map, lost on restart
//! - **FileStorage** (`file_storage` module): Whole-file JSON array
//!
//! ## Thread Safety
//!
//! One backend instance is shared by every request task:
//! - Implementations must be `Send + Sync`
//! - Each implementation serializes its own mutations, so two concurrent
//!   creates can never hand out the same ID
//!
//! ## Rust Learning Notes:
//!
//! This file demonstrates:
//! - Async traits with the async-trait crate
//! - `tokio::sync::RwLock` for concurrent access from async tasks
//! - Trait objects (`Arc<dyn ClientStorage>`) and dynamic dispatch
//! - `#[serde(untagged)]` enums for shape-dependent JSON output

use std::collections::BTreeMap;

use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{Client, ClientId};
use crate::Result;

/// How a backend picks the ID for a newly created client
///
/// ## Variants
/// - `NextAfterMax`: one past the highest stored ID (1 for an empty store).
///   IDs stay unique even after the highest record is deleted.
/// - `CountPlusOne`: number of stored records plus one. This reproduces the
///   historical numbering, which can reuse the ID of a live record once an
///   earlier record has been deleted.
///
/// Deserializes from `"next_after_max"` / `"count_plus_one"` so it can be
/// set from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    #[default]
    NextAfterMax,
    CountPlusOne,
}

impl IdStrategy {
    /// Compute the next ID from the IDs currently stored
    ///
    /// ## Errors
    /// - The stored IDs already reach `ClientId::MAX`, so no larger ID exists
    pub fn next_id(self, existing: &[ClientId]) -> Result<ClientId> {
        let base = match self {
            IdStrategy::NextAfterMax => existing.iter().copied().max().unwrap_or(0),
            IdStrategy::CountPlusOne => ClientId::try_from(existing.len()).unwrap_or(ClientId::MAX),
        };
        increment(base)
    }
}

/// `id + 1`, failing once the ID space is exhausted
pub(crate) fn increment(id: ClientId) -> Result<ClientId> {
    id.checked_add(1)
        .ok_or_else(|| anyhow!("client ID space exhausted: no ID after {}", id).into())
}

/// Body of `GET /client`
///
/// The two backends expose their collections in different shapes:
/// the file backend as a JSON array in file order, the in-memory backend as
/// a JSON object keyed by ID. `#[serde(untagged)]` serializes each variant
/// as its inner value without a wrapper.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ClientListing {
    /// Serialized as `[{...}, {...}]`
    Array(Vec<Client>),
    /// Serialized as `{"1": {...}, "2": {...}}`
    ById(BTreeMap<ClientId, Client>),
}

impl ClientListing {
    /// Number of records in the listing
    pub fn len(&self) -> usize {
        match self {
            ClientListing::Array(clients) => clients.len(),
            ClientListing::ById(clients) => clients.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Storage trait for client persistence
///
/// Every backend implements the same five operations, so handlers work
/// against `Arc<dyn ClientStorage>` and the backend is chosen once at startup.
///
/// ## Return Values
/// Lookups return `Result<Option<T>>`:
/// - `Ok(Some(client))`: Found the record
/// - `Ok(None)`: No record with that ID (not an error at this layer)
/// - `Err(error)`: The backend itself failed (unreadable file, etc.)
///
/// ## Rust Learning Notes:
///
/// ### Async Traits
/// The `async-trait` crate rewrites the async methods into methods returning
/// boxed futures, which keeps the trait object-safe.
///
/// ### Trait Bounds
/// `Send + Sync` lets one instance be shared across tokio worker threads.
#[async_trait::async_trait]
pub trait ClientStorage: Send + Sync {
    /// Short name of the backend, used in logs
    fn backend_name(&self) -> &'static str;

    /// Return every stored client
    ///
    /// ## Errors
    /// - The backing medium is unreadable or holds malformed data
    async fn list_clients(&self) -> Result<ClientListing>;

    /// Look up one client by ID
    async fn get_client(&self, id: ClientId) -> Result<Option<Client>>;

    /// Store a new client and return it with its assigned ID
    ///
    /// Any ID already set on `client` is replaced.
    async fn create_client(&self, client: Client) -> Result<Client>;

    /// Merge `patch` into the stored client (see [`Client::merge`])
    ///
    /// Returns the updated record, or `None` if no client has that ID.
    async fn update_client(&self, id: ClientId, patch: Client) -> Result<Option<Client>>;

    /// Remove a client
    ///
    /// Returns `false` if no client has that ID.
    async fn delete_client(&self, id: ClientId) -> Result<bool>;
}

/// In-memory storage
///
/// Holds clients in a `BTreeMap` for the lifetime of the process, which also
/// keeps the `GET /client` object ordered by ID.
///
/// ## Limitations
///
/// - **Not persistent**: Data is lost when the process restarts
/// - **Not distributed**: Cannot share data across multiple processes
///
/// ## Thread Safety
///
/// Uses `tokio::sync::RwLock`:
/// - Multiple readers can list or get concurrently
/// - Creates, updates and deletes take the write guard, so ID assignment
///   and insertion happen atomically
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Key: client ID, Value: client record
    clients: RwLock<BTreeMap<ClientId, Client>>,
    id_strategy: IdStrategy,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }
}

#[async_trait::async_trait]
impl ClientStorage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list_clients(&self) -> Result<ClientListing> {
        let clients = self.clients.read().await;
        Ok(ClientListing::ById(clients.clone()))
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
        let clients = self.clients.read().await;
        Ok(clients.get(&id).cloned())
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        let mut clients = self.clients.write().await;

        let existing: Vec<ClientId> = clients.keys().copied().collect();
        let mut id = self.id_strategy.next_id(&existing)?;
        // A map can't hold two records under one key, so skip forward
        // past any live ID the strategy lands on
        while clients.contains_key(&id) {
            id = increment(id)?;
        }

        let client = client.with_id(id);
        clients.insert(id, client.clone());
        debug!("Stored client {} in memory ({} total)", id, clients.len());

        Ok(client)
    }

    async fn update_client(&self, id: ClientId, patch: Client) -> Result<Option<Client>> {
        let mut clients = self.clients.write().await;

        Ok(clients.get_mut(&id).map(|client| {
            client.merge(&patch);
            client.clone()
        }))
    }

    async fn delete_client(&self, id: ClientId) -> Result<bool> {
        let mut clients = self.clients.write().await;
        Ok(clients.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientApiError;
    use serde_json::json;

    fn client(name: &str, email: &str) -> Client {
        Client {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_next_after_max() {
        assert_eq!(IdStrategy::NextAfterMax.next_id(&[]).unwrap(), 1);
        assert_eq!(IdStrategy::NextAfterMax.next_id(&[1, 2, 3]).unwrap(), 4);
        assert_eq!(IdStrategy::NextAfterMax.next_id(&[1, 3]).unwrap(), 4);
    }

    #[test]
    fn test_count_plus_one() {
        assert_eq!(IdStrategy::CountPlusOne.next_id(&[]).unwrap(), 1);
        // Reproduces the historical collision: record 2 was deleted, 3 is live
        assert_eq!(IdStrategy::CountPlusOne.next_id(&[1, 3]).unwrap(), 3);
    }

    #[test]
    fn test_next_id_at_max_is_storage_error() {
        let err = IdStrategy::NextAfterMax
            .next_id(&[1, ClientId::MAX])
            .unwrap_err();

        assert!(matches!(err, ClientApiError::Storage(_)));
        assert!(err.to_string().contains("exhausted"));
    }

    #[tokio::test]
    async fn test_create_fails_once_ids_are_exhausted() {
        let storage = InMemoryStorage::new();
        storage
            .clients
            .write()
            .await
            .insert(ClientId::MAX, client("A", "").with_id(ClientId::MAX));

        let err = storage.create_client(client("B", "")).await.unwrap_err();

        assert!(matches!(err, ClientApiError::Storage(_)));
        assert_eq!(storage.list_clients().await.unwrap().len(), 1);
    }

    #[test]
    fn test_listing_shapes() {
        let array = ClientListing::Array(vec![client("A", "a@x.com").with_id(1)]);
        assert!(serde_json::to_value(&array).unwrap().is_array());

        let mut map = BTreeMap::new();
        map.insert(1, client("A", "a@x.com").with_id(1));
        let by_id = ClientListing::ById(map);
        let value = serde_json::to_value(&by_id).unwrap();
        assert_eq!(value["1"]["name"], json!("A"));
        assert_eq!(by_id.len(), 1);
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let storage = InMemoryStorage::new();

        let first = storage.create_client(client("A", "a@x.com")).await.unwrap();
        let second = storage.create_client(client("B", "b@x.com")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(storage.get_client(2).await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_create_ignores_supplied_id() {
        let storage = InMemoryStorage::new();

        let created = storage
            .create_client(client("A", "a@x.com").with_id(42))
            .await
            .unwrap();

        assert_eq!(created.id, 1);
        assert!(storage.get_client(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let storage = InMemoryStorage::new();
        let created = storage.create_client(client("A", "a@x.com")).await.unwrap();

        let updated = storage
            .update_client(created.id, client("B", ""))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.name, "B");
        assert_eq!(updated.email, "a@x.com");
        assert_eq!(storage.get_client(created.id).await.unwrap(), Some(updated));
    }

    #[tokio::test]
    async fn test_update_missing_returns_none() {
        let storage = InMemoryStorage::new();
        assert!(storage
            .update_client(5, client("B", ""))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_delete() {
        let storage = InMemoryStorage::new();
        let created = storage.create_client(client("A", "a@x.com")).await.unwrap();

        assert!(storage.delete_client(created.id).await.unwrap());
        assert!(!storage.delete_client(created.id).await.unwrap());
        assert!(storage.get_client(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_plus_one_skips_live_ids() {
        let storage = InMemoryStorage::new().with_id_strategy(IdStrategy::CountPlusOne);
        for name in ["A", "B", "C"] {
            storage.create_client(client(name, "")).await.unwrap();
        }
        storage.delete_client(2).await.unwrap();

        // count + 1 = 3 is still live, so the map moves on to 4
        let created = storage.create_client(client("D", "")).await.unwrap();
        assert_eq!(created.id, 4);
        assert_eq!(storage.list_clients().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_creates_get_unique_ids() {
        let storage = std::sync::Arc::new(InMemoryStorage::new());

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let storage = storage.clone();
                tokio::spawn(async move {
                    storage
                        .create_client(client(&format!("client-{}", i), ""))
                        .await
                        .unwrap()
                        .id
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort_unstable();
        ids.dedup();

        assert_eq!(ids.len(), 20);
    }
}
