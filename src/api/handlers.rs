// Client API REST handlers
// One handler per route, translating HTTP into storage calls

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, error, info};

use crate::engine::{ClientListing, ClientStorage};
use crate::models::{Client, ClientId};
use crate::{ClientApiError, Result};

/// Shared application state for the Client API
///
/// Handlers receive the storage backend through axum's `State` extractor
/// instead of reaching for a global.
#[derive(Clone)]
pub struct ClientApiState {
    pub storage: Arc<dyn ClientStorage>,
}

impl ClientApiState {
    pub fn new(storage: Arc<dyn ClientStorage>) -> Self {
        Self { storage }
    }
}

/// Map crate errors onto HTTP responses
///
/// Error bodies are plain text holding exactly the error message:
/// - 400 for a bad `{clientId}` or a body that isn't valid client JSON
/// - 404 for an unknown ID
/// - 500 for anything the storage backend reports
impl IntoResponse for ClientApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ClientApiError::InvalidClientId(_) | ClientApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ClientApiError::ClientNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            debug!("Rejected request ({}): {:?}", status, self);
        }

        (status, self.to_string()).into_response()
    }
}

/// The `{clientId}` segment as axum extracts it
///
/// Taking the extraction result instead of `Path<String>` keeps axum's own
/// rejection (e.g. a segment that percent-decodes to invalid UTF-8) from
/// becoming the response; it turns into the usual 400 instead.
type ClientIdPath = std::result::Result<Path<String>, PathRejection>;

fn parse_client_id(raw: &str) -> Result<ClientId> {
    raw.parse()
        .map_err(|_| ClientApiError::InvalidClientId(raw.to_string()))
}

fn client_id_from_path(path: ClientIdPath) -> Result<ClientId> {
    match path {
        Ok(Path(raw)) => parse_client_id(&raw),
        Err(rejection) => Err(ClientApiError::InvalidClientId(rejection.to_string())),
    }
}

fn decode_client(body: &[u8]) -> Result<Client> {
    serde_json::from_slice(body).map_err(|e| ClientApiError::InvalidBody(e.to_string()))
}

/// List every client
/// GET /client
pub async fn list_clients(State(state): State<ClientApiState>) -> Result<Json<ClientListing>> {
    info!("📋 GET /client called");

    let listing = state.storage.list_clients().await?;
    debug!("Returning {} clients", listing.len());

    Ok(Json(listing))
}

/// Fetch one client
/// GET /client/{clientId}
pub async fn get_client(
    State(state): State<ClientApiState>,
    path: ClientIdPath,
) -> Result<Json<Client>> {
    let id = client_id_from_path(path)?;
    info!("🔍 GET /client/{} called", id);

    let client = state
        .storage
        .get_client(id)
        .await?
        .ok_or(ClientApiError::ClientNotFound(id))?;

    Ok(Json(client))
}

/// Create a client; the ID is assigned by storage
/// POST /client
///
/// The body is taken as raw bytes so the JSON parser's own message can be
/// returned on a 400, instead of axum's generic rejection text.
pub async fn create_client(
    State(state): State<ClientApiState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Client>)> {
    info!("➕ POST /client called");

    let client = decode_client(&body)?;
    let created = state.storage.create_client(client).await?;
    info!("Created client {}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

/// Partially update a client
/// PUT /client/{clientId}
///
/// Non-empty fields in the body overwrite the stored ones; everything else
/// is left as it was. The record must exist before the body is decoded, so
/// an unknown ID answers 404 even when the body is malformed.
pub async fn update_client(
    State(state): State<ClientApiState>,
    path: ClientIdPath,
    body: Bytes,
) -> Result<Json<Client>> {
    let id = client_id_from_path(path)?;
    info!("✏️ PUT /client/{} called", id);

    if state.storage.get_client(id).await?.is_none() {
        return Err(ClientApiError::ClientNotFound(id));
    }

    let patch = decode_client(&body)?;
    // The record can still vanish between the lookup and the merge
    let updated = state
        .storage
        .update_client(id, patch)
        .await?
        .ok_or(ClientApiError::ClientNotFound(id))?;
    info!("Updated client {}", id);

    Ok(Json(updated))
}

/// Delete a client
/// DELETE /client/{clientId}
pub async fn delete_client(
    State(state): State<ClientApiState>,
    path: ClientIdPath,
) -> Result<StatusCode> {
    let id = client_id_from_path(path)?;
    info!("🗑️ DELETE /client/{} called", id);

    if !state.storage.delete_client(id).await? {
        return Err(ClientApiError::ClientNotFound(id));
    }
    info!("Deleted client {}", id);

    Ok(StatusCode::NO_CONTENT)
}

// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Client API is running!")
}

// Fallback for unknown routes
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not found")
}
