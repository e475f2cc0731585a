// File-backed storage for the Client API
// Persists the whole collection as a pretty-printed JSON array

use std::path::{Path, PathBuf};

use tokio::{fs, sync::Mutex};
use tracing::{debug, info};

use crate::engine::storage::{ClientListing, ClientStorage, IdStrategy};
use crate::models::{Client, ClientId};
use crate::Result;

/// Default name of the backing file, relative to the working directory
pub const DEFAULT_CLIENTS_FILE: &str = "clients.json";

/// Client storage backed by a single JSON file
///
/// Every operation reads the whole file; every mutation rewrites it. The file
/// holds a JSON array with 2-space indentation, in insertion order.
///
/// All reads and read-modify-write cycles run under one async mutex, so
/// requests inside this process never interleave their writes. Separate
/// processes pointed at the same file are not coordinated.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    id_strategy: IdStrategy,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            id_strategy: IdStrategy::default(),
            lock: Mutex::new(()),
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the backing file holding `[]` (mode 0644 on unix) if it
    /// doesn't exist yet
    ///
    /// An existing file is left untouched, even if malformed; that surfaces
    /// later as a storage error on the first request.
    pub async fn init(&self) -> Result<()> {
        let _guard = self.lock.lock().await;

        match fs::metadata(&self.path).await {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if let Some(parent) = self.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        fs::create_dir_all(parent).await?;
                    }
                }
                self.write_all(&[]).await?;

                // Only a freshly created file gets 0644; rewrites keep
                // whatever mode an operator has set since
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o644))
                        .await?;
                }

                info!("Created empty client file at {}", self.path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read every stored client, in file order
    pub async fn load(&self) -> Result<Vec<Client>> {
        let _guard = self.lock.lock().await;
        self.read_all().await
    }

    async fn read_all(&self) -> Result<Vec<Client>> {
        let contents = fs::read_to_string(&self.path).await?;
        let clients: Vec<Client> = serde_json::from_str(&contents)?;
        Ok(clients)
    }

    async fn write_all(&self, clients: &[Client]) -> Result<()> {
        let json = serde_json::to_string_pretty(clients)?;
        fs::write(&self.path, json).await?;
        debug!("Wrote {} clients to {}", clients.len(), self.path.display());
        Ok(())
    }
}

#[async_trait::async_trait]
impl ClientStorage for FileStorage {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn list_clients(&self) -> Result<ClientListing> {
        Ok(ClientListing::Array(self.load().await?))
    }

    async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
        let clients = self.load().await?;
        Ok(clients.into_iter().find(|client| client.id == id))
    }

    async fn create_client(&self, client: Client) -> Result<Client> {
        let _guard = self.lock.lock().await;
        let mut clients = self.read_all().await?;

        let existing: Vec<ClientId> = clients.iter().map(|c| c.id).collect();
        let client = client.with_id(self.id_strategy.next_id(&existing)?);

        clients.push(client.clone());
        self.write_all(&clients).await?;

        Ok(client)
    }

    async fn update_client(&self, id: ClientId, patch: Client) -> Result<Option<Client>> {
        let _guard = self.lock.lock().await;
        let mut clients = self.read_all().await?;

        let Some(client) = clients.iter_mut().find(|client| client.id == id) else {
            return Ok(None);
        };
        client.merge(&patch);
        let updated = client.clone();

        self.write_all(&clients).await?;
        Ok(Some(updated))
    }

    async fn delete_client(&self, id: ClientId) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut clients = self.read_all().await?;

        let Some(index) = clients.iter().position(|client| client.id == id) else {
            return Ok(false);
        };
        clients.remove(index);

        self.write_all(&clients).await?;
        Ok(true)
    }
}
