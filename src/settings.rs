// Runtime configuration for the Client API
// Layers built-in defaults, an optional TOML file and environment variables

use std::sync::Arc;

use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::api::ClientApiConfig;
use crate::engine::{
    file_storage::DEFAULT_CLIENTS_FILE, ClientStorage, FileStorage, IdStrategy, InMemoryStorage,
};
use crate::Result;

/// Default settings file, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "client_api.toml";

/// Environment variable that overrides the settings file location
pub const CONFIG_PATH_ENV: &str = "CLIENT_API_CONFIG";

/// Prefix for environment overrides, e.g. `CLIENT_API__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "CLIENT_API";

/// Which storage backend the server runs with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Whole-file JSON array at `storage.path`
    File,
    /// Process-lifetime map, nothing persisted
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub path: String,
    pub id_strategy: IdStrategy,
}

/// Complete service settings
///
/// With no settings file and no environment overrides this resolves to the
/// historical fixed setup: port 5000 on all interfaces, file backend at
/// `clients.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Load settings from the default locations
    ///
    /// The settings file is `$CLIENT_API_CONFIG` if set, else
    /// `client_api.toml`; either way it is optional.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());
        Self::load_from(&path)
    }

    /// Load settings using `path` as the optional settings file
    pub fn load_from(path: &str) -> Result<Self> {
        let settings = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.cors_enabled", false)?
            .set_default("storage.backend", "file")?
            .set_default("storage.path", DEFAULT_CLIENTS_FILE)?
            .set_default("storage.id_strategy", "next_after_max")?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;

        Ok(settings)
    }

    /// HTTP listener settings in the shape the server expects
    pub fn api_config(&self) -> ClientApiConfig {
        ClientApiConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            cors_enabled: self.server.cors_enabled,
        }
    }

    /// Construct the configured storage backend
    ///
    /// The file backend is initialised here, so a missing data file is
    /// created before the first request arrives.
    pub async fn build_storage(&self) -> Result<Arc<dyn ClientStorage>> {
        let id_strategy = self.storage.id_strategy;

        let storage: Arc<dyn ClientStorage> = match self.storage.backend {
            StorageBackend::File => {
                let storage = FileStorage::new(&self.storage.path).with_id_strategy(id_strategy);
                storage.init().await?;
                info!("📁 Using file storage at {}", storage.path().display());
                Arc::new(storage)
            }
            StorageBackend::Memory => {
                info!("🧠 Using in-memory storage");
                Arc::new(InMemoryStorage::new().with_id_strategy(id_strategy))
            }
        };

        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Mutex, MutexGuard};
    use tempfile::tempdir;

    // Process environment is shared by every test thread; anything that
    // reads it (load_from) or writes it holds this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(path: &str) -> Settings {
        let _env = env_lock();
        Settings::load_from(path).unwrap()
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nothing_here.toml");

        let settings = load(missing.to_str().unwrap());

        assert_eq!(settings.server.port, 5000);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert!(!settings.server.cors_enabled);
        assert_eq!(settings.storage.backend, StorageBackend::File);
        assert_eq!(settings.storage.path, "clients.json");
        assert_eq!(settings.storage.id_strategy, IdStrategy::NextAfterMax);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client_api.toml");
        std::fs::write(
            &path,
            r#"
[server]
port = 8081

[storage]
backend = "memory"
id_strategy = "count_plus_one"
"#,
        )
        .unwrap();

        let settings = load(path.to_str().unwrap());

        assert_eq!(settings.server.port, 8081);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.id_strategy, IdStrategy::CountPlusOne);

        let api = settings.api_config();
        assert_eq!(api.port, 8081);
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client_api.toml");
        std::fs::write(&path, "[server]\nport = 8081\n").unwrap();

        let loaded = {
            let _env = env_lock();
            std::env::set_var("CLIENT_API__SERVER__PORT", "8089");
            std::env::set_var("CLIENT_API__STORAGE__BACKEND", "memory");
            let loaded = Settings::load_from(path.to_str().unwrap());
            std::env::remove_var("CLIENT_API__SERVER__PORT");
            std::env::remove_var("CLIENT_API__STORAGE__BACKEND");
            loaded
        };

        let settings = loaded.unwrap();
        assert_eq!(settings.server.port, 8089);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.storage.path, "clients.json");
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("client_api.toml");
        std::fs::write(&path, "[storage]\nbackend = \"postgres\"\n").unwrap();

        let _env = env_lock();
        assert!(Settings::load_from(path.to_str().unwrap()).is_err());
    }

    #[tokio::test]
    async fn test_build_file_storage_creates_file() {
        let dir = tempdir().unwrap();
        let data = dir.path().join("data").join("clients.json");
        let mut settings = load("does-not-exist.toml");
        settings.storage.path = data.to_string_lossy().into_owned();

        let storage = settings.build_storage().await.unwrap();

        assert_eq!(storage.backend_name(), "file");
        assert!(data.exists());
    }

    #[tokio::test]
    async fn test_build_memory_storage() {
        let mut settings = load("does-not-exist.toml");
        settings.storage.backend = StorageBackend::Memory;

        let storage = settings.build_storage().await.unwrap();
        assert_eq!(storage.backend_name(), "memory");
    }
}
