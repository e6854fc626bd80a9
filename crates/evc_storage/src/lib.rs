//! Key/value persistence used by the client.
//!
//! Two stores are opened side by side: a plain one for the user profile and
//! a secure one reserved for secrets such as the auth token.

mod file;
mod memory;
mod secure;

pub use crate::file::FileStore;
pub use crate::memory::MemoryStore;
pub use crate::secure::KeyringStore;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Invalid storage key {0:?}")]
    InvalidKey(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Keyring error: {0}")]
    Keyring(#[from] keyring::Error),
    #[error("Storage task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Asynchronous string key/value store.
///
/// Reading a missing key yields `None`; removing a missing key succeeds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    async fn remove(&self, key: &str) -> StorageResult<()>;
}

/// Reads a JSON encoded value stored under `key`.
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw).await
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlainBackend {
    #[default]
    Memory,
    File { dir: PathBuf },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SecureBackend {
    #[default]
    Memory,
    Keyring { service: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default)]
    pub plain: PlainBackend,
    #[serde(default)]
    pub secure: SecureBackend,
}

/// The plain and secure stores selected by configuration.
#[derive(Clone)]
pub struct Storage {
    pub plain: Arc<dyn KeyValueStore>,
    pub secure: Arc<dyn KeyValueStore>,
}

impl Storage {
    pub async fn open(config: &StorageConfig) -> StorageResult<Self> {
        let plain: Arc<dyn KeyValueStore> = match &config.plain {
            PlainBackend::Memory => Arc::new(MemoryStore::new()),
            PlainBackend::File { dir } => Arc::new(FileStore::open(dir).await?),
        };
        let secure: Arc<dyn KeyValueStore> = match &config.secure {
            SecureBackend::Memory => Arc::new(MemoryStore::new()),
            SecureBackend::Keyring { service } => Arc::new(KeyringStore::new(service.clone())),
        };
        tracing::info!(
            "Opened storage (plain: {:?}, secure: {:?})",
            config.plain,
            config.secure
        );
        Ok(Storage { plain, secure })
    }

    /// Both stores in memory.
    pub fn in_memory() -> Self {
        Storage {
            plain: Arc::new(MemoryStore::new()),
            secure: Arc::new(MemoryStore::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Profile {
        id: String,
        name: Option<String>,
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let store = MemoryStore::new();
        let profile = Profile {
            id: "1".into(),
            name: Some("Aibek".into()),
        };

        set_json(&store, "user", &profile).await.unwrap();
        let loaded: Option<Profile> = get_json(&store, "user").await.unwrap();
        assert_eq!(loaded, Some(profile));

        let missing: Option<Profile> = get_json(&store, "nobody").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_json_reports_corrupt_value() {
        let store = MemoryStore::new();
        store.set("user", "not json").await.unwrap();

        let result: StorageResult<Option<Profile>> = get_json(&store, "user").await;
        assert!(matches!(result, Err(StorageError::Serialization(_))));
    }

    #[test]
    fn test_config_deserialization() {
        let json = r#"
        {
          "plain": { "kind": "file", "dir": "/tmp/evc" },
          "secure": { "kind": "keyring", "service": "evc-client" }
        }
        "#;

        let config: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.plain,
            PlainBackend::File {
                dir: PathBuf::from("/tmp/evc")
            }
        );
        assert_eq!(
            config.secure,
            SecureBackend::Keyring {
                service: "evc-client".into()
            }
        );

        let defaults: StorageConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(defaults, StorageConfig::default());
    }

    #[tokio::test]
    async fn test_open_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            plain: PlainBackend::File {
                dir: dir.path().join("store"),
            },
            secure: SecureBackend::Memory,
        };

        let storage = Storage::open(&config).await.unwrap();
        storage.plain.set("user", "{}").await.unwrap();
        assert!(dir.path().join("store").join("user.json").exists());
        assert!(storage.secure.get("user").await.unwrap().is_none());
    }
}
