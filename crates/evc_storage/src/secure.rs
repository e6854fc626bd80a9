//! Secrets kept in the OS credential store (Keychain, Secret Service,
//! Windows Credential Manager).

use async_trait::async_trait;

use crate::{KeyValueStore, StorageResult};

/// One keyring entry per key, all under the same service name.
#[derive(Debug, Clone)]
pub struct KeyringStore {
    service: String,
}

impl KeyringStore {
    pub fn new(service: impl Into<String>) -> Self {
        KeyringStore {
            service: service.into(),
        }
    }

    fn entry(&self, key: &str) -> keyring::Result<keyring::Entry> {
        keyring::Entry::new(&self.service, key)
    }
}

#[async_trait]
impl KeyValueStore for KeyringStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let entry = self.entry(key)?;
        let result = tokio::task::spawn_blocking(move || entry.get_password()).await?;
        match result {
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let entry = self.entry(key)?;
        let value = value.to_string();
        tokio::task::spawn_blocking(move || entry.set_password(&value)).await??;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StorageResult<()> {
        let entry = self.entry(key)?;
        match tokio::task::spawn_blocking(move || entry.delete_password()).await? {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                tracing::warn!("Failed to remove {} from keyring {}: {}", key, self.service, e);
                Err(e.into())
            }
        }
    }
}
