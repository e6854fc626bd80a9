use std::sync::Arc;

use anyhow::Context;
use evc_engine::{Catalog, Engine};
use evc_storage::Storage;

use crate::config::AppConfig;

/// Everything the client shares between requests.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Opens storage, loads the catalog and builds the engine.
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let storage = Storage::open(&config.storage)
            .await
            .context("Failed to open storage")?;

        let catalog = match &config.catalog {
            Some(path) => {
                let content = tokio::fs::read_to_string(path).await.with_context(|| {
                    format!("Failed to read catalog file '{}'", path.display())
                })?;
                Catalog::from_json(&content).with_context(|| {
                    format!("Failed to parse catalog file '{}'", path.display())
                })?
            }
            None => Catalog::builtin().context("Built-in catalog is malformed")?,
        };
        tracing::info!(
            "Catalog has {} stations, {} past sessions, {} notifications",
            catalog.stations.len(),
            catalog.history.len(),
            catalog.notifications.len()
        );

        let engine = Engine::new(config.engine.clone(), storage, catalog);
        Ok(Self {
            engine: Arc::new(engine),
        })
    }

    /// Restores a saved login and fetches the initial data.
    pub async fn preload(&self) -> anyhow::Result<()> {
        match self.engine.restore_session().await {
            Some(user) => tracing::info!("Logged in as {}", user.phone_number),
            None => tracing::info!("No saved session"),
        }

        let (stations, history, notifications) = tokio::try_join!(
            self.engine.load_stations(),
            self.engine.load_history(),
            self.engine.load_notifications(),
        )?;
        tracing::info!(
            "Preloaded {} stations, {} sessions, {} notifications",
            stations,
            history,
            notifications
        );
        Ok(())
    }
}
