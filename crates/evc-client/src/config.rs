use std::path::{Path, PathBuf};

use anyhow::Context;
use evc_engine::EngineConfig;
use evc_storage::StorageConfig;
use serde::{Deserialize, Serialize};

/// Client configuration, read from a JSON file at startup.
///
/// Every field is optional; the engine settings sit at the top level.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    #[serde(flatten)]
    pub engine: EngineConfig,
    /// Catalog fixture replacing the built-in one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    pub storage: StorageConfig,
}

impl AppConfig {
    pub async fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }
}
