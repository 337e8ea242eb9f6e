use std::path::{Path, PathBuf};

use anyhow::Context;
use canopy_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Settings read from the `--config` TOML file.
///
/// ```toml
/// objects = "/var/lib/canopy"
/// registry = "/var/lib/canopy/roots.json"
///
/// [store]
/// cache_capacity = 500
/// codec = "dag-json"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub store: StoreConfig,
    /// Directory of the filesystem remote.
    pub objects: PathBuf,
    /// JSON file of published roots.
    pub registry: PathBuf,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            objects: PathBuf::from(".canopy"),
            registry: PathBuf::from(".canopy/roots.json"),
        }
    }
}

impl CliConfig {
    pub async fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
