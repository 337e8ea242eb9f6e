//! JSON-file root registry.
//!
//! The whole registry is one JSON document, rewritten atomically (write to a
//! sibling temp file, then rename) on every change. A missing file reads as
//! an empty registry.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use canopy_types::Address;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::names::{validate_account, validate_label};
use crate::traits::RootRegistry;
use crate::types::PublishedRoot;

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    accounts: HashMap<String, BTreeMap<String, PublishedRoot>>,
}

/// A [`RootRegistry`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileRootRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileRootRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<RegistryFile> {
        match fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| RegistryError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(RegistryFile::default()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, file: &RegistryFile) -> Result<()> {
        let json = serde_json::to_vec_pretty(file)
            .map_err(|e| RegistryError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RootRegistry for FileRootRegistry {
    async fn resolve(&self, account: &str, label: &str) -> Result<Option<Address>> {
        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        Ok(file
            .accounts
            .get(account)
            .and_then(|labels| labels.get(label))
            .map(|root| root.address))
    }

    async fn publish(
        &self,
        account: &str,
        label: &str,
        address: Address,
    ) -> Result<Option<Address>> {
        validate_account(account)?;
        validate_label(label)?;

        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let previous = file
            .accounts
            .entry(account.to_string())
            .or_default()
            .insert(label.to_string(), PublishedRoot::new(label, address))
            .map(|old| old.address);
        self.save(&file).await?;
        debug!(account, label, address = %address, path = %self.path.display(), "published root");
        Ok(previous)
    }

    async fn retract(&self, account: &str, label: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut file = self.load().await?;
        let removed = file
            .accounts
            .get_mut(account)
            .map(|labels| labels.remove(label).is_some())
            .unwrap_or(false);
        if removed {
            self.save(&file).await?;
        }
        Ok(removed)
    }

    async fn list(&self, account: &str) -> Result<Vec<PublishedRoot>> {
        let _guard = self.lock.lock().await;
        let file = self.load().await?;
        Ok(file
            .accounts
            .get(account)
            .map(|labels| labels.values().cloned().collect())
            .unwrap_or_default())
    }
}
