//! In-memory root registry for testing and ephemeral use.
//!
//! [`InMemoryRootRegistry`] keeps every account's roots in a `HashMap`
//! protected by a `RwLock`. Data is lost when the registry is dropped.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use canopy_types::Address;
use tracing::debug;

use crate::error::{RegistryError, Result};
use crate::names::{validate_account, validate_label};
use crate::traits::RootRegistry;
use crate::types::PublishedRoot;

type Roots = HashMap<String, BTreeMap<String, PublishedRoot>>;

/// An in-memory implementation of [`RootRegistry`].
#[derive(Debug, Default)]
pub struct InMemoryRootRegistry {
    roots: RwLock<Roots>,
}

impl InMemoryRootRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RegistryError {
    RegistryError::Serialization(format!("lock poisoned: {e}"))
}

#[async_trait]
impl RootRegistry for InMemoryRootRegistry {
    async fn resolve(&self, account: &str, label: &str) -> Result<Option<Address>> {
        let roots = self.roots.read().map_err(poisoned)?;
        Ok(roots
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

        let mut roots = self.roots.write().map_err(poisoned)?;
        let previous = roots
            .entry(account.to_string())
            .or_default()
            .insert(label.to_string(), PublishedRoot::new(label, address))
            .map(|old| old.address);
        debug!(account, label, address = %address, "published root");
        Ok(previous)
    }

    async fn retract(&self, account: &str, label: &str) -> Result<bool> {
        let mut roots = self.roots.write().map_err(poisoned)?;
        Ok(roots
            .get_mut(account)
            .map(|labels| labels.remove(label).is_some())
            .unwrap_or(false))
    }

    async fn list(&self, account: &str) -> Result<Vec<PublishedRoot>> {
        let roots = self.roots.read().map_err(poisoned)?;
        Ok(roots
            .get(account)
            .map(|labels| labels.values().cloned().collect())
            .unwrap_or_default())
    }
}
