//! The [`RootRegistry`] trait defining the pointer-exchange interface.
//!
//! The document graph keeps no index of its own; the registry is the only
//! way to find a document's current root. Any backend (in-memory, file,
//! ledger) implements this trait.

use async_trait::async_trait;
use canopy_types::Address;

use crate::error::{RegistryError, Result};
use crate::types::PublishedRoot;

/// Named root pointers, namespaced per account.
///
/// Implementations must validate labels and accounts on write and make each
/// operation atomic with respect to the others.
#[async_trait]
pub trait RootRegistry: Send + Sync {
    /// The root currently published under `account`/`label`.
    ///
    /// Returns `Ok(None)` if nothing is published.
    async fn resolve(&self, account: &str, label: &str) -> Result<Option<Address>>;

    /// Point `account`/`label` at `address`, returning the previous root.
    async fn publish(&self, account: &str, label: &str, address: Address)
        -> Result<Option<Address>>;

    /// Remove a published root. Returns `Ok(true)` if it existed.
    async fn retract(&self, account: &str, label: &str) -> Result<bool>;

    /// Every root published by `account`, sorted by label.
    async fn list(&self, account: &str) -> Result<Vec<PublishedRoot>>;

    /// Like [`resolve`](Self::resolve), but a missing root is an error.
    async fn require(&self, account: &str, label: &str) -> Result<Address> {
        self.resolve(account, label)
            .await?
            .ok_or_else(|| RegistryError::NotFound {
                account: account.to_string(),
                label: label.to_string(),
            })
    }
}
