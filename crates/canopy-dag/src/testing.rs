//! Shared fixtures for graph tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use canopy_store::{
    decode_value, InMemoryRemote, ObjectStore, RawBlock, RemoteProvider, StoreError, StoreResult,
};
use canopy_types::{Address, Codec, FieldValue, Fields};

use crate::graph::DocumentGraph;

pub(crate) fn graph() -> (Arc<InMemoryRemote>, DocumentGraph) {
    let remote = Arc::new(InMemoryRemote::new());
    let store = Arc::new(ObjectStore::new(remote.clone()));
    (remote, DocumentGraph::new(store))
}

pub(crate) fn fields(pairs: &[(&str, FieldValue)]) -> Fields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Names of the plaintext blocks put since the `mark`-th put.
pub(crate) fn names_persisted_since(remote: &InMemoryRemote, mark: usize, codec: Codec) -> Vec<String> {
    remote.put_log()[mark..]
        .iter()
        .map(|address| {
            let bytes = remote.bytes(address).unwrap();
            decode_value(&bytes, codec).unwrap().name
        })
        .collect()
}

/// Remote whose puts can be switched to fail.
#[derive(Default)]
pub(crate) struct FlakyRemote {
    pub inner: InMemoryRemote,
    pub fail_puts: AtomicBool,
}

#[async_trait]
impl RemoteProvider for FlakyRemote {
    async fn get(&self, address: &Address) -> StoreResult<Option<Vec<u8>>> {
        self.inner.get(address).await
    }

    async fn put(&self, block: &RawBlock) -> StoreResult<Address> {
        if self.fail_puts.load(Ordering::SeqCst) {
            return Err(StoreError::Remote("remote unavailable".into()));
        }
        self.inner.put(block).await
    }

    async fn pin(&self, address: &Address) -> StoreResult<()> {
        self.inner.pin(address).await
    }

    async fn unpin(&self, address: &Address) -> StoreResult<()> {
        self.inner.unpin(address).await
    }
}

pub(crate) fn flaky_graph() -> (Arc<FlakyRemote>, DocumentGraph) {
    let remote = Arc::new(FlakyRemote::default());
    let store = Arc::new(ObjectStore::new(remote.clone()));
    (remote, DocumentGraph::new(store))
}
