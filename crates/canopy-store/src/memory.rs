use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use canopy_crypto::ContentHasher;
use canopy_types::Address;

use crate::block::RawBlock;
use crate::error::StoreResult;
use crate::remote::RemoteProvider;

/// In-memory remote for tests and embedding.
///
/// Objects and pins live behind `RwLock`s. Every `put` is appended to a
/// log and every `get` is counted, so tests can observe remote traffic.
pub struct InMemoryRemote {
    objects: RwLock<HashMap<Address, Vec<u8>>>,
    pins: RwLock<HashSet<Address>>,
    puts: Mutex<Vec<Address>>,
    gets: AtomicUsize,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            pins: RwLock::new(HashSet::new()),
            puts: Mutex::new(Vec::new()),
            gets: AtomicUsize::new(0),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.objects
            .read()
            .expect("lock poisoned")
            .contains_key(address)
    }

    /// Stored bytes, bypassing the request counter.
    pub fn bytes(&self, address: &Address) -> Option<Vec<u8>> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(address)
            .cloned()
    }

    pub fn is_pinned(&self, address: &Address) -> bool {
        self.pins.read().expect("lock poisoned").contains(address)
    }

    pub fn pinned_count(&self) -> usize {
        self.pins.read().expect("lock poisoned").len()
    }

    /// Every address accepted by `put`, in call order, duplicates included.
    pub fn put_log(&self) -> Vec<Address> {
        self.puts.lock().expect("lock poisoned").clone()
    }

    /// Number of `get` calls served so far.
    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteProvider for InMemoryRemote {
    async fn get(&self, address: &Address) -> StoreResult<Option<Vec<u8>>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        Ok(self.bytes(address))
    }

    async fn put(&self, block: &RawBlock) -> StoreResult<Address> {
        let address =
            ContentHasher::new(block.codec(), block.address().hash_alg()).hash(block.bytes());
        self.objects
            .write()
            .expect("lock poisoned")
            .entry(address)
            .or_insert_with(|| block.bytes().to_vec());
        self.puts.lock().expect("lock poisoned").push(address);
        Ok(address)
    }

    async fn pin(&self, address: &Address) -> StoreResult<()> {
        self.pins.write().expect("lock poisoned").insert(*address);
        Ok(())
    }

    async fn unpin(&self, address: &Address) -> StoreResult<()> {
        self.pins.write().expect("lock poisoned").remove(address);
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRemote")
            .field("object_count", &self.len())
            .field("pinned", &self.pinned_count())
            .finish()
    }
}
