use std::sync::{Arc, Mutex};

use canopy_crypto::{lock, open, CryptoError, Keys};
use canopy_types::{Address, Codec, NodeValue};
use tracing::{debug, info, warn};

use crate::block::{decode_value, Block, RawBlock};
use crate::cache::BoundedCache;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::remote::RemoteProvider;

/// Remote-backed block store with a bounded read cache.
///
/// Composes the block codec, the crypto gate and a [`RemoteProvider`].
/// Cached blocks are keyed by the address they were read from or persisted
/// at; for locked blocks that is the ciphertext address, not the structural
/// one.
pub struct ObjectStore {
    remote: Arc<dyn RemoteProvider>,
    cache: Mutex<BoundedCache<Address, Block>>,
    config: StoreConfig,
}

impl ObjectStore {
    /// Store with the default configuration.
    pub fn new(remote: Arc<dyn RemoteProvider>) -> Self {
        Self::with_config(remote, StoreConfig::default())
    }

    pub fn with_config(remote: Arc<dyn RemoteProvider>, config: StoreConfig) -> Self {
        let mut cache = BoundedCache::new(config.cache_capacity);
        cache.set_read_from(config.cache_reads);
        Self {
            remote,
            cache: Mutex::new(cache),
            config,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn remote(&self) -> &Arc<dyn RemoteProvider> {
        &self.remote
    }

    /// Encode a value with the configured codec and hash.
    pub fn encode(&self, value: NodeValue) -> StoreResult<Block> {
        Block::encode(value, self.config.codec, self.config.hash)
    }

    /// Read and decode the block at `address`.
    ///
    /// A cache hit returns immediately. Otherwise the bytes are fetched,
    /// verified against `address`, opened with `keys` and decoded.
    pub async fn read(&self, address: &Address, keys: &Keys) -> StoreResult<Block> {
        if let Some(block) = self.cached(address) {
            debug!(address = %address, "cache hit");
            return Ok(block);
        }

        let bytes = self
            .remote
            .get(address)
            .await?
            .ok_or_else(|| StoreError::NotFound(address.to_string()))?;
        let raw = RawBlock::verified(*address, bytes)?;
        debug!(address = %address, bytes = raw.len(), "fetched block from remote");

        let block = if keys.is_none() {
            Block::decode(raw)?
        } else {
            let plain = open(raw.bytes(), keys).map_err(|e| gate_error(e, *address))?;
            let value = decode_value(&plain, self.config.codec)?;
            Block::encode(value, self.config.codec, self.config.hash)?
        };

        self.cache
            .lock()
            .expect("lock poisoned")
            .add(*address, block.clone());
        Ok(block)
    }

    /// Persist a block and return the address it is stored at.
    ///
    /// With keys the block bytes are locked first and stored under the
    /// ciphertext's own [`Codec::Raw`] address. The new address is pinned
    /// and the value's version link, if any, is unpinned best-effort.
    /// Persisting the same block twice is harmless.
    pub async fn persist(&self, block: &Block, keys: &Keys) -> StoreResult<Address> {
        let raw = if keys.is_none() {
            block.raw().clone()
        } else {
            let sealed =
                lock(block.raw().bytes(), keys).map_err(|e| gate_error(e, block.address()))?;
            RawBlock::new(Codec::Raw, self.config.hash, sealed)
        };

        let local = raw.address();
        let remote = self.remote.put(&raw).await?;
        if remote != local {
            return Err(StoreError::Mismatch { local, remote });
        }
        self.remote.pin(&local).await?;

        if let Some(previous) = block.value().previous.filter(|p| *p != local) {
            if let Err(e) = self.remote.unpin(&previous).await {
                warn!(address = %previous, error = %e, "failed to unpin previous version");
            }
        }

        self.cache
            .lock()
            .expect("lock poisoned")
            .add(local, block.clone());
        info!(
            name = %block.value().name,
            address = %local,
            keys = keys.kind(),
            "persisted block"
        );
        Ok(local)
    }

    /// Drop `address` from the cache and release its remote pin.
    ///
    /// A cache miss is not an error here: the block may have been evicted.
    pub async fn remove(&self, address: &Address) -> StoreResult<()> {
        if let Err(e) = self.evict(address) {
            debug!(address = %address, error = %e, "removed block was not cached");
        }
        self.remote.unpin(address).await
    }

    /// Drop `address` from the cache.
    pub fn evict(&self, address: &Address) -> StoreResult<Block> {
        self.cache.lock().expect("lock poisoned").remove(address)
    }

    /// The cached block at `address`, honoring the read-bypass toggle.
    pub fn cached(&self, address: &Address) -> Option<Block> {
        self.cache
            .lock()
            .expect("lock poisoned")
            .fetch(address)
            .cloned()
    }

    /// Enable or disable cache reads.
    pub fn set_cache_reads(&self, enabled: bool) {
        self.cache
            .lock()
            .expect("lock poisoned")
            .set_read_from(enabled);
    }

    pub fn cache_len(&self) -> usize {
        self.cache.lock().expect("lock poisoned").len()
    }
}

fn gate_error(err: CryptoError, address: Address) -> StoreError {
    match err {
        CryptoError::Decryption => StoreError::Decryption(address),
        other => StoreError::Keys(other),
    }
}

impl std::fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStore")
            .field("config", &self.config)
            .field("cached", &self.cache_len())
            .finish()
    }
}
