use canopy_types::{Codec, HashAlg};
use serde::{Deserialize, Serialize};

/// Configuration for an [`ObjectStore`](crate::ObjectStore).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum number of decoded blocks held in the cache.
    pub cache_capacity: usize,
    /// Codec for structural (plaintext) encoding.
    pub codec: Codec,
    /// Hash algorithm for new addresses.
    pub hash: HashAlg,
    /// Initial read-bypass state. `false` forces every read to the remote.
    pub cache_reads: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 100,
            codec: Codec::DagCbor,
            hash: HashAlg::Blake3,
            cache_reads: true,
        }
    }
}

impl StoreConfig {
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_hash(mut self, hash: HashAlg) -> Self {
        self.hash = hash;
        self
    }

    /// Start with cache reads disabled, so every read goes to the remote.
    pub fn uncached(mut self) -> Self {
        self.cache_reads = false;
        self
    }
}
