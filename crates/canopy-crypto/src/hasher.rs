use canopy_types::{Address, Codec, HashAlg};
use sha2::{Digest, Sha256};

/// Codec-domain-separated content hasher.
///
/// The codec name is prepended to every hash computation, so identical bytes
/// declared under two codecs never share a digest. The resulting [`Address`]
/// carries both the codec and the algorithm tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    codec: Codec,
    alg: HashAlg,
}

impl ContentHasher {
    /// Create a hasher for a codec and algorithm.
    pub const fn new(codec: Codec, alg: HashAlg) -> Self {
        Self { codec, alg }
    }

    /// The hasher that produced `address`, for re-verification.
    pub fn for_address(address: &Address) -> Self {
        Self::new(address.codec(), address.hash_alg())
    }

    /// Hash raw bytes into an address.
    pub fn hash(&self, data: &[u8]) -> Address {
        let domain = self.codec.name().as_bytes();
        let digest = match self.alg {
            HashAlg::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(domain);
                hasher.update(b":");
                hasher.update(data);
                *hasher.finalize().as_bytes()
            }
            HashAlg::Sha2_256 => {
                let mut hasher = Sha256::new();
                hasher.update(domain);
                hasher.update(b":");
                hasher.update(data);
                hasher.finalize().into()
            }
        };
        Address::new(self.codec, self.alg, digest)
    }

    /// Verify that data hashes to the expected address.
    pub fn verify(data: &[u8], expected: &Address) -> bool {
        Self::for_address(expected).hash(data) == *expected
    }

    /// The codec this hasher tags addresses with.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// The hash algorithm in use.
    pub fn alg(&self) -> HashAlg {
        self.alg
    }
}
