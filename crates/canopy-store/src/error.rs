use canopy_crypto::CryptoError;
use canopy_types::Address;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Fetched bytes do not hash to the requested address.
    #[error("integrity check failed for {expected}: bytes hash to {computed}")]
    Integrity { expected: Address, computed: Address },

    /// Authentication failed while opening a block. No plaintext escapes.
    #[error("decryption failed for {0}")]
    Decryption(Address),

    /// The remote assigned a different address than the one computed locally.
    #[error("remote assigned {remote}, expected {local}")]
    Mismatch { local: Address, remote: Address },

    /// Transport or provider failure, passed through uninterpreted.
    #[error("remote error: {0}")]
    Remote(String),

    /// The key is absent from the cache or the remote.
    #[error("not found: {0}")]
    NotFound(String),

    /// The value cannot be encoded or decoded with the requested codec.
    #[error("codec error: {0}")]
    Codec(String),

    /// The keys descriptor cannot lock or open anything.
    #[error("unusable keys: {0}")]
    Keys(CryptoError),
}

impl StoreError {
    /// Returns `true` if repeating the operation with identical inputs may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    pub(crate) fn remote(err: impl std::fmt::Display) -> Self {
        Self::Remote(err.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
