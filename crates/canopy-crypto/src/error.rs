/// Errors from crypto gate operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Authentication failed on open. No plaintext is ever returned.
    #[error("decryption failed: ciphertext did not authenticate")]
    Decryption,

    #[error("encryption failed: {0}")]
    Encryption(String),

    /// The keys descriptor cannot be used for the requested operation.
    #[error("invalid keys: {0}")]
    InvalidKeys(String),

    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("invalid signature")]
    InvalidSignature,
}

/// Result alias for crypto operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
