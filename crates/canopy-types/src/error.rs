use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("malformed address: {0}")]
    MalformedAddress(String),

    #[error("unknown codec code: {0:#x}")]
    UnknownCodec(u64),

    #[error("unknown hash algorithm code: {0:#x}")]
    UnknownHash(u64),
}
