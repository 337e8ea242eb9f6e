//! Error types for root registry operations.

use thiserror::Error;

/// Errors that can occur during registry operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// No root is published under this account and label.
    #[error("no root published for {account}/{label}")]
    NotFound { account: String, label: String },

    /// The label is not acceptable as a registry key.
    #[error("invalid label {label:?}: {reason}")]
    InvalidLabel { label: String, reason: String },

    /// The account identifier is not acceptable as a namespace.
    #[error("invalid account {account:?}: {reason}")]
    InvalidAccount { account: String, reason: String },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-based registry operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;
