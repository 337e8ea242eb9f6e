//! Foundation types for Canopy.
//!
//! This crate provides the addressing and value types shared by every other
//! Canopy crate. Nothing here performs I/O or cryptography; hashing lives in
//! `canopy-crypto` and storage in `canopy-store`.
//!
//! # Key Types
//!
//! - [`Address`] -- Content address: codec tag + hash tag + 32-byte digest
//! - [`Codec`] -- Serialization codec a block was encoded with
//! - [`HashAlg`] -- Hash algorithm that produced an address digest
//! - [`NodeValue`] -- Tagged node value: scalar fields, named links, version link
//! - [`Timestamp`] -- Millisecond wall-clock marker stamped on node values

pub mod address;
pub mod codec;
pub mod error;
pub mod temporal;
pub mod value;

pub use address::Address;
pub use codec::{Codec, HashAlg};
pub use error::TypeError;
pub use temporal::Timestamp;
pub use value::{FieldValue, Fields, Links, NodeValue};
