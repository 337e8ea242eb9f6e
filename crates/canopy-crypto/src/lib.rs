//! Cryptographic gate for Canopy.
//!
//! Provides codec-domain-separated content hashing, the lock/open gate that
//! wraps block bytes under a [`Keys`] descriptor, and deterministic key
//! derivation from an external signature.
//!
//! All crypto operations wrap established libraries.
//! Shared keys use XChaCha20-Poly1305; asymmetric keys agree an X25519
//! secret and seal with the same AEAD.

pub mod derive;
pub mod error;
pub mod gate;
pub mod hasher;
pub mod keys;
pub mod signer;

pub use derive::DerivedKeys;
pub use error::{CryptoError, CryptoResult};
pub use gate::{lock, open};
pub use hasher::ContentHasher;
pub use keys::{BoxKey, BoxPublicKey, BoxSecretKey, Keys, SymmetricKey};
pub use signer::{Signature, SigningKey, VerifyingKey};
