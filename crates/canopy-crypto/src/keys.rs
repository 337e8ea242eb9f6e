//! The keys descriptor threaded through read, persist and traverse.

use std::fmt;

use curve25519_dalek::montgomery::MontgomeryPoint;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CryptoError, CryptoResult};

/// 256-bit symmetric key for shared locking.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; 32]);

impl SymmetricKey {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse from a 64-character hex string.
    pub fn from_hex(s: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(s.trim()).map_err(|e| CryptoError::InvalidKeys(e.to_string()))?;
        let arr: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Generate a random key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

/// X25519 secret key used for asymmetric locking.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct BoxSecretKey([u8; 32]);

impl BoxSecretKey {
    /// Create from raw 32-byte secret (clamped at use).
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Generate a random secret key.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// The corresponding public key.
    pub fn public_key(&self) -> BoxPublicKey {
        BoxPublicKey(MontgomeryPoint::mul_base_clamped(self.0).to_bytes())
    }

    /// X25519 agreement with a peer's public key.
    ///
    /// Rejects low-order peer keys that would yield an all-zero secret.
    pub(crate) fn agree(&self, peer: &BoxPublicKey) -> CryptoResult<[u8; 32]> {
        let shared = MontgomeryPoint(peer.0).mul_clamped(self.0).to_bytes();
        if shared == [0u8; 32] {
            return Err(CryptoError::InvalidKeys(
                "peer public key has low order".into(),
            ));
        }
        Ok(shared)
    }
}

/// X25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoxPublicKey([u8; 32]);

impl BoxPublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// One side of an asymmetric pair: either half may be the local secret.
#[derive(Clone)]
pub enum BoxKey {
    Public(BoxPublicKey),
    Secret(BoxSecretKey),
}

impl BoxKey {
    /// The public half, derived if this is a secret.
    pub fn public_key(&self) -> BoxPublicKey {
        match self {
            Self::Public(pk) => *pk,
            Self::Secret(sk) => sk.public_key(),
        }
    }
}

/// Encryption capability threaded opaquely through the object store.
///
/// `Asymmetric` pairs a reader key with a writer key. Exactly as in a sealed
/// box between two parties, the local side holds one secret and knows the
/// other side's public key: a writer locks with `(reader public, writer
/// secret)` and a reader opens with `(reader secret, writer public)`.
#[derive(Clone, Default)]
pub enum Keys {
    /// Plaintext: lock and open are the identity.
    #[default]
    None,
    /// Symmetric authenticated encryption under one shared key.
    Shared(SymmetricKey),
    /// Public-key authenticated encryption between reader and writer.
    Asymmetric { reader: BoxKey, writer: BoxKey },
}

impl Keys {
    /// Shared-key descriptor.
    pub fn shared(key: SymmetricKey) -> Self {
        Self::Shared(key)
    }

    /// Keys for locking a block to `reader`.
    pub fn write_to(reader: BoxPublicKey, writer: BoxSecretKey) -> Self {
        Self::Asymmetric {
            reader: BoxKey::Public(reader),
            writer: BoxKey::Secret(writer),
        }
    }

    /// Keys for opening a block written by `writer`.
    pub fn read_from(reader: BoxSecretKey, writer: BoxPublicKey) -> Self {
        Self::Asymmetric {
            reader: BoxKey::Secret(reader),
            writer: BoxKey::Public(writer),
        }
    }

    /// Returns `true` for the plaintext descriptor.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Short label for logs. Never includes key material.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Shared(_) => "shared",
            Self::Asymmetric { .. } => "asymmetric",
        }
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey(<redacted>)")
    }
}

impl fmt::Debug for BoxSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxSecretKey(<redacted>)")
    }
}

impl fmt::Debug for BoxPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoxPublicKey({})", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for BoxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public(pk) => write!(f, "Public({pk:?})"),
            Self::Secret(_) => write!(f, "Secret(<redacted>)"),
        }
    }
}

impl fmt::Debug for Keys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Keys::{}", self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secrets() {
        let keys = Keys::shared(SymmetricKey::generate());
        assert_eq!(format!("{keys:?}"), "Keys::shared");
        let sk = BoxSecretKey::generate();
        assert!(format!("{sk:?}").contains("redacted"));
    }

    #[test]
    fn agreement_is_symmetric() {
        let alice = BoxSecretKey::generate();
        let bob = BoxSecretKey::generate();
        let ab = alice.agree(&bob.public_key()).unwrap();
        let ba = bob.agree(&alice.public_key()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn low_order_public_key_rejected() {
        let sk = BoxSecretKey::generate();
        let zero = BoxPublicKey::from_bytes([0u8; 32]);
        assert!(matches!(sk.agree(&zero), Err(CryptoError::InvalidKeys(_))));
    }

    #[test]
    fn symmetric_key_hex() {
        let key = SymmetricKey::from_hex(&"ab".repeat(32)).unwrap();
        assert_eq!(key.as_bytes(), &[0xab; 32]);
        assert!(matches!(
            SymmetricKey::from_hex("abcd"),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn default_is_plaintext() {
        assert!(Keys::default().is_none());
    }
}
