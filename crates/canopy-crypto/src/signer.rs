//! Ed25519 account identity.
//!
//! An account is named by the lowercase hex of its verifying key. The root
//! registry uses that string as the account namespace, so anyone holding
//! the same derived keys publishes into the same namespace.

use std::fmt;

use ed25519_dalek::{Signer, Verifier};

use crate::error::{CryptoError, CryptoResult};

/// Secret half of an account identity.
pub struct SigningKey(ed25519_dalek::SigningKey);

/// Public half of an account identity.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct VerifyingKey(ed25519_dalek::VerifyingKey);

/// Detached Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl SigningKey {
    /// Expand a 32-byte seed. The same seed always yields the same identity.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self(ed25519_dalek::SigningKey::from_bytes(&seed))
    }

    pub fn verifying_key(&self) -> VerifyingKey {
        VerifyingKey(self.0.verifying_key())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.0.sign(message).to_bytes())
    }
}

impl VerifyingKey {
    pub fn verify(&self, message: &[u8], signature: &Signature) -> CryptoResult<()> {
        let signature = ed25519_dalek::Signature::from_bytes(&signature.0);
        self.0
            .verify(message, &signature)
            .map_err(|_| CryptoError::InvalidSignature)
    }

    /// Registry namespace owned by this key.
    pub fn account_id(&self) -> String {
        hex::encode(self.0.as_bytes())
    }

    /// Parse an account id back into the key that owns it.
    pub fn from_account_id(account: &str) -> CryptoResult<Self> {
        let bytes = hex::decode(account).map_err(|e| CryptoError::InvalidKeys(e.to_string()))?;
        let bytes: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map(Self)
            .map_err(|_| CryptoError::InvalidKeys("not an ed25519 point".into()))
    }
}

impl fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningKey(<redacted>)")
    }
}

impl fmt::Display for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.account_id())
    }
}

impl fmt::Debug for VerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VerifyingKey({})", &self.account_id()[..16])
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..8]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_binds_message_and_key() {
        let key = SigningKey::from_seed([1; 32]);
        let sig = key.sign(b"publish notes");
        assert!(key.verifying_key().verify(b"publish notes", &sig).is_ok());
        assert_eq!(
            key.verifying_key().verify(b"publish other", &sig),
            Err(CryptoError::InvalidSignature)
        );
        let other = SigningKey::from_seed([2; 32]).verifying_key();
        assert_eq!(other.verify(b"publish notes", &sig), Err(CryptoError::InvalidSignature));
    }

    #[test]
    fn account_id_parses_back() {
        let key = SigningKey::from_seed([4; 32]).verifying_key();
        let id = key.account_id();
        assert_eq!(id.len(), 64);
        assert_eq!(id, key.to_string());
        assert_eq!(VerifyingKey::from_account_id(&id).unwrap(), key);
    }

    #[test]
    fn malformed_account_id_rejected() {
        assert!(VerifyingKey::from_account_id("zz").is_err());
        assert!(matches!(
            VerifyingKey::from_account_id("abcd"),
            Err(CryptoError::InvalidKeyLength { expected: 32, actual: 2 })
        ));
    }

    #[test]
    fn debug_redacts_signing_key() {
        assert!(format!("{:?}", SigningKey::from_seed([9; 32])).contains("redacted"));
    }
}
