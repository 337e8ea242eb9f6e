//! Deterministic key derivation from an external signature.
//!
//! The identity layer obtains a signature over a fixed phrase from the
//! account holder's wallet and hands its bytes here. The same signature
//! always yields the same key pairs, so no key material is ever stored.

use crate::error::CryptoResult;
use crate::keys::{BoxPublicKey, BoxSecretKey, Keys, SymmetricKey};
use crate::signer::{SigningKey, VerifyingKey};

// Changing any context string orphans every document locked with keys
// derived under it.
const BOX_CONTEXT: &str = "canopy 2024-05 derive box key";
const SIGNING_CONTEXT: &str = "canopy 2024-05 derive signing key";
const EXCHANGE_CONTEXT: &str = "canopy 2024-05 derive exchange key";
const SHARED_CONTEXT: &str = "canopy 2024-05 shared key agreement";

/// Key pairs derived from one signature.
#[derive(Debug)]
pub struct DerivedKeys {
    boxing: BoxSecretKey,
    signing: SigningKey,
    exchange: BoxSecretKey,
}

impl DerivedKeys {
    /// Derive box, signing and exchange keys from signature bytes.
    pub fn from_signature(signature: &[u8]) -> Self {
        Self {
            boxing: BoxSecretKey::from_bytes(blake3::derive_key(BOX_CONTEXT, signature)),
            signing: SigningKey::from_seed(blake3::derive_key(SIGNING_CONTEXT, signature)),
            exchange: BoxSecretKey::from_bytes(blake3::derive_key(EXCHANGE_CONTEXT, signature)),
        }
    }

    /// Public key others lock to when writing for this account.
    pub fn box_public(&self) -> BoxPublicKey {
        self.boxing.public_key()
    }

    /// Public key others agree shared keys against.
    pub fn exchange_public(&self) -> BoxPublicKey {
        self.exchange.public_key()
    }

    /// The account's verifying key.
    pub fn verifying_key(&self) -> VerifyingKey {
        self.signing.verifying_key()
    }

    /// The account's signing key.
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }

    /// Registry namespace of the account these keys belong to.
    pub fn account_id(&self) -> String {
        self.verifying_key().account_id()
    }

    /// Keys for locking blocks to `reader`.
    pub fn write_to(&self, reader: BoxPublicKey) -> Keys {
        Keys::write_to(reader, self.boxing.clone())
    }

    /// Keys for opening blocks written by `writer`.
    pub fn read_from(&self, writer: BoxPublicKey) -> Keys {
        Keys::read_from(self.boxing.clone(), writer)
    }

    /// Keys for locking and opening one's own blocks.
    pub fn for_self(&self) -> Keys {
        self.write_to(self.box_public())
    }

    /// A symmetric key both peers derive identically from their exchange keys.
    pub fn shared_with(&self, peer: BoxPublicKey) -> CryptoResult<Keys> {
        let secret = self.exchange.agree(&peer)?;
        let own = self.exchange_public();
        let (lo, hi) = if own.as_bytes() <= peer.as_bytes() {
            (own, peer)
        } else {
            (peer, own)
        };

        let mut material = Vec::with_capacity(96);
        material.extend_from_slice(&secret);
        material.extend_from_slice(lo.as_bytes());
        material.extend_from_slice(hi.as_bytes());
        Ok(Keys::shared(SymmetricKey::from_bytes(blake3::derive_key(
            SHARED_CONTEXT,
            &material,
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{lock, open};

    #[test]
    fn derivation_is_deterministic() {
        let a = DerivedKeys::from_signature(b"signature-bytes");
        let b = DerivedKeys::from_signature(b"signature-bytes");
        assert_eq!(a.box_public(), b.box_public());
        assert_eq!(a.exchange_public(), b.exchange_public());
        assert_eq!(a.verifying_key(), b.verifying_key());
    }

    #[test]
    fn purposes_get_distinct_keys() {
        let keys = DerivedKeys::from_signature(b"sig");
        assert_ne!(keys.box_public(), keys.exchange_public());
    }

    #[test]
    fn self_keys_roundtrip() {
        let keys = DerivedKeys::from_signature(b"sig").for_self();
        let sealed = lock(b"note to self", &keys).unwrap();
        assert_eq!(open(&sealed, &keys).unwrap(), b"note to self");
    }

    #[test]
    fn write_to_read_from_between_accounts() {
        let alice = DerivedKeys::from_signature(b"alice");
        let bob = DerivedKeys::from_signature(b"bob");

        let sealed = lock(b"hi bob", &alice.write_to(bob.box_public())).unwrap();
        let opened = open(&sealed, &bob.read_from(alice.box_public())).unwrap();
        assert_eq!(opened, b"hi bob");
    }

    #[test]
    fn shared_keys_agree_between_peers() {
        let alice = DerivedKeys::from_signature(b"alice");
        let bob = DerivedKeys::from_signature(b"bob");

        let from_alice = alice.shared_with(bob.exchange_public()).unwrap();
        let from_bob = bob.shared_with(alice.exchange_public()).unwrap();

        let sealed = lock(b"group doc", &from_alice).unwrap();
        assert_eq!(open(&sealed, &from_bob).unwrap(), b"group doc");
    }

    #[test]
    fn derived_signing_key_verifies() {
        let keys = DerivedKeys::from_signature(b"sig");
        let sig = keys.signing_key().sign(b"publish");
        assert!(keys.verifying_key().verify(b"publish", &sig).is_ok());
    }

    #[test]
    fn account_id_follows_signature() {
        let a = DerivedKeys::from_signature(b"alice");
        assert_eq!(a.account_id(), DerivedKeys::from_signature(b"alice").account_id());
        assert_ne!(a.account_id(), DerivedKeys::from_signature(b"bob").account_id());
    }
}
