//! lock/open: the only path by which block bytes cross the encryption
//! boundary.
//!
//! Sealed layout is `nonce (24 bytes) || ciphertext+tag`. Addressing is
//! always computed by the caller over plaintext before `lock` runs.

use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{BoxKey, Keys};

const NONCE_LEN: usize = 24;
const TAG_LEN: usize = 16;
const BOX_CONTEXT: &str = "canopy 2024-05 box xchacha20poly1305";

/// Encrypt `plaintext` under `keys`. Identity for [`Keys::None`].
pub fn lock(plaintext: &[u8], keys: &Keys) -> CryptoResult<Vec<u8>> {
    let Some(key) = aead_key(keys)? else {
        return Ok(plaintext.to_vec());
    };

    let mut nonce = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let cipher = XChaCha20Poly1305::new((&key).into());
    let sealed = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|e| CryptoError::Encryption(e.to_string()))?;

    let mut out = Vec::with_capacity(NONCE_LEN + sealed.len());
    out.extend_from_slice(&nonce);
    out.extend_from_slice(&sealed);
    Ok(out)
}

/// Decrypt bytes produced by [`lock`] under the same `keys`.
///
/// Fails with [`CryptoError::Decryption`] on any authentication failure;
/// partial plaintext is never returned.
pub fn open(sealed: &[u8], keys: &Keys) -> CryptoResult<Vec<u8>> {
    let Some(key) = aead_key(keys)? else {
        return Ok(sealed.to_vec());
    };
    if sealed.len() < NONCE_LEN + TAG_LEN {
        return Err(CryptoError::Decryption);
    }

    let (nonce, body) = sealed.split_at(NONCE_LEN);
    let cipher = XChaCha20Poly1305::new((&key).into());
    cipher
        .decrypt(XNonce::from_slice(nonce), body)
        .map_err(|_| CryptoError::Decryption)
}

/// Resolve a keys descriptor to the 256-bit AEAD key, if any.
fn aead_key(keys: &Keys) -> CryptoResult<Option<[u8; 32]>> {
    match keys {
        Keys::None => Ok(None),
        Keys::Shared(key) => Ok(Some(*key.as_bytes())),
        Keys::Asymmetric { reader, writer } => box_key(reader, writer).map(Some),
    }
}

/// Agree a box key between reader and writer.
///
/// Either orientation works: the writer holds `(reader public, writer
/// secret)`, the reader holds `(reader secret, writer public)`, and both
/// arrive at the same X25519 secret. The key is bound to both public keys.
fn box_key(reader: &BoxKey, writer: &BoxKey) -> CryptoResult<[u8; 32]> {
    let shared = match (reader, writer) {
        (BoxKey::Public(rp), BoxKey::Secret(ws)) => ws.agree(rp)?,
        (BoxKey::Secret(rs), BoxKey::Public(wp)) => rs.agree(wp)?,
        (BoxKey::Secret(rs), BoxKey::Secret(ws)) => ws.agree(&rs.public_key())?,
        (BoxKey::Public(_), BoxKey::Public(_)) => {
            return Err(CryptoError::InvalidKeys(
                "asymmetric keys need one secret half".into(),
            ))
        }
    };

    let mut material = Vec::with_capacity(96);
    material.extend_from_slice(&shared);
    material.extend_from_slice(reader.public_key().as_bytes());
    material.extend_from_slice(writer.public_key().as_bytes());
    Ok(blake3::derive_key(BOX_CONTEXT, &material))
}
