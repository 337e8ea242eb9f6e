use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{Codec, HashAlg};
use crate::error::TypeError;

/// Content address of an immutable block.
///
/// An `Address` pairs the codec the block was encoded with, the hash
/// algorithm that produced the digest, and the 32-byte digest itself.
/// Two addresses are equal iff their codec and digest match; the hash tag
/// is carried for decoding but does not participate in equality.
///
/// The text form is `<codec-code>.<hash-code>.<hex-digest>` with codes in
/// lowercase hex, e.g. `71.1e.9f86d081...`.
#[derive(Clone, Copy)]
pub struct Address {
    codec: Codec,
    hash: HashAlg,
    digest: [u8; 32],
}

impl Address {
    /// Assemble an address from its parts.
    pub const fn new(codec: Codec, hash: HashAlg, digest: [u8; 32]) -> Self {
        Self {
            codec,
            hash,
            digest,
        }
    }

    /// Codec of the addressed bytes.
    pub fn codec(&self) -> Codec {
        self.codec
    }

    /// Hash algorithm that produced the digest.
    pub fn hash_alg(&self) -> HashAlg {
        self.hash
    }

    /// The raw 32-byte digest.
    pub fn digest(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Hex-encoded digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Short hex representation (first 8 characters of the digest).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.codec == other.codec && self.digest == other.digest
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.codec.hash(state);
        self.digest.hash(state);
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({}:{})", self.codec, self.short_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:x}.{:x}.{}",
            self.codec.code(),
            self.hash.code(),
            self.to_hex()
        )
    }
}

impl FromStr for Address {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().splitn(3, '.');
        let (Some(codec), Some(hash), Some(digest)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(TypeError::MalformedAddress(s.to_string()));
        };

        let code = |part: &str| {
            u64::from_str_radix(part, 16).map_err(|_| TypeError::MalformedAddress(s.to_string()))
        };
        let codec = Codec::from_code(code(codec)?)?;
        let hash = HashAlg::from_code(code(hash)?)?;

        let bytes = hex::decode(digest).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        let digest: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            })?;
        Ok(Self::new(codec, hash, digest))
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
