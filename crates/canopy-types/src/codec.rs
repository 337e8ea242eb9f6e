use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Serialization codec of a block's bytes.
///
/// Codes follow the multicodec table so addresses stay recognisable to
/// other content-addressed tooling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Codec {
    /// Opaque bytes (ciphertext, binary payloads). Cannot carry a structured value.
    Raw,
    /// Deterministic CBOR.
    #[default]
    DagCbor,
    /// Deterministic JSON.
    DagJson,
}

impl Codec {
    /// Multicodec code.
    pub const fn code(&self) -> u64 {
        match self {
            Self::Raw => 0x55,
            Self::DagCbor => 0x71,
            Self::DagJson => 0x0129,
        }
    }

    /// Parse from a multicodec code.
    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0x55 => Ok(Self::Raw),
            0x71 => Ok(Self::DagCbor),
            0x0129 => Ok(Self::DagJson),
            other => Err(TypeError::UnknownCodec(other)),
        }
    }

    /// Short name, also used as the hashing domain tag.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::DagCbor => "dag-cbor",
            Self::DagJson => "dag-json",
        }
    }

    /// Returns `true` if the codec can carry a structured node value.
    pub fn is_structured(&self) -> bool {
        !matches!(self, Self::Raw)
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Hash algorithm that produced an address digest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HashAlg {
    #[default]
    Blake3,
    Sha2_256,
}

impl HashAlg {
    /// Multihash code.
    pub const fn code(&self) -> u64 {
        match self {
            Self::Blake3 => 0x1e,
            Self::Sha2_256 => 0x12,
        }
    }

    /// Parse from a multihash code.
    pub fn from_code(code: u64) -> Result<Self, TypeError> {
        match code {
            0x1e => Ok(Self::Blake3),
            0x12 => Ok(Self::Sha2_256),
            other => Err(TypeError::UnknownHash(other)),
        }
    }
}

impl fmt::Display for HashAlg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blake3 => write!(f, "blake3"),
            Self::Sha2_256 => write!(f, "sha2-256"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_code_roundtrip() {
        for codec in [Codec::Raw, Codec::DagCbor, Codec::DagJson] {
            assert_eq!(Codec::from_code(codec.code()).unwrap(), codec);
        }
    }

    #[test]
    fn unknown_codec_rejected() {
        assert_eq!(Codec::from_code(0xdead), Err(TypeError::UnknownCodec(0xdead)));
    }

    #[test]
    fn hash_code_roundtrip() {
        for alg in [HashAlg::Blake3, HashAlg::Sha2_256] {
            assert_eq!(HashAlg::from_code(alg.code()).unwrap(), alg);
        }
    }

    #[test]
    fn raw_is_not_structured() {
        assert!(!Codec::Raw.is_structured());
        assert!(Codec::DagCbor.is_structured());
        assert!(Codec::DagJson.is_structured());
    }

    #[test]
    fn defaults() {
        assert_eq!(Codec::default(), Codec::DagCbor);
        assert_eq!(HashAlg::default(), HashAlg::Blake3);
    }
}
