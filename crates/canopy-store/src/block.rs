//! Blocks: encoded bytes paired with their content address.

use canopy_crypto::ContentHasher;
use canopy_types::{Address, Codec, HashAlg, NodeValue};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Bytes as they cross the remote boundary, tagged with their address.
///
/// `address == hash(codec, bytes)` holds for every value of this type.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBlock {
    address: Address,
    bytes: Vec<u8>,
}

impl RawBlock {
    /// Hash `bytes` under `codec` and `alg`.
    pub fn new(codec: Codec, alg: HashAlg, bytes: Vec<u8>) -> Self {
        let address = ContentHasher::new(codec, alg).hash(&bytes);
        Self { address, bytes }
    }

    /// Rebuild a block fetched for `expected`, rejecting bytes that do not
    /// hash to it.
    pub fn verified(expected: Address, bytes: Vec<u8>) -> StoreResult<Self> {
        let block = Self::new(expected.codec(), expected.hash_alg(), bytes);
        if block.address != expected {
            return Err(StoreError::Integrity {
                expected,
                computed: block.address,
            });
        }
        Ok(block)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn codec(&self) -> Codec {
        self.address.codec()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for RawBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawBlock")
            .field("address", &self.address)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A decoded node value together with its canonical encoding.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    raw: RawBlock,
    value: NodeValue,
}

impl Block {
    /// Encode `value` deterministically. Fails closed for [`Codec::Raw`].
    pub fn encode(value: NodeValue, codec: Codec, alg: HashAlg) -> StoreResult<Self> {
        let bytes = encode_value(&value, codec)?;
        Ok(Self {
            raw: RawBlock::new(codec, alg, bytes),
            value,
        })
    }

    /// Decode a raw block using the codec its address names.
    pub fn decode(raw: RawBlock) -> StoreResult<Self> {
        let value = decode_value(raw.bytes(), raw.codec())?;
        Ok(Self { raw, value })
    }

    /// The structural (plaintext) address.
    pub fn address(&self) -> Address {
        self.raw.address()
    }

    pub fn codec(&self) -> Codec {
        self.raw.codec()
    }

    pub fn value(&self) -> &NodeValue {
        &self.value
    }

    pub fn into_value(self) -> NodeValue {
        self.value
    }

    pub fn raw(&self) -> &RawBlock {
        &self.raw
    }
}

/// Serialize a node value with a structured codec.
pub fn encode_value(value: &NodeValue, codec: Codec) -> StoreResult<Vec<u8>> {
    match codec {
        Codec::DagCbor => serde_cbor::to_vec(value).map_err(|e| StoreError::Codec(e.to_string())),
        Codec::DagJson => serde_json::to_vec(value).map_err(|e| StoreError::Codec(e.to_string())),
        Codec::Raw => Err(StoreError::Codec(
            "raw codec cannot carry a structured value".into(),
        )),
    }
}

/// Deserialize bytes produced by [`encode_value`].
pub fn decode_value(bytes: &[u8], codec: Codec) -> StoreResult<NodeValue> {
    match codec {
        Codec::DagCbor => {
            serde_cbor::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
        }
        Codec::DagJson => {
            serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
        }
        Codec::Raw => Err(StoreError::Codec(
            "raw bytes do not decode to a node value".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_types::Timestamp;
    use proptest::prelude::*;

    fn leaf(x: i64) -> NodeValue {
        NodeValue::at("a", Timestamp::from_millis(1_700_000_000_000)).with_field("x", x)
    }

    #[test]
    fn encode_is_deterministic() {
        let a = Block::encode(leaf(1), Codec::DagCbor, HashAlg::Blake3).unwrap();
        let b = Block::encode(leaf(1), Codec::DagCbor, HashAlg::Blake3).unwrap();
        assert_eq!(a.address(), b.address());
        assert_eq!(a.raw().bytes(), b.raw().bytes());
    }

    #[test]
    fn decode_inverts_encode_for_each_codec() {
        let child = Block::encode(leaf(0), Codec::DagCbor, HashAlg::Blake3).unwrap();
        let value = leaf(7).with_link("child", child.address());
        for codec in [Codec::DagCbor, Codec::DagJson] {
            let block = Block::encode(value.clone(), codec, HashAlg::Sha2_256).unwrap();
            let decoded = Block::decode(block.raw().clone()).unwrap();
            assert_eq!(decoded.value(), &value);
            assert_eq!(decoded.address(), block.address());
        }
    }

    #[test]
    fn raw_codec_fails_closed() {
        let err = Block::encode(leaf(1), Codec::Raw, HashAlg::Blake3).unwrap_err();
        assert!(matches!(err, StoreError::Codec(_)));
    }

    #[test]
    fn verified_rejects_tampered_bytes() {
        let block = Block::encode(leaf(1), Codec::DagCbor, HashAlg::Blake3).unwrap();
        let mut bytes = block.raw().bytes().to_vec();
        bytes.push(0);
        let err = RawBlock::verified(block.address(), bytes).unwrap_err();
        assert!(matches!(err, StoreError::Integrity { expected, .. } if expected == block.address()));
    }

    #[test]
    fn verified_accepts_original_bytes() {
        let block = Block::encode(leaf(1), Codec::DagJson, HashAlg::Blake3).unwrap();
        let raw = RawBlock::verified(block.address(), block.raw().bytes().to_vec()).unwrap();
        assert_eq!(&raw, block.raw());
    }

    #[test]
    fn garbage_does_not_decode() {
        let raw = RawBlock::new(Codec::DagCbor, HashAlg::Blake3, vec![0xff, 0x00, 0x13]);
        assert!(matches!(Block::decode(raw), Err(StoreError::Codec(_))));
    }

    proptest! {
        #[test]
        fn distinct_values_get_distinct_addresses(x in any::<i64>(), y in any::<i64>(), name in "[a-z]{1,8}") {
            prop_assume!(x != y);
            let a = Block::encode(leaf(x).with_field("n", name.clone()), Codec::DagCbor, HashAlg::Blake3).unwrap();
            let b = Block::encode(leaf(y).with_field("n", name), Codec::DagCbor, HashAlg::Blake3).unwrap();
            prop_assert_ne!(a.address(), b.address());
        }

        #[test]
        fn cbor_roundtrip(x in any::<i64>(), s in ".{0,32}", created in 0u64..4_000_000_000_000) {
            let value = NodeValue::at("n", Timestamp::from_millis(created))
                .with_field("x", x)
                .with_field("s", s);
            let block = Block::encode(value.clone(), Codec::DagCbor, HashAlg::Blake3).unwrap();
            prop_assert_eq!(Block::decode(block.raw().clone()).unwrap().into_value(), value);
        }
    }
}
