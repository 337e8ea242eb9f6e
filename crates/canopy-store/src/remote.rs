use async_trait::async_trait;
use canopy_types::Address;

use crate::block::RawBlock;
use crate::error::StoreResult;

/// Content-addressed remote object storage.
///
/// Implementations must satisfy these invariants:
/// - `get` returns bytes that hash to the requested address, or `None`.
///   Callers re-verify regardless.
/// - `put` computes the address itself from the block's codec and bytes
///   and returns it. Writing an existing block is a no-op.
/// - `pin` and `unpin` are idempotent. Unpinning something never pinned
///   succeeds.
/// - Transport failures surface as [`StoreError::Remote`](crate::StoreError::Remote).
#[async_trait]
pub trait RemoteProvider: Send + Sync {
    /// Fetch the bytes stored at `address`.
    async fn get(&self, address: &Address) -> StoreResult<Option<Vec<u8>>>;

    /// Store a block and return the address the provider assigned to it.
    async fn put(&self, block: &RawBlock) -> StoreResult<Address>;

    /// Keep `address` alive.
    async fn pin(&self, address: &Address) -> StoreResult<()>;

    /// Release a pin on `address`.
    async fn unpin(&self, address: &Address) -> StoreResult<()>;
}
