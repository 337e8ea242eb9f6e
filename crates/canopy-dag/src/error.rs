//! Error types for document graph operations.

use canopy_store::StoreError;
use canopy_types::Address;

use crate::node::NodeId;

/// Errors that can occur during graph operations.
#[derive(Debug, thiserror::Error)]
pub enum DagError {
    /// A store failure, passed through unchanged.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The operation needs the address of a deleted node.
    #[error("node {0} is tombstoned")]
    Tombstoned(NodeId),

    /// The handle does not belong to this graph.
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// Linking the child under the parent would close a cycle.
    #[error("linking {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },

    /// A copied node links to an address the copy has not produced yet.
    #[error("copy reached a link to {0} before copying it")]
    UncopiedLink(Address),
}

impl DagError {
    /// Returns `true` if retrying with identical inputs may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_retryable())
    }
}

/// Convenience alias for graph results.
pub type DagResult<T> = Result<T, DagError>;
