//! Document nodes held in the graph arena.

use std::collections::BTreeSet;
use std::fmt;

use canopy_store::Block;
use canopy_types::{Address, NodeValue};

/// Handle to a node inside one [`DocumentGraph`](crate::DocumentGraph).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A document node: its current block plus in-memory parent edges.
///
/// The parent set is rebuilt by traversal and never persisted. A cleared
/// address marks the node as deleted.
#[derive(Clone, Debug)]
pub struct Node {
    block: Block,
    address: Option<Address>,
    parents: BTreeSet<NodeId>,
    durable: bool,
}

impl Node {
    /// A fresh node whose address is its structural one until persisted.
    pub(crate) fn fresh(block: Block) -> Self {
        Self {
            address: Some(block.address()),
            block,
            parents: BTreeSet::new(),
            durable: false,
        }
    }

    /// A node materialized from the remote at `address`.
    pub(crate) fn stored(block: Block, address: Address) -> Self {
        Self {
            block,
            address: Some(address),
            parents: BTreeSet::new(),
            durable: true,
        }
    }

    /// Logical name; parents link to this node under it.
    pub fn name(&self) -> &str {
        &self.block.value().name
    }

    pub fn value(&self) -> &NodeValue {
        self.block.value()
    }

    pub fn block(&self) -> &Block {
        &self.block
    }

    /// Current address, or `None` once deleted.
    ///
    /// After a persist this is the storage address, which differs from the
    /// block's structural address when the node was locked.
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    pub fn parents(&self) -> &BTreeSet<NodeId> {
        &self.parents
    }

    pub fn is_tombstoned(&self) -> bool {
        self.address.is_none()
    }

    /// Returns `true` if the current value is stored remotely.
    pub fn is_durable(&self) -> bool {
        self.durable
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// The address the node last persisted at, if its current value is stored.
    pub(crate) fn stored_address(&self) -> Option<Address> {
        self.address.filter(|_| self.durable)
    }

    pub(crate) fn set_block(&mut self, block: Block) {
        self.address = Some(block.address());
        self.block = block;
        self.durable = false;
    }

    pub(crate) fn mark_persisted(&mut self, address: Address) {
        self.address = Some(address);
        self.durable = true;
    }

    pub(crate) fn tombstone(&mut self) {
        self.address = None;
        self.durable = false;
    }

    pub(crate) fn add_parent(&mut self, parent: NodeId) -> bool {
        self.parents.insert(parent)
    }

    pub(crate) fn remove_parent(&mut self, parent: NodeId) -> bool {
        self.parents.remove(&parent)
    }

    pub(crate) fn clear_parents(&mut self) {
        self.parents.clear();
    }
}
