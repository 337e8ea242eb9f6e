//! The node arena.
//!
//! [`DocumentGraph`] owns every node it has created or read. Nodes refer to
//! their parents by [`NodeId`], so shared structure never forms ownership
//! cycles. Mutations take `&mut self`, which serializes propagation for
//! every root held by one graph.

use std::collections::HashMap;
use std::sync::Arc;

use canopy_crypto::Keys;
use canopy_store::{Block, ObjectStore};
use canopy_types::{Address, NodeValue};
use tracing::debug;

use crate::error::{DagError, DagResult};
use crate::node::{Node, NodeId};

/// An arena of document nodes backed by an [`ObjectStore`].
#[derive(Debug)]
pub struct DocumentGraph {
    store: Arc<ObjectStore>,
    nodes: Vec<Node>,
    /// Stored address to the node currently holding it.
    index: HashMap<Address, NodeId>,
}

impl DocumentGraph {
    pub fn new(store: Arc<ObjectStore>) -> Self {
        Self {
            store,
            nodes: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn store(&self) -> &Arc<ObjectStore> {
        &self.store
    }

    /// Number of nodes in the arena, deleted ones included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> DagResult<&Node> {
        self.nodes.get(id.0).ok_or(DagError::UnknownNode(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> DagResult<&mut Node> {
        self.nodes.get_mut(id.0).ok_or(DagError::UnknownNode(id))
    }

    /// Current address of a live node.
    pub fn address_of(&self, id: NodeId) -> DagResult<Address> {
        self.node(id)?.address().ok_or(DagError::Tombstoned(id))
    }

    /// The node currently stored at `address`, if it is in the arena.
    pub fn find(&self, address: &Address) -> Option<NodeId> {
        self.index.get(address).copied()
    }

    /// The child of `parent` linked under `name`, if it is in the arena.
    ///
    /// Nodes with identical content share an address, so a node that has
    /// `parent` among its parents is preferred over whichever node the
    /// address index holds.
    pub fn child(&self, parent: NodeId, name: &str) -> DagResult<Option<NodeId>> {
        let Some(address) = self.node(parent)?.value().link(name).copied() else {
            return Ok(None);
        };
        let attached = self
            .nodes
            .iter()
            .position(|node| node.parents().contains(&parent) && node.address() == Some(address))
            .map(NodeId);
        Ok(attached.or_else(|| self.find(&address)))
    }

    /// Nodes that list `id` among their parents.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.parents().contains(&id))
            .map(|(i, _)| NodeId(i))
            .collect()
    }

    /// Add a new, not yet persisted node.
    pub fn create(&mut self, value: NodeValue) -> DagResult<NodeId> {
        let block = self.store.encode(value)?;
        let id = NodeId(self.nodes.len());
        debug!(node = %id, name = %block.value().name, "created node");
        self.nodes.push(Node::fresh(block));
        Ok(id)
    }

    /// Materialize the node stored at `address`.
    ///
    /// Returns the existing handle if the address is already in the arena.
    pub async fn read(&mut self, address: &Address, keys: &Keys) -> DagResult<NodeId> {
        if let Some(id) = self.find(address) {
            return Ok(id);
        }
        let block = self.store.read(address, keys).await?;
        Ok(self.adopt(block, *address))
    }

    /// Persist a node's current value and record where it was stored.
    pub async fn persist(&mut self, id: NodeId, keys: &Keys) -> DagResult<Address> {
        let node = self.node(id)?;
        if node.is_tombstoned() {
            return Err(DagError::Tombstoned(id));
        }
        let address = self.store.persist(node.block(), keys).await?;
        self.commit(id, address)?;
        Ok(address)
    }

    /// Add a block read from `address` to the arena, or find the node
    /// already holding it.
    pub(crate) fn adopt(&mut self, block: Block, address: Address) -> NodeId {
        if let Some(id) = self.find(&address) {
            return id;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::stored(block, address));
        self.index.insert(address, id);
        id
    }

    /// Give `id` a new value. Its address becomes the structural one until
    /// the next commit.
    pub(crate) fn replace_block(&mut self, id: NodeId, block: Block) -> DagResult<()> {
        self.unindex(id)?;
        self.node_mut(id)?.set_block(block);
        Ok(())
    }

    /// Record that `id`'s current value is stored at `address`.
    pub(crate) fn commit(&mut self, id: NodeId, address: Address) -> DagResult<()> {
        self.unindex(id)?;
        self.node_mut(id)?.mark_persisted(address);
        self.index.insert(address, id);
        Ok(())
    }

    pub(crate) fn tombstone(&mut self, id: NodeId) -> DagResult<()> {
        self.unindex(id)?;
        self.node_mut(id)?.tombstone();
        Ok(())
    }

    fn unindex(&mut self, id: NodeId) -> DagResult<()> {
        if let Some(address) = self.node(id)?.stored_address() {
            if self.index.get(&address) == Some(&id) {
                self.index.remove(&address);
            }
        }
        Ok(())
    }

    /// Returns `true` if `ancestor` is reachable from `id` through parent edges.
    pub(crate) fn has_ancestor(&self, id: NodeId, ancestor: NodeId) -> DagResult<bool> {
        let mut stack = vec![id];
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            if current == ancestor {
                return Ok(true);
            }
            if seen.insert(current) {
                stack.extend(self.node(current)?.parents().iter().copied());
            }
        }
        Ok(false)
    }
}
