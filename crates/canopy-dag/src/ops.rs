//! Node lifecycle: insert, update, delete.
//!
//! Each operation assigns a new value, persists it, and hands the changed
//! node to the propagation engine so every ancestor's links catch up.

use std::collections::BTreeMap;

use canopy_crypto::Keys;
use canopy_types::{Address, Fields, Timestamp};
use tracing::{debug, info};

use crate::error::{DagError, DagResult};
use crate::graph::DocumentGraph;
use crate::node::NodeId;

impl DocumentGraph {
    /// Link `children` under `parent`, persist the parent, and propagate.
    ///
    /// Children that are not yet stored are persisted first so the parent
    /// links to their stored addresses. Each child is recorded under its
    /// own name, replacing any earlier link with that name.
    pub async fn insert(
        &mut self,
        parent: NodeId,
        children: &[NodeId],
        keys: &Keys,
    ) -> DagResult<Address> {
        if self.node(parent)?.is_tombstoned() {
            return Err(DagError::Tombstoned(parent));
        }
        for &child in children {
            if self.node(child)?.is_tombstoned() {
                return Err(DagError::Tombstoned(child));
            }
            if self.has_ancestor(parent, child)? {
                return Err(DagError::Cycle { parent, child });
            }
        }

        for &child in children {
            if !self.node(child)?.is_durable() {
                self.persist(child, keys).await?;
            }
        }

        // One link per name: a later child wins over an earlier one of the
        // same name, and over whatever the parent linked there before.
        let mut linked: BTreeMap<String, NodeId> = BTreeMap::new();
        for &child in children {
            linked.insert(self.node(child)?.name().to_string(), child);
        }
        let mut displaced = Vec::new();
        for (name, &child) in &linked {
            if let Some(old) = self.child(parent, name)? {
                if old != child {
                    displaced.push(old);
                }
            }
        }

        let node = self.node(parent)?;
        let previous = node.stored_address();
        let mut value = node.value().clone();
        for (name, &child) in &linked {
            value.set_link(name.clone(), self.address_of(child)?);
        }
        if previous.is_some() {
            value.set_previous(previous);
        }
        value.touch(Timestamp::now());

        let block = self.store().encode(value)?;
        self.replace_block(parent, block)?;
        for old in displaced {
            debug!(parent = %parent, node = %old, "unlinked displaced child");
            self.node_mut(old)?.remove_parent(parent);
        }
        for &child in linked.values() {
            self.node_mut(child)?.add_parent(parent);
        }

        let address = self.persist(parent, keys).await?;
        info!(
            parent = %address.short_hex(),
            children = children.len(),
            "inserted children"
        );
        self.propagate(vec![parent], keys).await?;
        self.address_of(parent)
    }

    /// Replace a node's scalar fields with `patch`, persist, and propagate.
    ///
    /// Fields absent from the patch are dropped. Links are kept.
    pub async fn update(&mut self, id: NodeId, patch: Fields, keys: &Keys) -> DagResult<Address> {
        let node = self.node(id)?;
        if node.is_tombstoned() {
            return Err(DagError::Tombstoned(id));
        }
        let previous = node.stored_address();
        let mut value = node.value().clone();
        value.replace_fields(patch);
        value.touch(Timestamp::now());
        value.set_previous(previous);

        let block = self.store().encode(value)?;
        self.replace_block(id, block)?;
        let address = self.persist(id, keys).await?;
        info!(node = %address.short_hex(), "updated node");

        self.propagate(vec![id], keys).await?;
        self.address_of(id)
    }

    /// Delete a node and drop its link from every parent.
    ///
    /// Children are not deleted; they only lose this node as a parent.
    /// Deleting a deleted node succeeds without doing anything.
    pub async fn delete(&mut self, id: NodeId, keys: &Keys) -> DagResult<()> {
        let Some(address) = self.node(id)?.address() else {
            debug!(node = %id, "node already deleted");
            return Ok(());
        };

        self.store().remove(&address).await?;
        self.tombstone(id)?;
        info!(node = %address.short_hex(), "deleted node");

        self.propagate(vec![id], keys).await?;

        for child in self.children(id) {
            self.node_mut(child)?.remove_parent(id);
        }
        self.node_mut(id)?.clear_parents();
        Ok(())
    }
}
