//! Post-order depth-first traversal.
//!
//! Traversal is also how a graph learns its parent edges: every link it
//! follows registers the discovering node as a parent of the link target.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use canopy_crypto::Keys;
use canopy_store::StoreError;
use canopy_types::Address;
use futures::future::try_join_all;
use tracing::debug;

use crate::error::{DagError, DagResult};
use crate::graph::DocumentGraph;
use crate::node::{Node, NodeId};

/// Callback run once per reachable node, after all of its descendants.
#[async_trait]
pub trait Visitor: Send {
    /// Visit `node` found at `depth` links below the root. Traversal waits
    /// for this to finish before moving on.
    async fn visit(&mut self, graph: &mut DocumentGraph, node: NodeId, depth: usize)
        -> DagResult<()>;
}

enum Frame {
    Enter(NodeId, usize),
    Exit(NodeId, usize),
}

impl DocumentGraph {
    /// Walk the graph below `root` in post-order and return the root's handle.
    ///
    /// Each node is visited once per call however many paths reach it. The
    /// children of a node are fetched concurrently before any is entered.
    pub async fn traverse<V>(&mut self, root: &Address, keys: &Keys, visitor: &mut V) -> DagResult<NodeId>
    where
        V: Visitor + ?Sized,
    {
        let root_id = self.read(root, keys).await?;
        let mut entered = HashSet::new();
        let mut stack = vec![Frame::Enter(root_id, 0)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(id, depth) => {
                    if !entered.insert(id) {
                        continue;
                    }
                    stack.push(Frame::Exit(id, depth));
                    let children = self.load_children(id, keys).await?;
                    for child in children.into_iter().rev() {
                        self.node_mut(child)?.add_parent(id);
                        if !entered.contains(&child) {
                            stack.push(Frame::Enter(child, depth + 1));
                        }
                    }
                }
                Frame::Exit(id, depth) => {
                    debug!(node = %id, depth, "visiting node");
                    visitor.visit(self, id, depth).await?;
                }
            }
        }

        Ok(root_id)
    }

    /// [`traverse`](Self::traverse) with a plain closure.
    pub async fn walk<F>(&mut self, root: &Address, keys: &Keys, f: F) -> DagResult<NodeId>
    where
        F: FnMut(&Node, usize) + Send,
    {
        self.traverse(root, keys, &mut FnVisitor(f)).await
    }

    /// Handles for every link target of `id`, in link order, reading the
    /// ones not yet in the arena.
    async fn load_children(&mut self, id: NodeId, keys: &Keys) -> DagResult<Vec<NodeId>> {
        let links: Vec<Address> = self.node(id)?.value().links.values().copied().collect();

        let mut missing = Vec::new();
        for address in &links {
            if self.find(address).is_none() && !missing.contains(address) {
                missing.push(*address);
            }
        }

        let store = self.store().clone();
        let blocks = try_join_all(missing.iter().map(|address| store.read(address, keys))).await?;
        let mut loaded = HashMap::with_capacity(missing.len());
        for (address, block) in missing.into_iter().zip(blocks) {
            loaded.insert(address, self.adopt(block, address));
        }

        links
            .iter()
            .map(|address| {
                self.find(address)
                    .or_else(|| loaded.get(address).copied())
                    .ok_or_else(|| DagError::from(StoreError::NotFound(address.to_string())))
            })
            .collect()
    }
}

struct FnVisitor<F>(F);

#[async_trait]
impl<F> Visitor for FnVisitor<F>
where
    F: FnMut(&Node, usize) + Send,
{
    async fn visit(&mut self, graph: &mut DocumentGraph, node: NodeId, depth: usize) -> DagResult<()> {
        (self.0)(graph.node(node)?, depth);
        Ok(())
    }
}
