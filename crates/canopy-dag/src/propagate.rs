//! Generation-batched link propagation.
//!
//! A changed node invalidates the link every parent holds to it. Each round
//! takes the current generation of changed nodes, collects their distinct
//! live parents, patches each parent once with all of its changed children,
//! and persists the whole batch concurrently. The persisted parents become
//! the next generation. The walk ends at parentless roots.

use std::collections::BTreeSet;

use canopy_crypto::Keys;
use canopy_types::Timestamp;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::DagResult;
use crate::graph::DocumentGraph;
use crate::node::NodeId;

impl DocumentGraph {
    /// Rewrite every ancestor of `changed` until the roots are current.
    ///
    /// Returns the number of rounds run. A round commits in memory only once
    /// every parent in it has persisted; on failure no parent in that round
    /// changes and the error is returned.
    pub async fn propagate(&mut self, changed: Vec<NodeId>, keys: &Keys) -> DagResult<usize> {
        let mut generation: BTreeSet<NodeId> = changed.into_iter().collect();
        let mut round = 0;

        loop {
            let parents = self.live_parents(&generation)?;
            if parents.is_empty() {
                break;
            }
            round += 1;

            let now = Timestamp::now();
            let mut staged = Vec::with_capacity(parents.len());
            for &p in &parents {
                let parent = self.node(p)?;
                let mut value = parent.value().clone();
                for &g in &generation {
                    let child = self.node(g)?;
                    if !child.parents().contains(&p) {
                        continue;
                    }
                    match child.address() {
                        Some(address) => {
                            value.set_link(child.name().to_string(), address);
                        }
                        None => {
                            value.remove_link(child.name());
                        }
                    }
                }
                if let Some(previous) = parent.stored_address() {
                    value.set_previous(Some(previous));
                }
                value.touch(now);
                staged.push((p, self.store().encode(value)?));
            }

            let store = self.store().clone();
            let addresses =
                try_join_all(staged.iter().map(|(_, block)| store.persist(block, keys))).await?;

            for ((p, block), address) in staged.into_iter().zip(addresses) {
                self.replace_block(p, block)?;
                self.commit(p, address)?;
                debug!(node = %p, address = %address.short_hex(), "repointed parent");
            }

            info!(
                round,
                generation = generation.len(),
                parents = parents.len(),
                "propagated generation"
            );
            generation = parents;
        }

        Ok(round)
    }

    fn live_parents(&self, generation: &BTreeSet<NodeId>) -> DagResult<BTreeSet<NodeId>> {
        let mut parents = BTreeSet::new();
        for &g in generation {
            for &p in self.node(g)?.parents() {
                if !self.node(p)?.is_tombstoned() {
                    parents.insert(p);
                }
            }
        }
        Ok(parents)
    }
}
