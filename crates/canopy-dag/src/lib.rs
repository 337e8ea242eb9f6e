//! Content-addressed document graph for Canopy.
//!
//! A [`DocumentGraph`] is an arena of [`Node`]s, each holding one immutable
//! block. Changing a node gives it a new address, which makes every link to
//! it stale; the propagation engine rewrites the ancestors generation by
//! generation until the roots are current again. Traversal walks a stored
//! document in post-order and rebuilds the in-memory parent edges that
//! propagation follows.
//!
//! # Invariants
//!
//! - In a fully propagated graph every parent's link equals its child's
//!   current address.
//! - A deleted node's link is gone from every live parent once propagation
//!   completes.
//! - Parent edges live only in memory and are never persisted.

pub mod copy;
pub mod error;
pub mod graph;
pub mod node;
pub mod ops;
pub mod propagate;
pub mod traverse;

#[cfg(test)]
mod testing;

pub use error::{DagError, DagResult};
pub use graph::DocumentGraph;
pub use node::{Node, NodeId};
pub use traverse::Visitor;
