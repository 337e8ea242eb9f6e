//! Re-keying copy of a whole document.

use std::collections::HashMap;

use async_trait::async_trait;
use canopy_crypto::Keys;
use canopy_types::{Address, Timestamp};
use tracing::info;

use crate::error::{DagError, DagResult};
use crate::graph::DocumentGraph;
use crate::node::NodeId;
use crate::traverse::Visitor;

/// Re-persists each visited node under new keys, relinking to the copies.
struct CopyVisitor<'k> {
    keys: &'k Keys,
    copies: HashMap<Address, Address>,
}

#[async_trait]
impl<'k> Visitor for CopyVisitor<'k> {
    async fn visit(&mut self, graph: &mut DocumentGraph, node: NodeId, _depth: usize) -> DagResult<()> {
        let source = graph.node(node)?;
        let original = graph.address_of(node)?;

        let mut value = source.value().clone();
        for target in value.links.values_mut() {
            *target = *self
                .copies
                .get(target)
                .ok_or(DagError::UncopiedLink(*target))?;
        }
        value.previous = None;
        value.touch(Timestamp::now());

        let store = graph.store().clone();
        let block = store.encode(value)?;
        let copied = store.persist(&block, self.keys).await?;
        self.copies.insert(original, copied);
        Ok(())
    }
}

impl DocumentGraph {
    /// Copy the document below `root`, read with `from`, into new blocks
    /// locked with `to`. Returns the copy's root address.
    ///
    /// The copy starts a fresh version history and adds nothing to the
    /// arena beyond what the traversal itself reads.
    pub async fn copy(&mut self, root: &Address, from: &Keys, to: &Keys) -> DagResult<Address> {
        let mut visitor = CopyVisitor {
            keys: to,
            copies: HashMap::new(),
        };
        let root_id = self.traverse(root, from, &mut visitor).await?;
        let original = self.address_of(root_id)?;
        let copied = visitor
            .copies
            .get(&original)
            .copied()
            .ok_or(DagError::UncopiedLink(original))?;
        info!(
            from = %original.short_hex(),
            to = %copied.short_hex(),
            nodes = visitor.copies.len(),
            "copied document"
        );
        Ok(copied)
    }
}

#[cfg(test)]
mod tests {
    use canopy_crypto::SymmetricKey;
    use canopy_types::NodeValue;

    use crate::testing::graph;

    use super::*;

    async fn document(g: &mut DocumentGraph, keys: &Keys) -> Address {
        let leaf = g.create(NodeValue::new("leaf").with_field("secret", "42")).unwrap();
        let dir = g.create(NodeValue::new("dir")).unwrap();
        let root = g.create(NodeValue::new("root")).unwrap();
        g.insert(dir, &[leaf], keys).await.unwrap();
        g.insert(root, &[dir], keys).await.unwrap();
        g.address_of(root).unwrap()
    }

    #[tokio::test]
    async fn rekeyed_copy_reads_with_new_keys() {
        let (_, mut g) = graph();
        let old = Keys::shared(SymmetricKey::generate());
        let new = Keys::shared(SymmetricKey::generate());
        let root = document(&mut g, &old).await;

        let copied = g.copy(&root, &old, &new).await.unwrap();
        assert_ne!(copied, root);

        g.store().set_cache_reads(false);
        let mut fresh = DocumentGraph::new(g.store().clone());
        let mut secrets = Vec::new();
        fresh
            .walk(&copied, &new, |node, _| {
                if let Some(v) = node.value().field("secret") {
                    secrets.push(v.clone());
                }
            })
            .await
            .unwrap();
        assert_eq!(secrets, vec![serde_json::json!("42")]);

        let err = DocumentGraph::new(g.store().clone())
            .walk(&copied, &old, |_, _| {})
            .await
            .unwrap_err();
        assert!(matches!(err, DagError::Store(canopy_store::StoreError::Decryption(_))));
    }

    #[tokio::test]
    async fn copy_leaves_source_untouched() {
        let (_, mut g) = graph();
        let root = document(&mut g, &Keys::None).await;
        let before = g.len();

        let copied = g.copy(&root, &Keys::None, &Keys::None).await.unwrap();

        assert_eq!(g.len(), before);
        assert_eq!(g.find(&root).map(|id| g.address_of(id).unwrap()), Some(root));
        assert!(g.find(&copied).is_none());
    }

    #[tokio::test]
    async fn plaintext_copy_links_to_copied_children() {
        let (_, mut g) = graph();
        let root = document(&mut g, &Keys::None).await;
        let copied = g.copy(&root, &Keys::None, &Keys::None).await.unwrap();

        let mut other = DocumentGraph::new(g.store().clone());
        let copy_root = other.read(&copied, &Keys::None).await.unwrap();
        let value = other.node(copy_root).unwrap().value().clone();
        assert!(value.previous.is_none());
        let original = g.node(g.find(&root).unwrap()).unwrap().value().link("dir").copied();
        assert!(value.link("dir").is_some());
        assert_ne!(value.link("dir").copied(), original);
    }
}
