use std::sync::Arc;

use canopy_crypto::{DerivedKeys, Keys};
use canopy_dag::{DocumentGraph, Node, NodeId};
use canopy_refs::{validate_account, validate_label, InMemoryRootRegistry, RootRegistry};
use canopy_store::{InMemoryRemote, ObjectStore};
use canopy_types::{Address, Fields, NodeValue};
use tracing::{debug, info};

use crate::error::{SdkError, SdkResult};

/// The document currently open for editing.
struct Attached {
    label: String,
    root: NodeId,
    keys: Keys,
}

/// High-level Canopy API for one account.
pub struct Canopy {
    account: String,
    graph: DocumentGraph,
    registry: Arc<dyn RootRegistry>,
    attached: Option<Attached>,
}

impl Canopy {
    pub fn new(
        store: Arc<ObjectStore>,
        registry: Arc<dyn RootRegistry>,
        account: impl Into<String>,
    ) -> SdkResult<Self> {
        let account = account.into();
        validate_account(&account)?;
        Ok(Self {
            account,
            graph: DocumentGraph::new(store),
            registry,
            attached: None,
        })
    }

    /// A session for the account owned by `identity`.
    pub fn for_identity(
        store: Arc<ObjectStore>,
        registry: Arc<dyn RootRegistry>,
        identity: &DerivedKeys,
    ) -> SdkResult<Self> {
        Self::new(store, registry, identity.account_id())
    }

    /// A session over an in-memory remote and registry.
    pub fn in_memory(account: impl Into<String>) -> SdkResult<Self> {
        let store = Arc::new(ObjectStore::new(Arc::new(InMemoryRemote::new())));
        Self::new(store, Arc::new(InMemoryRootRegistry::new()), account)
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn graph(&self) -> &DocumentGraph {
        &self.graph
    }

    pub fn store(&self) -> &Arc<ObjectStore> {
        self.graph.store()
    }

    pub fn registry(&self) -> &Arc<dyn RootRegistry> {
        &self.registry
    }

    /// Label of the open document.
    pub fn label(&self) -> Option<&str> {
        self.attached.as_ref().map(|a| a.label.as_str())
    }

    /// Root node of the open document.
    pub fn root(&self) -> SdkResult<NodeId> {
        self.attached
            .as_ref()
            .map(|a| a.root)
            .ok_or(SdkError::NotAttached)
    }

    pub fn root_address(&self) -> SdkResult<Address> {
        Ok(self.graph.address_of(self.root()?)?)
    }

    // ---- Documents ----

    /// Open the document published under `label`, or start an empty one.
    ///
    /// An existing document is traversed in full so that later edits
    /// propagate to its root. A new document is a single node named after
    /// the label, persisted and published straight away.
    pub async fn open_root(&mut self, label: &str, keys: Keys) -> SdkResult<NodeId> {
        validate_label(label)?;
        let root = match self.registry.resolve(&self.account, label).await? {
            Some(address) => {
                let root = self.graph.walk(&address, &keys, |_, _| {}).await?;
                info!(label, root = %address.short_hex(), "opened document");
                root
            }
            None => {
                let root = self.graph.create(NodeValue::new(label))?;
                let address = self.graph.persist(root, &keys).await?;
                self.registry.publish(&self.account, label, address).await?;
                info!(label, root = %address.short_hex(), "created document");
                root
            }
        };
        self.attached = Some(Attached {
            label: label.to_string(),
            root,
            keys,
        });
        Ok(root)
    }

    /// Publish `node`'s current address under `label`.
    pub async fn publish(&self, label: &str, node: NodeId) -> SdkResult<Address> {
        let address = self.graph.address_of(node)?;
        let previous = self.registry.publish(&self.account, label, address).await?;
        debug!(
            label,
            root = %address.short_hex(),
            replaced = previous.is_some(),
            "published root"
        );
        Ok(address)
    }

    /// Copy the open document under new keys and publish the copy as `label`.
    pub async fn copy_to(&mut self, label: &str, keys: &Keys) -> SdkResult<Address> {
        let attached = self.attached.as_ref().ok_or(SdkError::NotAttached)?;
        let source = self.graph.address_of(attached.root)?;
        let copied = self.graph.copy(&source, &attached.keys, keys).await?;
        self.registry.publish(&self.account, label, copied).await?;
        Ok(copied)
    }

    // ---- Paths ----

    /// Follow the slash-separated link names in `path` from `root`.
    ///
    /// Empty segments are skipped, so `""` and `"/"` name `root` itself.
    pub fn node_at(&self, root: NodeId, path: &str) -> SdkResult<NodeId> {
        let mut current = root;
        for segment in segments(path) {
            current = self
                .graph
                .child(current, segment)?
                .ok_or_else(|| SdkError::PathNotFound(path.to_string()))?;
        }
        Ok(current)
    }

    /// The node at `path` in the open document.
    pub fn get(&self, path: &str) -> SdkResult<&Node> {
        let id = self.node_at(self.root()?, path)?;
        Ok(self.graph.node(id)?)
    }

    // ---- Edits ----

    /// Link a new node under the node at `path`.
    pub async fn add(&mut self, path: &str, value: NodeValue) -> SdkResult<NodeId> {
        let parent = self.node_at(self.root()?, path)?;
        if self.graph.node(parent)?.value().link(&value.name).is_some() {
            return Err(SdkError::InvalidOperation(format!(
                "{path:?} already links {:?}",
                value.name
            )));
        }

        let attached = self.attached.as_ref().ok_or(SdkError::NotAttached)?;
        let child = self.graph.create(value)?;
        self.graph.insert(parent, &[child], &attached.keys).await?;
        self.republish().await?;
        Ok(child)
    }

    /// Replace the fields of the node at `path`.
    pub async fn set(&mut self, path: &str, fields: Fields) -> SdkResult<Address> {
        let node = self.node_at(self.root()?, path)?;
        let attached = self.attached.as_ref().ok_or(SdkError::NotAttached)?;
        let address = self.graph.update(node, fields, &attached.keys).await?;
        self.republish().await?;
        Ok(address)
    }

    /// Delete the node at `path`. Its children stay stored.
    pub async fn remove(&mut self, path: &str) -> SdkResult<()> {
        let root = self.root()?;
        let node = self.node_at(root, path)?;
        if node == root {
            return Err(SdkError::InvalidOperation(
                "the root of an open document cannot be removed".into(),
            ));
        }
        let attached = self.attached.as_ref().ok_or(SdkError::NotAttached)?;
        self.graph.delete(node, &attached.keys).await?;
        self.republish().await?;
        Ok(())
    }

    async fn republish(&self) -> SdkResult<Address> {
        let attached = self.attached.as_ref().ok_or(SdkError::NotAttached)?;
        let address = self.graph.address_of(attached.root)?;
        self.registry
            .publish(&self.account, &attached.label, address)
            .await?;
        debug!(label = %attached.label, root = %address.short_hex(), "republished root");
        Ok(address)
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use canopy_crypto::SymmetricKey;
    use canopy_types::Timestamp;
    use serde_json::json;

    use super::*;

    const ACCOUNT: &str = "alice";

    fn shared() -> (Arc<ObjectStore>, Arc<InMemoryRootRegistry>) {
        (
            Arc::new(ObjectStore::new(Arc::new(InMemoryRemote::new()))),
            Arc::new(InMemoryRootRegistry::new()),
        )
    }

    fn fields(pairs: &[(&str, serde_json::Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    async fn published(canopy: &Canopy, label: &str) -> Option<Address> {
        canopy.registry().resolve(ACCOUNT, label).await.unwrap()
    }

    #[tokio::test]
    async fn open_creates_and_publishes_empty_document() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        let root = canopy.open_root("notes", Keys::None).await.unwrap();

        assert_eq!(canopy.label(), Some("notes"));
        assert_eq!(canopy.graph().node(root).unwrap().name(), "notes");
        assert_eq!(published(&canopy, "notes").await, Some(canopy.root_address().unwrap()));
    }

    #[tokio::test]
    async fn edits_republish_root() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        canopy.open_root("notes", Keys::None).await.unwrap();
        let first = canopy.root_address().unwrap();

        canopy.add("", NodeValue::new("inbox")).await.unwrap();
        canopy
            .add("/inbox", NodeValue::new("todo").with_field("done", false))
            .await
            .unwrap();

        let current = canopy.root_address().unwrap();
        assert_ne!(current, first);
        assert_eq!(published(&canopy, "notes").await, Some(current));
        assert_eq!(
            canopy.get("inbox/todo").unwrap().value().field("done"),
            Some(&json!(false))
        );
    }

    #[tokio::test]
    async fn reopen_sees_nested_edits() {
        let (store, registry) = shared();
        let keys = Keys::shared(SymmetricKey::generate());

        let mut writer = Canopy::new(store.clone(), registry.clone(), ACCOUNT).unwrap();
        writer.open_root("notes", keys.clone()).await.unwrap();
        writer.add("", NodeValue::new("inbox")).await.unwrap();
        writer
            .add("inbox", NodeValue::new("todo").with_field("title", "milk"))
            .await
            .unwrap();
        writer
            .set("inbox/todo", fields(&[("title", json!("bread"))]))
            .await
            .unwrap();

        let mut reader = Canopy::new(store, registry, ACCOUNT).unwrap();
        reader.open_root("notes", keys).await.unwrap();
        let todo = reader.get("inbox/todo").unwrap();
        assert_eq!(todo.value().field("title"), Some(&json!("bread")));
        assert!(todo.value().previous.is_some());

        // Edits through a reopened document still reach the root.
        reader.add("inbox", NodeValue::new("later")).await.unwrap();
        assert!(reader.get("inbox/later").is_ok());
        assert_eq!(
            published(&reader, "notes").await,
            Some(reader.root_address().unwrap())
        );
    }

    #[tokio::test]
    async fn remove_drops_path() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        canopy.open_root("notes", Keys::None).await.unwrap();
        canopy.add("", NodeValue::new("inbox")).await.unwrap();
        canopy.add("inbox", NodeValue::new("todo")).await.unwrap();

        canopy.remove("inbox/todo").await.unwrap();

        assert!(matches!(
            canopy.get("inbox/todo"),
            Err(SdkError::PathNotFound(_))
        ));
        assert!(canopy.get("inbox").unwrap().value().is_leaf());
        assert_eq!(
            published(&canopy, "notes").await,
            Some(canopy.root_address().unwrap())
        );
    }

    #[tokio::test]
    async fn identical_nodes_under_different_paths_edit_independently() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        canopy.open_root("notes", Keys::None).await.unwrap();
        canopy.add("", NodeValue::new("a")).await.unwrap();
        canopy.add("", NodeValue::new("b")).await.unwrap();
        let at = Timestamp::from_millis(5);
        canopy.add("a", NodeValue::at("x", at)).await.unwrap();
        canopy.add("b", NodeValue::at("x", at)).await.unwrap();

        canopy.set("a/x", fields(&[("v", json!(1))])).await.unwrap();

        assert_eq!(canopy.get("a/x").unwrap().value().field("v"), Some(&json!(1)));
        assert_eq!(canopy.get("b/x").unwrap().value().field("v"), None);
    }

    #[tokio::test]
    async fn root_cannot_be_removed() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        canopy.open_root("notes", Keys::None).await.unwrap();
        let err = canopy.remove("/").await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn duplicate_name_rejected() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        canopy.open_root("notes", Keys::None).await.unwrap();
        canopy.add("", NodeValue::new("inbox")).await.unwrap();
        let err = canopy.add("", NodeValue::new("inbox")).await.unwrap_err();
        assert!(matches!(err, SdkError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn edits_need_an_open_document() {
        let mut canopy = Canopy::in_memory(ACCOUNT).unwrap();
        let err = canopy.add("", NodeValue::new("x")).await.unwrap_err();
        assert!(matches!(err, SdkError::NotAttached));
    }

    #[tokio::test]
    async fn copy_to_publishes_rekeyed_document() {
        let (store, registry) = shared();
        let old = Keys::shared(SymmetricKey::generate());
        let new = Keys::shared(SymmetricKey::generate());

        let mut canopy = Canopy::new(store.clone(), registry.clone(), ACCOUNT).unwrap();
        canopy.open_root("notes", old).await.unwrap();
        canopy
            .add("", NodeValue::new("secret").with_field("pin", 1234))
            .await
            .unwrap();
        let copied = canopy.copy_to("notes-for-bob", &new).await.unwrap();
        assert_eq!(published(&canopy, "notes-for-bob").await, Some(copied));

        store.set_cache_reads(false);
        let mut reader = Canopy::new(store, registry, ACCOUNT).unwrap();
        reader.open_root("notes-for-bob", new).await.unwrap();
        assert_eq!(
            reader.get("secret").unwrap().value().field("pin"),
            Some(&json!(1234))
        );
    }

    #[tokio::test]
    async fn identity_sessions_share_account_and_keys() {
        let (store, registry) = shared();
        let identity = DerivedKeys::from_signature(b"wallet signature");

        let mut first = Canopy::for_identity(store.clone(), registry.clone(), &identity).unwrap();
        first.open_root("diary", identity.for_self()).await.unwrap();
        first
            .add("", NodeValue::new("day-1").with_field("mood", "ok"))
            .await
            .unwrap();

        let again = DerivedKeys::from_signature(b"wallet signature");
        store.set_cache_reads(false);
        let mut second = Canopy::for_identity(store, registry.clone(), &again).unwrap();
        assert_eq!(second.account(), identity.account_id());
        second.open_root("diary", again.for_self()).await.unwrap();
        assert_eq!(
            second.get("day-1").unwrap().value().field("mood"),
            Some(&json!("ok"))
        );
        assert_eq!(registry.resolve(ACCOUNT, "diary").await.unwrap(), None);
    }

    #[test]
    fn invalid_account_rejected() {
        assert!(Canopy::in_memory("not valid").is_err());
    }
}
