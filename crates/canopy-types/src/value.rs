//! The tagged node value.
//!
//! A [`NodeValue`] keeps scalar data, child links and the version link in
//! separate slots, so whether an entry is a structural edge is decided by
//! the type rather than by how its key is spelled.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::temporal::Timestamp;

/// A scalar (or nested, but never link-bearing) field value.
pub type FieldValue = serde_json::Value;

/// Named scalar fields, kept sorted for deterministic encoding.
pub type Fields = BTreeMap<String, FieldValue>;

/// Named child links, kept sorted for deterministic encoding.
pub type Links = BTreeMap<String, Address>;

/// The logical value of a document node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeValue {
    /// Logical name. Parents record this node's link under this name.
    pub name: String,
    /// Scalar fields.
    #[serde(default)]
    pub fields: Fields,
    /// Structural child edges: link name to the child's current address.
    #[serde(default)]
    pub links: Links,
    /// The node's own immediately-previous address. Never a child edge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Address>,
    /// When the node was first created.
    pub created_at: Timestamp,
    /// When the node's fields or links last changed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<Timestamp>,
}

impl NodeValue {
    /// A fresh, empty value created now.
    pub fn new(name: impl Into<String>) -> Self {
        Self::at(name, Timestamp::now())
    }

    /// A fresh, empty value with an explicit creation time.
    pub fn at(name: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            name: name.into(),
            fields: Fields::new(),
            links: Links::new(),
            previous: None,
            created_at,
            modified_at: None,
        }
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style link setter.
    pub fn with_link(mut self, name: impl Into<String>, target: Address) -> Self {
        self.links.insert(name.into(), target);
        self
    }

    /// Look up a field.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Look up a child link.
    pub fn link(&self, name: &str) -> Option<&Address> {
        self.links.get(name)
    }

    /// Point the link `name` at `target`, returning the previous target.
    pub fn set_link(&mut self, name: impl Into<String>, target: Address) -> Option<Address> {
        self.links.insert(name.into(), target)
    }

    /// Drop the link `name`, returning its target if it existed.
    pub fn remove_link(&mut self, name: &str) -> Option<Address> {
        self.links.remove(name)
    }

    /// Replace the scalar fields wholesale.
    ///
    /// Fields absent from `patch` are dropped; fields present are kept or
    /// overwritten; new fields are added. Links and the version link are
    /// structural and untouched.
    pub fn replace_fields(&mut self, patch: Fields) {
        self.fields = patch;
    }

    /// Record `at` as the last modification time.
    pub fn touch(&mut self, at: Timestamp) {
        self.modified_at = Some(at);
    }

    /// Record the node's pre-mutation address as its version link.
    pub fn set_previous(&mut self, previous: Option<Address>) {
        self.previous = previous;
    }

    /// Returns `true` if the value has no child links.
    pub fn is_leaf(&self) -> bool {
        self.links.is_empty()
    }
}
