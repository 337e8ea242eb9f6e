//! High-level SDK for Canopy.
//!
//! [`Canopy`] ties a [`DocumentGraph`](canopy_dag::DocumentGraph), its
//! object store and a root registry together for one account. Documents are
//! opened by label and edited by slash-separated link paths; every edit
//! re-publishes the document's new root address.

pub mod canopy;
pub mod error;

pub use canopy::Canopy;
pub use error::{SdkError, SdkResult};

pub use canopy_crypto::Keys;
pub use canopy_dag::{Node, NodeId};
pub use canopy_types::{Address, Fields, NodeValue};
