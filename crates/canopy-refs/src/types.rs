//! Registry entry types.

use canopy_types::{Address, Timestamp};
use serde::{Deserialize, Serialize};

/// A root address published under a label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedRoot {
    pub label: String,
    pub address: Address,
    pub published_at: Timestamp,
}

impl PublishedRoot {
    pub fn new(label: impl Into<String>, address: Address) -> Self {
        Self {
            label: label.into(),
            address,
            published_at: Timestamp::now(),
        }
    }
}
