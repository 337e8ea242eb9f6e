//! Block storage for Canopy.
//!
//! Every node value is encoded into an immutable [`Block`] whose [`Address`]
//! is the codec-domain-separated hash of its bytes. The [`ObjectStore`]
//! moves blocks to and from a [`RemoteProvider`], passing them through the
//! crypto gate and keeping recently written blocks in a [`BoundedCache`].
//!
//! # Remotes
//!
//! - [`InMemoryRemote`] -- `HashMap`-based remote for tests and embedding
//! - [`FsRemote`] -- one file per object under a directory
//!
//! # Rules
//!
//! 1. Bytes fetched from a remote are re-hashed before they are trusted.
//! 2. Addresses are computed over plaintext; locked blocks are stored under
//!    the address of their ciphertext.
//! 3. The cache is promoted on write only.
//!
//! [`Address`]: canopy_types::Address

pub mod block;
pub mod cache;
pub mod config;
pub mod error;
pub mod fs;
pub mod memory;
pub mod remote;
pub mod store;

pub use block::{decode_value, encode_value, Block, RawBlock};
pub use cache::BoundedCache;
pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use fs::FsRemote;
pub use memory::InMemoryRemote;
pub use remote::RemoteProvider;
pub use store::ObjectStore;
