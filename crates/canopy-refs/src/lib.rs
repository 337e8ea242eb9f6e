//! Root registry for Canopy.
//!
//! The document graph is content-addressed and keeps no directory, so every
//! change to a document yields a new root address that readers cannot guess.
//! The registry maps an account and a human-readable label to the current
//! root address of a document.
//!
//! # Modules
//!
//! - [`error`] -- Error types for registry operations
//! - [`types`] -- [`PublishedRoot`]
//! - [`traits`] -- The [`RootRegistry`] trait
//! - [`names`] -- Label and account validation
//! - [`memory`] -- In-memory [`InMemoryRootRegistry`] for tests
//! - [`file`] -- JSON-file [`FileRootRegistry`]

pub mod error;
pub mod file;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RegistryError, Result};
pub use file::FileRootRegistry;
pub use memory::InMemoryRootRegistry;
pub use names::{validate_account, validate_label};
pub use traits::RootRegistry;
pub use types::PublishedRoot;
