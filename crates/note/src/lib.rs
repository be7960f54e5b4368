//! # Notevault Note
//!
//! Document model for the vault: the structural parse (frontmatter,
//! heading tree, block anchors) recomputed from raw text on each
//! access, the collaborator traits the core consumes (store, query
//! engine), and the filesystem / in-memory store implementations.

mod error;
mod metadata;
mod parse;
mod query;
mod store;

pub use error::{Result, StoreError};
pub use metadata::DocumentMetadata;
pub use parse::{BlockAnchor, DocumentParse, Frontmatter, Heading, FRONTMATTER_DELIMITER};
pub use query::{QueryEngine, QueryOutcome};
pub use store::{FsVault, MemoryVault, VaultStore};
