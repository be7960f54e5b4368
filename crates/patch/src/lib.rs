//! # Notevault Patch
//!
//! Structural, text-level mutation of documents. A patch target names a
//! location inside one document (heading subtree, block anchor,
//! frontmatter field) and an operation inserts or replaces content
//! there. Everything works on raw text lines, never a re-serialized
//! markdown tree, so regions a patch does not touch come back
//! byte-for-byte identical.

mod engine;
mod error;
mod lines;

pub use engine::{apply_patch, PatchOperation, PatchTarget};
pub use error::{PatchError, Result};
pub use lines::{edit_lines, LineEditMode};
