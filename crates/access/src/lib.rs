//! # Notevault Access
//!
//! Path-level access control for the vault: gitignore-style exclusion
//! rules loaded from `.mcpignore`, plus the gate every read and write
//! passes through (exclusion check, path normalization, global
//! read-only mode).

mod error;
mod gate;
mod ignore;

pub use error::{AccessError, Result};
pub use gate::AccessGate;
pub use ignore::{IgnoreRules, IGNORE_FILE};
