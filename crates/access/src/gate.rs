use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::error::{AccessError, Result};
use crate::ignore::{IgnoreRules, IGNORE_FILE};

/// The gate every vault read and write passes through.
///
/// One instance is shared by all sessions; the read-only flag and the
/// ignore rules are process-wide and visible immediately after a
/// change. Owned explicitly and passed by `Arc` into operations so the
/// policy is testable in isolation.
#[derive(Debug)]
pub struct AccessGate {
    rules: RwLock<IgnoreRules>,
    read_only: AtomicBool,
}

impl AccessGate {
    pub fn new(rules: IgnoreRules, read_only: bool) -> Self {
        Self {
            rules: RwLock::new(rules),
            read_only: AtomicBool::new(read_only),
        }
    }

    /// Swap in a freshly parsed rule set. Explicit operation; there is
    /// no automatic reload on file change.
    pub fn reload(&self, rules: IgnoreRules) {
        let count = rules.len();
        *self.rules.write().expect("ignore rules lock poisoned") = rules;
        log::info!("ignore rules reloaded ({count} patterns)");
    }

    pub fn set_read_only(&self, value: bool) {
        self.read_only.store(value, Ordering::SeqCst);
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }

    /// Authorize a read. Returns the normalized path.
    pub fn validate_read(&self, path: &str) -> Result<String> {
        let normalized = normalize_path(path)?;
        if self.excluded(&normalized) {
            return Err(AccessError::Denied(normalized));
        }
        Ok(normalized)
    }

    /// Authorize a write. Checked before any mutation is attempted so a
    /// denied write never partially executes. The ignore file itself is
    /// write-protected even when the engine is otherwise disabled.
    pub fn validate_write(&self, path: &str) -> Result<String> {
        if self.is_read_only() {
            return Err(AccessError::ReadOnly);
        }
        let normalized = normalize_path(path)?;
        if normalized == IGNORE_FILE || self.excluded(&normalized) {
            return Err(AccessError::Denied(normalized));
        }
        Ok(normalized)
    }

    /// Non-throwing probe used when listing/filtering.
    pub fn is_accessible(&self, path: &str) -> bool {
        match normalize_path(path) {
            Ok(normalized) => !self.excluded(&normalized),
            Err(_) => false,
        }
    }

    fn excluded(&self, normalized: &str) -> bool {
        self.rules
            .read()
            .expect("ignore rules lock poisoned")
            .is_excluded(normalized)
    }
}

/// Normalize a slash-delimited vault path: strip a leading `/`, drop
/// `.` segments, reject empties and `..` traversal.
fn normalize_path(path: &str) -> Result<String> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(AccessError::InvalidPath("empty path".into()));
    }

    let mut segments = Vec::new();
    for segment in trimmed.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                return Err(AccessError::InvalidPath(format!(
                    "path traversal not allowed: {trimmed}"
                )))
            }
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(AccessError::InvalidPath("empty path".into()));
    }
    Ok(segments.join("/"))
}
