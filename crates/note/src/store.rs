use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use walkdir::WalkDir;

use crate::error::{Result, StoreError};

/// The document store the core reads and writes through. File I/O
/// details (trash semantics, caches) live behind this seam.
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Read a document's raw text.
    async fn read(&self, path: &str) -> Result<String>;

    /// Low-priority read for background scans. Defaults to `read`.
    async fn cached_read(&self, path: &str) -> Result<String> {
        self.read(path).await
    }

    /// Replace a document's content wholesale, creating it if absent.
    async fn modify(&self, path: &str, content: &str) -> Result<()>;

    async fn exists(&self, path: &str) -> bool;

    /// All document paths, slash-delimited, relative to the root.
    async fn list(&self) -> Result<Vec<String>>;
}

/// Filesystem-backed vault rooted at one directory. Documents are the
/// `.md` files beneath the root (plus the ignore rule file, which the
/// access gate keeps out of reach).
pub struct FsVault {
    root: PathBuf,
}

impl FsVault {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }
}

#[async_trait]
impl VaultStore for FsVault {
    async fn read(&self, path: &str) -> Result<String> {
        let full = self.resolve(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(text),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn modify(&self, path: &str, content: &str) -> Result<()> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, content).await?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::try_exists(self.resolve(path)).await.unwrap_or(false)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || {
            let mut paths = Vec::new();
            for entry in WalkDir::new(&root).into_iter().filter_map(|e| e.ok()) {
                if !entry.file_type().is_file() {
                    continue;
                }
                if entry.path().extension().and_then(|e| e.to_str()) != Some("md") {
                    continue;
                }
                if let Ok(rel) = entry.path().strip_prefix(&root) {
                    paths.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
            paths.sort();
            Ok(paths)
        })
        .await
        .map_err(|err| StoreError::Other(format!("list task failed: {err}")))?
    }
}

/// In-memory vault for tests and embedding.
#[derive(Default, Clone)]
pub struct MemoryVault {
    docs: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, path: &str, content: &str) {
        self.docs
            .write()
            .await
            .insert(path.to_string(), content.to_string());
    }
}

#[async_trait]
impl VaultStore for MemoryVault {
    async fn read(&self, path: &str) -> Result<String> {
        self.docs
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(path.to_string()))
    }

    async fn modify(&self, path: &str, content: &str) -> Result<()> {
        self.docs
            .write()
            .await
            .insert(path.to_string(), content.to_string());
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        self.docs.read().await.contains_key(path)
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut paths: Vec<String> = self.docs.read().await.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }
}
