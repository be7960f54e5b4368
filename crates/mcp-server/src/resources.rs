//! Read-only resource endpoints: every accessible note is exposed as a
//! `note:///<path>` resource with a markdown body.

use std::sync::Arc;

use async_trait::async_trait;

use notevault_access::AccessGate;
use notevault_note::VaultStore;

use crate::protocol::{ErrorCode, ErrorPayload};
use crate::registry::{ResourceBody, ResourceEntry, ResourceProvider};

const URI_SCHEME: &str = "note:///";
const MIME_MARKDOWN: &str = "text/markdown";

pub struct VaultResources {
    store: Arc<dyn VaultStore>,
    gate: Arc<AccessGate>,
}

impl VaultResources {
    pub fn new(store: Arc<dyn VaultStore>, gate: Arc<AccessGate>) -> Self {
        Self { store, gate }
    }
}

#[async_trait]
impl ResourceProvider for VaultResources {
    async fn list(&self) -> Result<Vec<ResourceEntry>, ErrorPayload> {
        let paths = self.store.list().await.map_err(ErrorPayload::from)?;
        Ok(paths
            .into_iter()
            .filter(|path| self.gate.is_accessible(path))
            .map(|path| ResourceEntry {
                uri: format!("{URI_SCHEME}{path}"),
                name: path,
                mime_type: MIME_MARKDOWN.to_string(),
            })
            .collect())
    }

    async fn read(&self, uri: &str) -> Result<ResourceBody, ErrorPayload> {
        let path = uri.strip_prefix(URI_SCHEME).ok_or_else(|| {
            ErrorPayload::new(ErrorCode::Validation, format!("unsupported resource URI: {uri}"))
        })?;
        let normalized = self.gate.validate_read(path)?;
        let text = self.store.read(&normalized).await?;
        Ok(ResourceBody {
            uri: uri.to_string(),
            mime_type: MIME_MARKDOWN.to_string(),
            text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notevault_access::IgnoreRules;
    use notevault_note::MemoryVault;

    fn fixture() -> VaultResources {
        let vault = MemoryVault::new();
        let gate = AccessGate::new(IgnoreRules::parse("private/\n"), false);
        VaultResources::new(Arc::new(vault.clone()), Arc::new(gate))
    }

    #[tokio::test]
    async fn excluded_notes_are_not_listed() {
        let store = MemoryVault::new();
        store.insert("open.md", "hello").await;
        store.insert("private/diary.md", "secret").await;
        let gate = AccessGate::new(IgnoreRules::parse("private/\n"), false);
        let resources = VaultResources::new(Arc::new(store), Arc::new(gate));

        let listed = resources.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].uri, "note:///open.md");
        assert_eq!(listed[0].mime_type, "text/markdown");
    }

    #[tokio::test]
    async fn read_rejects_foreign_scheme_and_excluded_paths() {
        let resources = fixture();
        let err = resources.read("file:///etc/passwd").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);

        let err = resources.read("note:///private/diary.md").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::AccessDenied);
    }
}
