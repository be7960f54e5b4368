//! Prompt catalog. Notes under the vault's `prompts/` directory form
//! the catalog: the frontmatter `description` field (when present)
//! becomes the prompt description, the text below frontmatter is the
//! prompt body.

use std::sync::Arc;

use async_trait::async_trait;

use notevault_access::AccessGate;
use notevault_note::{DocumentMetadata, DocumentParse, VaultStore};

use crate::protocol::{ErrorCode, ErrorPayload};
use crate::registry::{PromptBody, PromptEntry, PromptProvider};

const PROMPT_DIR: &str = "prompts/";

pub struct VaultPrompts {
    store: Arc<dyn VaultStore>,
    gate: Arc<AccessGate>,
}

impl VaultPrompts {
    pub fn new(store: Arc<dyn VaultStore>, gate: Arc<AccessGate>) -> Self {
        Self { store, gate }
    }

    fn prompt_name(path: &str) -> Option<&str> {
        path.strip_prefix(PROMPT_DIR)?.strip_suffix(".md")
    }

    fn prompt_path(name: &str) -> String {
        format!("{PROMPT_DIR}{name}.md")
    }
}

#[async_trait]
impl PromptProvider for VaultPrompts {
    async fn list(&self) -> Result<Vec<PromptEntry>, ErrorPayload> {
        let paths = self.store.list().await.map_err(ErrorPayload::from)?;
        let mut entries = Vec::new();
        for path in paths {
            let Some(name) = Self::prompt_name(&path) else {
                continue;
            };
            if !self.gate.is_accessible(&path) {
                continue;
            }
            // Low-priority scan read; a prompt with unreadable content
            // still lists, without a description.
            let description = match self.store.cached_read(&path).await {
                Ok(text) => DocumentMetadata::of(&text)
                    .field("description")
                    .map(str::to_string),
                Err(_) => None,
            };
            entries.push(PromptEntry {
                name: name.to_string(),
                description,
            });
        }
        Ok(entries)
    }

    async fn get(&self, name: &str) -> Result<PromptBody, ErrorPayload> {
        let path = Self::prompt_path(name);
        let normalized = self.gate.validate_read(&path)?;
        let text = self.store.read(&normalized).await.map_err(|err| {
            if matches!(err, notevault_note::StoreError::NotFound(_)) {
                ErrorPayload::new(ErrorCode::NotFound, format!("unknown prompt: {name}"))
            } else {
                ErrorPayload::from(err)
            }
        })?;

        let description = DocumentMetadata::of(&text)
            .field("description")
            .map(str::to_string);
        let body = match DocumentParse::of(&text).frontmatter {
            Some(fm) => text
                .lines()
                .skip(fm.close_line + 1)
                .collect::<Vec<_>>()
                .join("\n"),
            None => text.trim_end().to_string(),
        };
        Ok(PromptBody {
            description,
            text: body.trim_start_matches('\n').to_string(),
        })
    }
}
