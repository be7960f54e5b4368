//! Shared operation registries. One registry instance is built at
//! startup and shared read-only by every session; sessions hold no
//! private copies.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::protocol::ErrorPayload;

/// One invocable tool.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload>;
}

pub struct ToolDef {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub handler: Arc<dyn ToolHandler>,
}

#[derive(Debug, Clone)]
pub struct ResourceEntry {
    pub uri: String,
    pub name: String,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct ResourceBody {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Read-only endpoints returning a MIME-typed body.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    async fn list(&self) -> Result<Vec<ResourceEntry>, ErrorPayload>;
    async fn read(&self, uri: &str) -> Result<ResourceBody, ErrorPayload>;
}

#[derive(Debug, Clone)]
pub struct PromptEntry {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PromptBody {
    pub description: Option<String>,
    pub text: String,
}

#[async_trait]
pub trait PromptProvider: Send + Sync {
    async fn list(&self) -> Result<Vec<PromptEntry>, ErrorPayload>;
    async fn get(&self, name: &str) -> Result<PromptBody, ErrorPayload>;
}

pub struct Registry {
    tools: Vec<ToolDef>,
    resources: Arc<dyn ResourceProvider>,
    prompts: Arc<dyn PromptProvider>,
}

impl Registry {
    pub fn new(
        tools: Vec<ToolDef>,
        resources: Arc<dyn ResourceProvider>,
        prompts: Arc<dyn PromptProvider>,
    ) -> Self {
        Self {
            tools,
            resources,
            prompts,
        }
    }

    pub fn tools(&self) -> &[ToolDef] {
        &self.tools
    }

    pub fn tool(&self, name: &str) -> Option<&ToolDef> {
        self.tools.iter().find(|t| t.name == name)
    }

    pub fn resources(&self) -> &dyn ResourceProvider {
        self.resources.as_ref()
    }

    pub fn prompts(&self) -> &dyn PromptProvider {
        self.prompts.as_ref()
    }
}
