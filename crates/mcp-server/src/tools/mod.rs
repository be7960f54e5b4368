//! The externally invocable operations. Each tool validates access
//! first, reads through the store, computes the full new content, and
//! only then persists — so a failure at any stage leaves the stored
//! document byte-identical to before the call.
//!
//! There is no per-path mutation lock: two edits of one document can
//! interleave at store await points (read-modify-write), matching the
//! source behavior of this system.

mod schemas;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use notevault_access::{AccessGate, IgnoreRules, IGNORE_FILE};
use notevault_matcher::{find_best_match, DEFAULT_THRESHOLD};
use notevault_note::{QueryEngine, QueryOutcome, StoreError, VaultStore};
use notevault_patch::{apply_patch, edit_lines};

use crate::protocol::{ErrorCode, ErrorPayload};
use crate::registry::{ToolDef, ToolHandler};

pub use schemas::{
    EditLinesRequest, FuzzyReplaceRequest, LineMode, ListNotesRequest, PatchNoteRequest,
    PatchOp, PatchTargetType, QueryVaultRequest, ReadNoteRequest, ReloadIgnoreRequest,
    WriteNoteRequest,
};

/// Shared context handed to every tool: the one store, the one gate,
/// and (when configured) the external query engine.
#[derive(Clone)]
pub struct ToolContext {
    pub store: Arc<dyn VaultStore>,
    pub gate: Arc<AccessGate>,
    pub query: Option<Arc<dyn QueryEngine>>,
}

/// Build the tool registry entries. The `query_vault` tool is only
/// registered when an engine is wired in.
pub fn build_tools(ctx: ToolContext) -> Vec<ToolDef> {
    let mut tools = vec![
        tool_def::<ListNotesRequest>(
            "list_notes",
            "List all accessible note paths in the vault.",
            Arc::new(ListNotes { ctx: ctx.clone() }),
        ),
        tool_def::<ReadNoteRequest>(
            "read_note",
            "Read the raw text of one note.",
            Arc::new(ReadNote { ctx: ctx.clone() }),
        ),
        tool_def::<WriteNoteRequest>(
            "write_note",
            "Create a note or replace its content wholesale.",
            Arc::new(WriteNote { ctx: ctx.clone() }),
        ),
        tool_def::<FuzzyReplaceRequest>(
            "fuzzy_replace",
            "Replace the region of a note best matching the target text. \
             Tolerates reformatted whitespace and small typos; fails with \
             a correctable error when nothing reaches the similarity \
             threshold.",
            Arc::new(FuzzyReplace { ctx: ctx.clone() }),
        ),
        tool_def::<EditLinesRequest>(
            "edit_lines",
            "Insert before/after or replace a 1-based line. Line count + 1 \
             appends past the end. Content may be multi-line.",
            Arc::new(EditLines { ctx: ctx.clone() }),
        ),
        tool_def::<PatchNoteRequest>(
            "patch_note",
            "Apply a structural patch at a heading path ('A::B'), block \
             anchor, or frontmatter field.",
            Arc::new(PatchNote { ctx: ctx.clone() }),
        ),
        tool_def::<ReloadIgnoreRequest>(
            "reload_ignore",
            "Reload the ignore rules from the vault's .mcpignore file.",
            Arc::new(ReloadIgnore { ctx: ctx.clone() }),
        ),
    ];

    if ctx.query.is_some() {
        tools.push(tool_def::<QueryVaultRequest>(
            "query_vault",
            "Evaluate a query against the vault's query engine.",
            Arc::new(QueryVault { ctx }),
        ));
    }

    tools
}

fn tool_def<R: schemars::JsonSchema>(
    name: &str,
    description: &str,
    handler: Arc<dyn ToolHandler>,
) -> ToolDef {
    let schema = schemars::schema_for!(R);
    ToolDef {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema).unwrap_or_else(|_| json!({})),
        handler,
    }
}

fn parse_args<R: serde::de::DeserializeOwned>(args: Value) -> Result<R, ErrorPayload> {
    serde_json::from_value(args).map_err(|err| ErrorPayload::validation(err.to_string()))
}

// ---------------------------------------------------------------------------
// Read surface
// ---------------------------------------------------------------------------

struct ListNotes {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for ListNotes {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let _req: ListNotesRequest = parse_args(args)?;
        let paths = self.ctx.store.list().await?;
        let notes: Vec<String> = paths
            .into_iter()
            .filter(|p| self.ctx.gate.is_accessible(p))
            .collect();
        Ok(json!({ "notes": notes, "count": notes.len() }))
    }
}

struct ReadNote {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for ReadNote {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: ReadNoteRequest = parse_args(args)?;
        let path = self.ctx.gate.validate_read(&req.path)?;
        let content = self.ctx.store.read(&path).await?;
        Ok(json!({ "path": path, "content": content }))
    }
}

struct WriteNote {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for WriteNote {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: WriteNoteRequest = parse_args(args)?;
        let path = self.ctx.gate.validate_write(&req.path)?;
        self.ctx.store.modify(&path, &req.content).await?;
        Ok(json!({ "path": path, "bytes": req.content.len() }))
    }
}

// ---------------------------------------------------------------------------
// Edit operations
// ---------------------------------------------------------------------------

struct FuzzyReplace {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for FuzzyReplace {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: FuzzyReplaceRequest = parse_args(args)?;
        if req.target.is_empty() {
            return Err(ErrorPayload::validation("target must not be empty"));
        }
        let threshold = req.threshold.unwrap_or(DEFAULT_THRESHOLD);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ErrorPayload::validation("threshold must be within 0..=1"));
        }

        let path = self.ctx.gate.validate_write(&req.path)?;
        let content = self.ctx.store.read(&path).await?;

        let Some(candidate) = find_best_match(&content, &req.target, threshold) else {
            return Err(ErrorPayload::new(
                ErrorCode::TargetNotFound,
                format!("no region matches the target at threshold {threshold}"),
            ));
        };

        let mut updated = String::with_capacity(
            content.len() - (candidate.end - candidate.start) + req.replacement.len(),
        );
        updated.push_str(&content[..candidate.start]);
        updated.push_str(&req.replacement);
        updated.push_str(&content[candidate.end..]);

        self.ctx.store.modify(&path, &updated).await?;
        Ok(json!({
            "path": path,
            "similarity": candidate.similarity,
            "start": candidate.start,
            "end": candidate.end,
        }))
    }
}

struct EditLines {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for EditLines {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: EditLinesRequest = parse_args(args)?;
        let path = self.ctx.gate.validate_write(&req.path)?;
        let content = self.ctx.store.read(&path).await?;
        let updated = edit_lines(&content, req.line, req.mode.into(), &req.content)?;
        self.ctx.store.modify(&path, &updated).await?;
        Ok(json!({ "path": path, "line": req.line }))
    }
}

struct PatchNote {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for PatchNote {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: PatchNoteRequest = parse_args(args)?;
        let target = req.target_type.into_target(req.target);
        let path = self.ctx.gate.validate_write(&req.path)?;
        let content = self.ctx.store.read(&path).await?;
        let updated = apply_patch(&content, &target, req.operation.into(), &req.content)?;
        self.ctx.store.modify(&path, &updated).await?;
        Ok(json!({ "path": path }))
    }
}

// ---------------------------------------------------------------------------
// Policy + query
// ---------------------------------------------------------------------------

struct ReloadIgnore {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for ReloadIgnore {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let _req: ReloadIgnoreRequest = parse_args(args)?;
        // The rule file is read directly: the gate itself denies
        // external access to it.
        let rules = match self.ctx.store.read(IGNORE_FILE).await {
            Ok(text) => IgnoreRules::parse(&text),
            Err(StoreError::NotFound(_)) => IgnoreRules::disabled(),
            Err(err) => return Err(err.into()),
        };
        let count = rules.len();
        self.ctx.gate.reload(rules);
        Ok(json!({ "patterns": count }))
    }
}

struct QueryVault {
    ctx: ToolContext,
}

#[async_trait]
impl ToolHandler for QueryVault {
    async fn call(&self, args: Value) -> Result<Value, ErrorPayload> {
        let req: QueryVaultRequest = parse_args(args)?;
        let Some(engine) = &self.ctx.query else {
            return Err(ErrorPayload::new(
                ErrorCode::External,
                "no query engine configured",
            ));
        };
        // An engine failure is distinct from a successful-but-empty
        // result set.
        match engine.query(&req.query).await {
            QueryOutcome::Rows(rows) => {
                let count = rows.len();
                Ok(json!({ "rows": rows, "count": count }))
            }
            QueryOutcome::Failed(message) => Err(ErrorPayload::new(ErrorCode::External, message)),
        }
    }
}
