//! Tool input schemas. Doc comments and `schemars` descriptions feed
//! the `inputSchema` advertised through `tools/list`.

use schemars::JsonSchema;
use serde::Deserialize;

use notevault_patch::{LineEditMode, PatchOperation, PatchTarget};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListNotesRequest {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReadNoteRequest {
    /// Slash-delimited note path relative to the vault root
    #[schemars(description = "Note path, e.g. 'projects/roadmap.md'")]
    pub path: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteNoteRequest {
    /// Note path to create or overwrite
    #[schemars(description = "Note path, e.g. 'projects/roadmap.md'")]
    pub path: String,

    /// Full new content of the note
    #[schemars(description = "Entire new note content")]
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FuzzyReplaceRequest {
    /// Note path to edit
    #[schemars(description = "Note path, e.g. 'projects/roadmap.md'")]
    pub path: String,

    /// Text to locate; whitespace differences and small typos tolerated
    #[schemars(description = "Approximate text to find in the note")]
    pub target: String,

    /// Replacement text spliced over the matched region
    #[schemars(description = "Replacement text")]
    pub replacement: String,

    /// Minimum similarity in 0..=1 (default 0.7)
    #[schemars(description = "Minimum similarity in 0..=1 (default 0.7)")]
    pub threshold: Option<f64>,
}

/// Placement of line-indexed content.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LineMode {
    Before,
    After,
    Replace,
}

impl From<LineMode> for LineEditMode {
    fn from(mode: LineMode) -> Self {
        match mode {
            LineMode::Before => LineEditMode::Before,
            LineMode::After => LineEditMode::After,
            LineMode::Replace => LineEditMode::Replace,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditLinesRequest {
    /// Note path to edit
    #[schemars(description = "Note path, e.g. 'projects/roadmap.md'")]
    pub path: String,

    /// 1-based line number; line count + 1 appends past the end
    #[schemars(description = "1-based line number; count + 1 appends at the end")]
    pub line: usize,

    /// Placement: "before", "after", or "replace"
    #[schemars(description = "Placement: 'before', 'after', or 'replace'")]
    pub mode: LineMode,

    /// Content to insert; may span multiple lines
    #[schemars(description = "Content to insert (may be multi-line)")]
    pub content: String,
}

/// The kind of structural location a patch addresses.
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatchTargetType {
    Heading,
    Block,
    Frontmatter,
}

impl PatchTargetType {
    pub fn into_target(self, identifier: String) -> PatchTarget {
        match self {
            PatchTargetType::Heading => PatchTarget::Heading(identifier),
            PatchTargetType::Block => PatchTarget::Block(identifier),
            PatchTargetType::Frontmatter => PatchTarget::Frontmatter(identifier),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
    Prepend,
    Append,
}

impl From<PatchOp> for PatchOperation {
    fn from(op: PatchOp) -> Self {
        match op {
            PatchOp::Replace => PatchOperation::Replace,
            PatchOp::Prepend => PatchOperation::Prepend,
            PatchOp::Append => PatchOperation::Append,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct PatchNoteRequest {
    /// Note path to patch
    #[schemars(description = "Note path, e.g. 'projects/roadmap.md'")]
    pub path: String,

    /// Target kind: "heading", "block", or "frontmatter"
    #[schemars(description = "Target kind: 'heading', 'block', or 'frontmatter'")]
    pub target_type: PatchTargetType,

    /// Heading path ('A::B'), block anchor name, or frontmatter field
    #[schemars(description = "Heading path 'A::B', block anchor name (no '^'), or frontmatter field name")]
    pub target: String,

    /// Operation: "replace", "prepend", or "append"
    #[schemars(description = "Operation: 'replace', 'prepend', or 'append'")]
    pub operation: PatchOp,

    /// Content to place at the target
    #[schemars(description = "Content to place at the target")]
    pub content: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ReloadIgnoreRequest {}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryVaultRequest {
    /// Query string, passed opaquely to the engine
    #[schemars(description = "Query string for the vault query engine")]
    pub query: String,
}
