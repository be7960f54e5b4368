use notevault_note::{DocumentParse, FRONTMATTER_DELIMITER};

use crate::error::{PatchError, Result};

/// Where inside a document a structural edit applies. Closed set: a new
/// kind of target is an exhaustiveness-checked change, not a new
/// dynamic handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchTarget {
    /// `::`-delimited path of heading titles, e.g. `"Tasks::Open"`.
    Heading(String),
    /// Bare block anchor name (without the `^`).
    Block(String),
    /// Frontmatter field name.
    Frontmatter(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOperation {
    Replace,
    Prepend,
    Append,
}

/// Apply one structural patch to `text` and return the mutated text.
///
/// Line-join convention: output lines are joined with `\n` and the
/// input's trailing-newline state is preserved. Regions the patch does
/// not touch come back byte-identical.
pub fn apply_patch(
    text: &str,
    target: &PatchTarget,
    operation: PatchOperation,
    content: &str,
) -> Result<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();

    match target {
        PatchTarget::Heading(path) => patch_heading(&mut lines, path, operation, content)?,
        PatchTarget::Block(id) => patch_block(&mut lines, id, operation, content)?,
        PatchTarget::Frontmatter(field) => {
            patch_frontmatter(text, &mut lines, field, operation, content)?
        }
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') || text.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Heading targets
// ---------------------------------------------------------------------------

/// Resolve a `::`-delimited heading path. Each segment matches only a
/// heading whose level strictly increases past the previously matched
/// level, scanning top to bottom, so `"Section::Subsection"` requires
/// `Subsection` nested under `Section`, not merely later in the file.
fn resolve_heading(text_lines: &[String], path: &str) -> Option<(usize, u8, usize)> {
    let joined = text_lines.join("\n");
    let parse = DocumentParse::of(&joined);

    let segments: Vec<&str> = path.split("::").map(str::trim).collect();
    if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
        return None;
    }

    let mut matched_level: u8 = 0;
    let mut segment_idx = 0;
    let mut matched: Option<(usize, u8)> = None;

    for heading in &parse.headings {
        if segment_idx >= segments.len() {
            break;
        }
        if heading.level > matched_level && heading.text == segments[segment_idx] {
            matched_level = heading.level;
            matched = Some((heading.line, heading.level));
            segment_idx += 1;
        }
    }

    if segment_idx < segments.len() {
        return None;
    }

    let (line, level) = matched?;
    // Span runs to the next heading at the same or shallower level.
    let end = parse
        .headings
        .iter()
        .find(|h| h.line > line && h.level <= level)
        .map(|h| h.line)
        .unwrap_or(text_lines.len());
    Some((line, level, end))
}

fn patch_heading(
    lines: &mut Vec<String>,
    path: &str,
    operation: PatchOperation,
    content: &str,
) -> Result<()> {
    let (heading_line, _level, span_end) = resolve_heading(lines, path)
        .ok_or_else(|| PatchError::TargetNotFound(format!("heading path '{path}'")))?;

    let new_lines: Vec<String> = content.lines().map(str::to_string).collect();
    match operation {
        PatchOperation::Replace => {
            lines.splice(heading_line + 1..span_end, new_lines);
        }
        PatchOperation::Prepend => {
            lines.splice(heading_line + 1..heading_line + 1, new_lines);
        }
        PatchOperation::Append => {
            lines.splice(span_end..span_end, new_lines);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Block targets
// ---------------------------------------------------------------------------

fn patch_block(
    lines: &mut [String],
    id: &str,
    operation: PatchOperation,
    content: &str,
) -> Result<()> {
    let token = format!("^{id}");
    let line_idx = lines
        .iter()
        .position(|l| l.split_whitespace().any(|word| word == token))
        .ok_or_else(|| PatchError::TargetNotFound(format!("block anchor '{token}'")))?;

    let line = &lines[line_idx];
    let token_pos = line
        .rfind(&token)
        .ok_or_else(|| PatchError::TargetNotFound(format!("block anchor '{token}'")))?;
    let before = line[..token_pos].trim_end();

    // The anchor always stays at the end of the line.
    lines[line_idx] = match operation {
        PatchOperation::Replace => format!("{content} {token}"),
        PatchOperation::Prepend => join_words(&[content, before, &token]),
        PatchOperation::Append => join_words(&[before, content, &token]),
    };
    Ok(())
}

fn join_words(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|p| !p.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

// ---------------------------------------------------------------------------
// Frontmatter targets
// ---------------------------------------------------------------------------

fn patch_frontmatter(
    original: &str,
    lines: &mut Vec<String>,
    field: &str,
    operation: PatchOperation,
    content: &str,
) -> Result<()> {
    if field.trim().is_empty() {
        return Err(PatchError::Validation("frontmatter field name is empty".into()));
    }
    if DocumentParse::has_malformed_frontmatter(original) {
        return Err(PatchError::MalformedFrontmatter);
    }

    let Some(fm) = DocumentParse::of(original).frontmatter else {
        // No frontmatter: create a block holding just this field above
        // the untouched body.
        let block = vec![
            FRONTMATTER_DELIMITER.to_string(),
            format!("{field}: {content}"),
            FRONTMATTER_DELIMITER.to_string(),
        ];
        lines.splice(0..0, block);
        return Ok(());
    };

    let prefix = format!("{field}:");
    let existing = lines[fm.open_line + 1..fm.close_line]
        .iter()
        .position(|l| l.starts_with(&prefix))
        .map(|offset| fm.open_line + 1 + offset);

    match existing {
        None => {
            // Field absent: append it inside the block. Delimiters are
            // never touched.
            lines.insert(fm.close_line, format!("{field}: {content}"));
        }
        Some(idx) => {
            let value = lines[idx][prefix.len()..].trim().to_string();
            let new_value = match operation {
                PatchOperation::Replace => content.to_string(),
                PatchOperation::Prepend => format!("{content}{value}"),
                PatchOperation::Append => format!("{value}{content}"),
            };
            lines[idx] = format!("{field}: {new_value}");
        }
    }
    Ok(())
}
