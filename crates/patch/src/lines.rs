use crate::error::{PatchError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEditMode {
    /// Insert the content before the addressed line.
    Before,
    /// Insert the content after the addressed line.
    After,
    /// Substitute the addressed line.
    Replace,
}

/// Line-indexed edit. `line_number` is 1-based; `line_count + 1` is
/// allowed and behaves as an append past the last line. Content may be
/// multi-line. Same line-join convention as the structural engine.
pub fn edit_lines(
    text: &str,
    line_number: usize,
    mode: LineEditMode,
    content: &str,
) -> Result<String> {
    let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
    let count = lines.len();

    if line_number < 1 || line_number > count + 1 {
        return Err(PatchError::Validation(format!(
            "line {line_number} out of range 1..={}",
            count + 1
        )));
    }

    let new_lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    let idx = line_number - 1;

    if idx == count {
        // Addressing one past the end: every mode appends.
        lines.extend(new_lines);
    } else {
        match mode {
            LineEditMode::Before => {
                lines.splice(idx..idx, new_lines);
            }
            LineEditMode::After => {
                lines.splice(idx + 1..idx + 1, new_lines);
            }
            LineEditMode::Replace => {
                lines.splice(idx..idx + 1, new_lines);
            }
        }
    }

    let mut out = lines.join("\n");
    if text.ends_with('\n') || text.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const DOC: &str = "one\ntwo\nthree\n";

    #[test]
    fn insert_before_and_after() {
        assert_eq!(
            edit_lines(DOC, 2, LineEditMode::Before, "new").unwrap(),
            "one\nnew\ntwo\nthree\n"
        );
        assert_eq!(
            edit_lines(DOC, 2, LineEditMode::After, "new").unwrap(),
            "one\ntwo\nnew\nthree\n"
        );
    }

    #[test]
    fn replace_line() {
        assert_eq!(
            edit_lines(DOC, 3, LineEditMode::Replace, "THREE").unwrap(),
            "one\ntwo\nTHREE\n"
        );
    }

    #[test]
    fn multiline_content_expands() {
        assert_eq!(
            edit_lines(DOC, 1, LineEditMode::Replace, "a\nb").unwrap(),
            "a\nb\ntwo\nthree\n"
        );
    }

    #[test]
    fn count_plus_one_appends_for_before_and_replace() {
        assert_eq!(
            edit_lines(DOC, 4, LineEditMode::Before, "four").unwrap(),
            "one\ntwo\nthree\nfour\n"
        );
        assert_eq!(
            edit_lines(DOC, 4, LineEditMode::Replace, "four").unwrap(),
            "one\ntwo\nthree\nfour\n"
        );
    }

    #[test]
    fn zero_and_count_plus_two_are_rejected() {
        assert!(matches!(
            edit_lines(DOC, 0, LineEditMode::Before, "x"),
            Err(PatchError::Validation(_))
        ));
        assert!(matches!(
            edit_lines(DOC, 5, LineEditMode::Replace, "x"),
            Err(PatchError::Validation(_))
        ));
    }

    #[test]
    fn empty_document_accepts_line_one() {
        assert_eq!(
            edit_lines("", 1, LineEditMode::Before, "first").unwrap(),
            "first\n"
        );
    }
}
