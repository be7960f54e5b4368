/// Frontmatter delimiter line.
pub const FRONTMATTER_DELIMITER: &str = "---";

/// Structural parse of one document, derived from raw text on each
/// access and never persisted separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParse {
    pub frontmatter: Option<Frontmatter>,
    pub headings: Vec<Heading>,
    pub anchors: Vec<BlockAnchor>,
}

/// A frontmatter block: the text between the opening delimiter on the
/// first line and the closing delimiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontmatter {
    /// Line index of the opening `---` (always 0).
    pub open_line: usize,
    /// Line index of the closing `---`.
    pub close_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub text: String,
    /// 1 through 6.
    pub level: u8,
    /// Zero-based line index.
    pub line: usize,
}

/// A `^id` token at the end of a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockAnchor {
    pub id: String,
    pub line: usize,
}

impl DocumentParse {
    pub fn of(text: &str) -> Self {
        let lines: Vec<&str> = text.lines().collect();
        Self {
            frontmatter: find_frontmatter(&lines),
            headings: find_headings(&lines),
            anchors: find_anchors(&lines),
        }
    }

    /// Whether the document opens with a frontmatter delimiter that is
    /// never closed. Fatal to frontmatter operations only.
    pub fn has_malformed_frontmatter(text: &str) -> bool {
        let mut lines = text.lines();
        if lines.next().map(str::trim_end) != Some(FRONTMATTER_DELIMITER) {
            return false;
        }
        !lines.any(|l| l.trim_end() == FRONTMATTER_DELIMITER)
    }
}

fn find_frontmatter(lines: &[&str]) -> Option<Frontmatter> {
    if lines.first().map(|l| l.trim_end()) != Some(FRONTMATTER_DELIMITER) {
        return None;
    }
    let close = lines[1..]
        .iter()
        .position(|l| l.trim_end() == FRONTMATTER_DELIMITER)?;
    Some(Frontmatter {
        open_line: 0,
        close_line: close + 1,
    })
}

fn find_headings(lines: &[&str]) -> Vec<Heading> {
    let frontmatter = find_frontmatter(lines);
    let body_start = frontmatter.map(|f| f.close_line + 1).unwrap_or(0);

    lines
        .iter()
        .enumerate()
        .skip(body_start)
        .filter_map(|(idx, line)| parse_heading(line).map(|(level, text)| Heading {
            text,
            level,
            line: idx,
        }))
        .collect()
}

fn parse_heading(line: &str) -> Option<(u8, String)> {
    let hashes = line.bytes().take_while(|b| *b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = &line[hashes..];
    let text = rest.strip_prefix(' ')?;
    Some((hashes as u8, text.trim().to_string()))
}

fn find_anchors(lines: &[&str]) -> Vec<BlockAnchor> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(idx, line)| {
            let token = line.rsplit(char::is_whitespace).next()?;
            let id = token.strip_prefix('^')?;
            if id.is_empty() || !id.chars().all(|c| c.is_alphanumeric() || c == '-') {
                return None;
            }
            Some(BlockAnchor {
                id: id.to_string(),
                line: idx,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_frontmatter_block() {
        let text = "---\nstatus: active\ntags: [a, b]\n---\n# Title\n";
        let parse = DocumentParse::of(text);
        let fm = parse.frontmatter.unwrap();
        assert_eq!(fm.open_line, 0);
        assert_eq!(fm.close_line, 3);
    }

    #[test]
    fn no_frontmatter_when_not_first_line() {
        let text = "intro\n---\nkey: value\n---\n";
        assert!(DocumentParse::of(text).frontmatter.is_none());
    }

    #[test]
    fn unclosed_frontmatter_is_malformed() {
        let text = "---\nstatus: active\nbody without closing";
        assert!(DocumentParse::of(text).frontmatter.is_none());
        assert!(DocumentParse::has_malformed_frontmatter(text));
        assert!(!DocumentParse::has_malformed_frontmatter("plain body"));
    }

    #[test]
    fn headings_with_levels_in_order() {
        let text = "# One\ntext\n## Two\n### Three\n####### not a heading\n#nospace\n";
        let parse = DocumentParse::of(text);
        let got: Vec<(u8, &str)> = parse
            .headings
            .iter()
            .map(|h| (h.level, h.text.as_str()))
            .collect();
        assert_eq!(got, vec![(1, "One"), (2, "Two"), (3, "Three")]);
    }

    #[test]
    fn frontmatter_delimiters_do_not_become_headings() {
        let text = "---\ntitle: x\n---\n# Real\n";
        let parse = DocumentParse::of(text);
        assert_eq!(parse.headings.len(), 1);
        assert_eq!(parse.headings[0].line, 3);
    }

    #[test]
    fn block_anchors_at_line_ends() {
        let text = "a task line ^task-1\nplain line\nanother ^b2\nnot an anchor ^ \n";
        let parse = DocumentParse::of(text);
        let ids: Vec<&str> = parse.anchors.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["task-1", "b2"]);
        assert_eq!(parse.anchors[0].line, 0);
    }
}
