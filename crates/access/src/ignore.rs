use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Well-known rule file, relative to the vault root. Always excluded
/// from reads and writes, whatever the rules inside it say.
pub const IGNORE_FILE: &str = ".mcpignore";

/// Compiled ignore rule set.
///
/// Parsed once from the rule file's content; reload is an explicit
/// operation, there is no file watching. With no rule file the engine is
/// disabled and nothing but the rule file itself is excluded.
#[derive(Debug)]
pub struct IgnoreRules {
    set: Option<GlobSet>,
    rule_count: usize,
}

impl IgnoreRules {
    /// Disabled engine: no rule file present.
    pub fn disabled() -> Self {
        Self {
            set: None,
            rule_count: 0,
        }
    }

    /// Parse rule-file content. Blank lines and `#` comments are
    /// skipped; a malformed pattern is dropped with a warning and never
    /// aborts the rest of the file.
    pub fn parse(content: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut rule_count = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match compile_pattern(line, &mut builder) {
                Ok(()) => rule_count += 1,
                Err(err) => {
                    log::warn!("skipping malformed ignore pattern on line {}: {err}", idx + 1);
                }
            }
        }

        match builder.build() {
            Ok(set) => Self {
                set: Some(set),
                rule_count,
            },
            Err(err) => {
                log::warn!("ignore rule set failed to compile, disabling rules: {err}");
                Self::disabled()
            }
        }
    }

    /// Whether `path` (slash-delimited, relative to the vault root) is
    /// excluded from access.
    pub fn is_excluded(&self, path: &str) -> bool {
        let path = path.trim_start_matches('/');
        if path == IGNORE_FILE {
            return true;
        }
        match &self.set {
            Some(set) => set.is_match(path),
            None => false,
        }
    }

    /// Number of rules that compiled.
    pub fn len(&self) -> usize {
        self.rule_count
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count == 0
    }
}

/// Expand one gitignore-style line into globset patterns.
///
/// - trailing `/` marks a directory: the directory and everything below
/// - no leading `/`: the pattern may start at any segment boundary
/// - `*` stays within a segment, `**` crosses segments, `?` is one
///   non-separator character (globset's `literal_separator` semantics)
fn compile_pattern(line: &str, builder: &mut GlobSetBuilder) -> Result<(), globset::Error> {
    let (body, dir_only) = match line.strip_suffix('/') {
        Some(stripped) => (stripped, true),
        None => (line, false),
    };

    let anchored = body.starts_with('/');
    let body = body.trim_start_matches('/');
    if body.is_empty() {
        return Ok(());
    }

    let base = if anchored || body.contains("**") {
        body.to_string()
    } else {
        // Floating pattern: match at any depth.
        format!("**/{body}")
    };

    add_glob(&base, builder)?;
    if dir_only {
        add_glob(&format!("{base}/**"), builder)?;
    }
    Ok(())
}

fn add_glob(pattern: &str, builder: &mut GlobSetBuilder) -> Result<(), globset::Error> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?;
    builder.add(glob);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_comment_lines_are_skipped() {
        let rules = IgnoreRules::parse("\n# comment\n   \nsecret.md\n");
        assert_eq!(rules.len(), 1);
        assert!(rules.is_excluded("secret.md"));
    }

    #[test]
    fn ignore_file_always_excluded() {
        let rules = IgnoreRules::disabled();
        assert!(rules.is_excluded(".mcpignore"));
        assert!(rules.is_excluded("/.mcpignore"));

        let rules = IgnoreRules::parse("");
        assert!(rules.is_excluded(".mcpignore"));
        assert!(!rules.is_excluded("notes/todo.md"));
    }

    #[test]
    fn directory_pattern_covers_subtree() {
        let rules = IgnoreRules::parse("private/\n");
        assert!(rules.is_excluded("private"));
        assert!(rules.is_excluded("private/diary.md"));
        assert!(rules.is_excluded("private/deep/nested.md"));
        assert!(rules.is_excluded("work/private/notes.md"));
        assert!(!rules.is_excluded("privateer.md"));
    }

    #[test]
    fn star_stays_within_segment() {
        let rules = IgnoreRules::parse("*.tmp\n");
        assert!(rules.is_excluded("draft.tmp"));
        assert!(rules.is_excluded("deep/dir/draft.tmp"));
        assert!(!rules.is_excluded("draft.tmp.md"));
    }

    #[test]
    fn double_star_crosses_segments() {
        let rules = IgnoreRules::parse("archive/**/old.md\n");
        assert!(rules.is_excluded("archive/2021/old.md"));
        assert!(rules.is_excluded("archive/2021/q1/old.md"));
        assert!(!rules.is_excluded("current/old.md"));
    }

    #[test]
    fn question_mark_is_one_character() {
        let rules = IgnoreRules::parse("day?.md\n");
        assert!(rules.is_excluded("day1.md"));
        assert!(rules.is_excluded("journal/day2.md"));
        assert!(!rules.is_excluded("day10.md"));
        assert!(!rules.is_excluded("day.md"));
    }

    #[test]
    fn anchored_pattern_only_matches_root() {
        let rules = IgnoreRules::parse("/inbox.md\n");
        assert!(rules.is_excluded("inbox.md"));
        assert!(!rules.is_excluded("mail/inbox.md"));
    }

    #[test]
    fn floating_pattern_matches_any_segment() {
        let rules = IgnoreRules::parse("drafts\n");
        assert!(rules.is_excluded("drafts"));
        assert!(rules.is_excluded("projects/drafts"));
        // No trailing slash, so children are not covered.
        assert!(!rules.is_excluded("drafts/a.md"));
    }

    #[test]
    fn malformed_pattern_does_not_abort_load() {
        let rules = IgnoreRules::parse("[unclosed\nsecret.md\n");
        assert!(rules.is_excluded("secret.md"));
        assert!(!rules.is_excluded("other.md"));
    }

    #[test]
    fn reload_with_same_content_is_idempotent() {
        let content = "private/\n*.tmp\n";
        let first = IgnoreRules::parse(content);
        let second = IgnoreRules::parse(content);
        for path in ["private/x.md", "a.tmp", "keep.md", ".mcpignore"] {
            assert_eq!(first.is_excluded(path), second.is_excluded(path), "{path}");
        }
    }
}
