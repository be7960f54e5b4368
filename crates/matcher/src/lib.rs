//! # Notevault Matcher
//!
//! Approximate substring search over document text.
//!
//! Given a target string and a similarity threshold, finds the window of
//! the document that best matches the target. Exact substrings are found
//! first (and score 1.0); otherwise both sides are whitespace-normalized
//! and windows of several sizes are scanned with a normalized
//! edit-distance similarity.

/// Default similarity threshold when the caller does not supply one.
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// Similarity at which the scan stops early. Near-perfect matches are not
/// worth scanning past on large documents.
const EARLY_EXIT_SIMILARITY: f64 = 0.95;

/// Window size multipliers around the normalized target length.
const WINDOW_SCALES: [f64; 5] = [1.0, 0.9, 1.1, 0.8, 1.2];

/// A candidate match: a byte window `[start, end)` over the original
/// document text plus its similarity to the target in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub start: usize,
    pub end: usize,
    pub similarity: f64,
}

/// Find the best window of `content` matching `target` at or above
/// `threshold`. Returns `None` when nothing reaches the threshold; the
/// caller should treat that as a correctable miss, not a failure of the
/// document.
pub fn find_best_match(content: &str, target: &str, threshold: f64) -> Option<MatchCandidate> {
    if target.is_empty() {
        return None;
    }

    // Fast path: exact substring, no approximate scan at all.
    if let Some(start) = content.find(target) {
        return Some(MatchCandidate {
            start,
            end: start + target.len(),
            similarity: 1.0,
        });
    }

    let normalized_target = normalize_whitespace(target);
    if normalized_target.is_empty() {
        return None;
    }

    // The scan operates on character positions so multi-byte content
    // cannot split a window mid-codepoint; spans are mapped back to byte
    // offsets at the end.
    let chars: Vec<char> = content.chars().collect();
    let target_len = normalized_target.chars().count();

    let mut sizes: Vec<usize> = WINDOW_SCALES
        .iter()
        .map(|scale| ((target_len as f64) * scale).round().max(1.0) as usize)
        .filter(|size| *size <= chars.len())
        .collect();
    sizes.sort_unstable();
    sizes.dedup();

    let mut best: Option<(usize, usize, f64)> = None;
    'scan: for size in sizes {
        for start in 0..=(chars.len() - size) {
            let window: String = chars[start..start + size].iter().collect();
            let normalized_window = normalize_whitespace(&window);
            if normalized_window.is_empty() {
                continue;
            }
            let similarity = string_similarity(&normalized_target, &normalized_window);
            if similarity < threshold {
                continue;
            }
            if best.map_or(true, |(_, _, s)| similarity > s) {
                best = Some((start, start + size, similarity));
            }
            if similarity >= EARLY_EXIT_SIMILARITY {
                break 'scan;
            }
        }
    }

    best.map(|(start_char, end_char, similarity)| MatchCandidate {
        start: char_to_byte(content, start_char),
        end: char_to_byte(content, end_char),
        similarity,
    })
}

/// Collapse runs of whitespace to a single space and trim the ends, so
/// matching survives reflowed/reformatted text.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalized edit-distance similarity: `1 - lev(a, b) / max(|a|, |b|)`.
fn string_similarity(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 1.0;
    }
    let distance = levenshtein(&a_chars, &b_chars);
    1.0 - (distance as f64) / (max_len as f64)
}

/// Two-row Levenshtein distance.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn exact_substring_scores_one() {
        let content = "alpha beta gamma";
        let m = find_best_match(content, "beta", 0.99).unwrap();
        assert_eq!(m.similarity, 1.0);
        assert_eq!(&content[m.start..m.end], "beta");
    }

    #[test]
    fn exact_match_ignores_threshold() {
        // Even an impossible threshold is satisfied by the exact fast path.
        let m = find_best_match("hello world", "world", 1.0).unwrap();
        assert_eq!(m.similarity, 1.0);
    }

    #[test]
    fn whitespace_reflow_still_matches() {
        let content = "The quick   brown\n fox jumps over the lazy dog";
        let m = find_best_match(content, "quick brown fox", 0.7).unwrap();
        assert!(m.similarity >= 0.7);
        let window = &content[m.start..m.end];
        assert!(window.contains("quick"));
        assert!(window.contains("fox"));
    }

    #[test]
    fn small_typo_matches_above_threshold() {
        let content = "call the renderWidget function here";
        let m = find_best_match(content, "renderWidgit function", 0.7).unwrap();
        assert!(m.similarity >= 0.7);
        assert!(m.similarity < 1.0);
    }

    #[test]
    fn miss_returns_none() {
        assert!(find_best_match("aaaa bbbb cccc", "zzzzzzzz", 0.7).is_none());
    }

    #[test]
    fn never_below_threshold() {
        let content = "some document content with assorted words inside";
        for target in ["assorted wards", "document contnet", "nothing like it at all"] {
            for threshold in [0.5, 0.7, 0.9] {
                if let Some(m) = find_best_match(content, target, threshold) {
                    assert!(
                        m.similarity >= threshold,
                        "{target:?} at {threshold} gave {}",
                        m.similarity
                    );
                }
            }
        }
    }

    #[test]
    fn target_longer_than_content_is_skipped() {
        assert!(find_best_match("short", "a much longer target than the content", 0.1).is_none());
    }

    #[test]
    fn empty_target_is_none() {
        assert!(find_best_match("content", "", 0.0).is_none());
    }

    #[test]
    fn multibyte_content_spans_stay_on_boundaries() {
        let content = "préfixe — cœur du texte — suffixe";
        let m = find_best_match(content, "coeur du texte", 0.6);
        if let Some(m) = m {
            // Slicing must not panic on a char boundary.
            let _ = &content[m.start..m.end];
        }
    }

    #[test]
    fn levenshtein_basics() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        assert_eq!(levenshtein(&a, &b), 3);
        assert_eq!(levenshtein(&a, &a), 0);
        assert_eq!(levenshtein(&a, &[]), 6);
    }
}
