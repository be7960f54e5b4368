use crate::parse::{DocumentParse, Heading};

/// Metadata facade over one document's parse: frontmatter fields,
/// headings, and outbound link targets, computed from raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub fields: Vec<(String, String)>,
    pub headings: Vec<Heading>,
    pub links: Vec<String>,
}

impl DocumentMetadata {
    pub fn of(text: &str) -> Self {
        let parse = DocumentParse::of(text);
        let fields = parse
            .frontmatter
            .as_ref()
            .map(|fm| {
                text.lines()
                    .take(fm.close_line)
                    .skip(1)
                    .filter_map(parse_field)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            fields,
            headings: parse.headings,
            links: find_links(text),
        }
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

fn parse_field(line: &str) -> Option<(String, String)> {
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}

/// Outbound `[[target]]` wiki links, in document order.
fn find_links(text: &str) -> Vec<String> {
    let mut links = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("[[") {
        let after = &rest[open + 2..];
        let Some(close) = after.find("]]") else { break };
        let inner = &after[..close];
        // `[[target|alias]]` links by target; `[[target#heading]]` by note.
        let target = inner
            .split(['|', '#'])
            .next()
            .unwrap_or(inner)
            .trim();
        if !target.is_empty() {
            links.push(target.to_string());
        }
        rest = &after[close + 2..];
    }
    links
}
