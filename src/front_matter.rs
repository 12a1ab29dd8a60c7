//! Front matter extraction
//!
//! A post may start with a metadata block delimited by `---` lines.
//! The block is read as YAML; blocks that are not valid YAML (unquoted
//! colons in titles, stray lines without a key) go through a lenient
//! line scanner instead, which skips whatever it cannot understand.

use std::collections::BTreeMap;

use serde_yaml::Value;

/// A front matter value. Nested mappings are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    Scalar(String),
    List(Vec<String>),
}

/// Flat key/value metadata read from a front matter block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    /// Non-empty scalar value for `key`
    pub fn str(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(MetaValue::Scalar(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// List value for `key`; a scalar is read as a one-item list.
    pub fn list(&self, key: &str) -> Option<Vec<String>> {
        match self.entries.get(key) {
            Some(MetaValue::List(items)) => Some(items.clone()),
            Some(MetaValue::Scalar(s)) if !s.trim().is_empty() => Some(vec![s.trim().to_string()]),
            _ => None,
        }
    }

    /// Scalar value for `key` parsed as an unsigned integer
    pub fn number(&self, key: &str) -> Option<u32> {
        self.str(key).and_then(|s| s.parse().ok())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }
}

/// Result of splitting a post into metadata and body
#[derive(Debug, Clone)]
pub struct FrontMatter<'a> {
    pub metadata: Metadata,
    pub body: &'a str,
}

/// Front matter parser
pub struct FrontMatterParser;

impl FrontMatterParser {
    /// Split `input` into metadata and body.
    ///
    /// Input without a `---` block yields empty metadata and the whole
    /// input, unchanged, as body.
    pub fn parse(input: &str) -> FrontMatter<'_> {
        match Self::split_block(input) {
            Some((block, body)) => FrontMatter {
                metadata: Self::parse_block(block),
                body,
            },
            None => FrontMatter {
                metadata: Metadata::new(),
                body: input,
            },
        }
    }

    /// Locate the metadata block. Returns `(block, body)`.
    pub fn split_block(input: &str) -> Option<(&str, &str)> {
        let text = input.strip_prefix('\u{feff}').unwrap_or(input);
        let mut lines = text.split_inclusive('\n');

        let first = lines.next()?;
        if !is_delimiter(first) {
            return None;
        }

        let block_start = first.len();
        let mut offset = block_start;
        for line in lines {
            if is_delimiter(line) {
                let block = &text[block_start..offset];
                let body = &text[offset + line.len()..];
                return Some((block, body));
            }
            offset += line.len();
        }

        None
    }

    /// Parse the text between the delimiters.
    pub fn parse_block(block: &str) -> Metadata {
        if block.trim().is_empty() {
            return Metadata::new();
        }

        match serde_yaml::from_str::<Value>(block) {
            Ok(value) => match Self::from_yaml(value, block) {
                Some(metadata) => metadata,
                None => {
                    tracing::debug!("Front matter is not a mapping, using line scanner");
                    Self::scan_lines(block)
                }
            },
            Err(e) => {
                tracing::debug!("Front matter is not valid YAML ({}), using line scanner", e);
                Self::scan_lines(block)
            }
        }
    }

    /// Convert a YAML mapping. Values YAML would re-type (numbers, booleans,
    /// unquoted text after ` #`) keep the text as written, taken from the
    /// line scanner.
    fn from_yaml(value: Value, block: &str) -> Option<Metadata> {
        let mapping = match value {
            Value::Mapping(mapping) => mapping,
            Value::Null => return Some(Metadata::new()),
            _ => return None,
        };

        let raw = Self::scan_lines(block);
        let mut metadata = Metadata::new();
        for (key, value) in mapping {
            let Some(key) = scalar_string(&key) else {
                continue;
            };
            let as_written = raw.get(&key).filter(|_| keeps_raw_text(&value, block, &key));
            let value = match (as_written, value) {
                (Some(written), _) => written.clone(),
                (None, Value::Null) => MetaValue::List(Vec::new()),
                (None, Value::Sequence(items)) => {
                    MetaValue::List(items.iter().filter_map(scalar_string).collect())
                }
                (None, Value::Mapping(_)) => {
                    tracing::debug!("Skipping nested front matter key `{}`", key);
                    continue;
                }
                (None, other) => match scalar_string(&other) {
                    Some(s) => MetaValue::Scalar(s),
                    None => continue,
                },
            };
            metadata.insert(key, value);
        }

        Some(metadata)
    }

    /// Lenient `key: value` scanner. Lines it cannot read are skipped.
    pub fn scan_lines(block: &str) -> Metadata {
        let mut metadata = Metadata::new();
        // Key whose `- item` list is still open
        let mut open_list: Option<String> = None;

        for line in block.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if let Some(item) = trimmed.strip_prefix('-') {
                if let Some(key) = &open_list {
                    if let Some(MetaValue::List(items)) = metadata.entries.get_mut(key) {
                        items.push(unquote(item.trim()).to_string());
                    }
                }
                continue;
            }

            let Some((key, value)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = unquote(value.trim());

            if value.is_empty() || value == "[]" {
                metadata.insert(key, MetaValue::List(Vec::new()));
                open_list = Some(key.to_string());
            } else if value.starts_with('[') && value.ends_with(']') {
                let items = value[1..value.len() - 1]
                    .split(',')
                    .map(|item| unquote(item.trim()).to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
                metadata.insert(key, MetaValue::List(items));
                open_list = None;
            } else {
                metadata.insert(key, MetaValue::Scalar(value.to_string()));
                open_list = None;
            }
        }

        metadata
    }
}

/// Whether the scanner's text for `key` should replace the YAML value
fn keeps_raw_text(value: &Value, block: &str, key: &str) -> bool {
    match value {
        Value::String(_) => has_unquoted_comment(block, key),
        Value::Sequence(items) => items.iter().any(|item| !matches!(item, Value::String(_))),
        Value::Null | Value::Mapping(_) => false,
        _ => true,
    }
}

/// Whether the top-level line of `key` has an unquoted value containing ` #`
fn has_unquoted_comment(block: &str, key: &str) -> bool {
    block
        .lines()
        .filter(|line| !line.starts_with([' ', '\t']))
        .filter_map(|line| line.split_once(':'))
        .find(|(k, _)| k.trim() == key)
        .map(|(_, value)| {
            let value = value.trim();
            !value.starts_with(['"', '\'']) && value.contains(" #")
        })
        .unwrap_or(false)
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end() == "---"
}

/// Strip one leading and one trailing quote character
fn unquote(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_string(&tagged.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_front_matter_keeps_input() {
        for input in ["# Hello\n\nWorld", "", "--- not a block", "text\n---\nmore\n---\n"] {
            let parsed = FrontMatterParser::parse(input);
            assert!(parsed.metadata.is_empty());
            assert_eq!(parsed.body, input);
        }
    }

    #[test]
    fn test_unclosed_block_is_body() {
        let input = "---\ntitle: Lost\n\nNo closing delimiter";
        let parsed = FrontMatterParser::parse(input);
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, input);
    }

    #[test]
    fn test_yaml_block() {
        let input = "---\ntitle: \"Hello World\"\ndate: 2024-03-01\ntags: [rust, web]\nreadTime: 7\n---\n# Body\n";
        let parsed = FrontMatterParser::parse(input);
        assert_eq!(parsed.metadata.str("title"), Some("Hello World"));
        assert_eq!(parsed.metadata.str("date"), Some("2024-03-01"));
        assert_eq!(parsed.metadata.list("tags"), Some(vec!["rust".to_string(), "web".to_string()]));
        assert_eq!(parsed.metadata.number("readTime"), Some(7));
        assert_eq!(parsed.body, "# Body\n");
    }

    #[test]
    fn test_hyphen_list() {
        let input = "---\ntags:\n  - one\n  - 'two'\nauthor: me\n---\nbody";
        let parsed = FrontMatterParser::parse(input);
        assert_eq!(parsed.metadata.list("tags"), Some(vec!["one".to_string(), "two".to_string()]));
        assert_eq!(parsed.metadata.str("author"), Some("me"));
        assert_eq!(parsed.body, "body");
    }

    #[test]
    fn test_malformed_block_falls_back_to_scanner() {
        // Unquoted colon in the title and a line without a key are not valid YAML
        let input = "---\ntitle: Rust: The Good Parts\nthis line has no colon\ntags: [a, \"b\"]\n---\ntext";
        let parsed = FrontMatterParser::parse(input);
        assert_eq!(parsed.metadata.str("title"), Some("Rust: The Good Parts"));
        assert_eq!(parsed.metadata.list("tags"), Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(parsed.metadata.len(), 2);
        assert_eq!(parsed.body, "text");
    }

    #[test]
    fn test_scanner_hyphen_list() {
        let block = "tags:\n- x\n- \"y\"\ntitle: 'T'\n- ignored\n";
        let metadata = FrontMatterParser::scan_lines(block);
        assert_eq!(metadata.list("tags"), Some(vec!["x".to_string(), "y".to_string()]));
        assert_eq!(metadata.str("title"), Some("T"));
    }

    #[test]
    fn test_hash_in_unquoted_title_is_kept() {
        let parsed = FrontMatterParser::parse("---\ntitle: Tip #1 for beginners\n---\n");
        assert_eq!(parsed.metadata.str("title"), Some("Tip #1 for beginners"));

        let parsed = FrontMatterParser::parse("---\ntitle: \"Tip #2\"\n---\n");
        assert_eq!(parsed.metadata.str("title"), Some("Tip #2"));
    }

    #[test]
    fn test_numeric_scalars_keep_their_text() {
        let parsed = FrontMatterParser::parse("---\ntitle: 1.10\n---\n");
        assert_eq!(parsed.metadata.str("title"), Some("1.10"));

        let parsed = FrontMatterParser::parse("---\ntitle: 0x1F\nviews: 900\n---\n");
        assert_eq!(parsed.metadata.str("title"), Some("0x1F"));
        assert_eq!(parsed.metadata.number("views"), Some(900));
    }

    #[test]
    fn test_numeric_list_items_keep_their_text() {
        let parsed = FrontMatterParser::parse("---\ntags: [1.0, 2.10]\n---\n");
        assert_eq!(parsed.metadata.list("tags"), Some(vec!["1.0".to_string(), "2.10".to_string()]));

        let parsed = FrontMatterParser::parse("---\ntags:\n  - 3.10\n  - web\n---\n");
        assert_eq!(parsed.metadata.list("tags"), Some(vec!["3.10".to_string(), "web".to_string()]));
    }

    #[test]
    fn test_nested_mapping_skipped() {
        let input = "---\ntitle: T\nseo:\n  description: nested\n---\n";
        let parsed = FrontMatterParser::parse(input);
        assert_eq!(parsed.metadata.str("title"), Some("T"));
        assert!(parsed.metadata.get("seo").is_none());
        assert_eq!(parsed.body, "");
    }

    #[test]
    fn test_crlf_and_empty_block() {
        let parsed = FrontMatterParser::parse("---\r\ntitle: Win\r\n---\r\nbody\r\n");
        assert_eq!(parsed.metadata.str("title"), Some("Win"));
        assert_eq!(parsed.body, "body\r\n");

        let parsed = FrontMatterParser::parse("---\n---\nonly body");
        assert!(parsed.metadata.is_empty());
        assert_eq!(parsed.body, "only body");
    }
}
