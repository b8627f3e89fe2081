use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Leading `---` block anchored at the start of the text, plus at most one blank
/// line after the closing delimiter.
static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)\A---\r?\n(?:(.*?)\r?\n)?---(?:\r?\n|\z)(?:[ \t]*\r?\n)?").unwrap()
});

/// Flat key/value metadata from the head of a document. Values stay strings;
/// callers coerce as needed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    fields: BTreeMap<String, String>,
}

impl FrontMatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Like `get`, but treats an empty value as absent.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse the optional front-matter block. Missing block → empty mapping.
pub fn parse_front_matter(text: &str) -> FrontMatter {
    let mut fields = BTreeMap::new();

    let Some(caps) = BLOCK_RE.captures(text) else {
        return FrontMatter { fields };
    };
    let Some(inner) = caps.get(1) else {
        return FrontMatter { fields };
    };

    for line in inner.as_str().lines() {
        // Only the first colon separates key from value
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        fields.insert(key.trim().to_string(), value.trim().to_string());
    }

    FrontMatter { fields }
}

/// Return the document with its front-matter block removed. Without a block the
/// input is returned untouched.
pub fn extract_body(text: &str) -> &str {
    match BLOCK_RE.find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_block_is_identity() {
        for text in ["", "# Hello\nWorld", "  indented\n---\nkey: v\n---\n", "--- \nkey: v\n---\n"] {
            assert!(parse_front_matter(text).is_empty(), "{text:?}");
            assert_eq!(extract_body(text), text);
        }
    }

    #[test]
    fn title_and_tags() {
        let text = "---\ntitle: My Title\ntags: a, b\n---\nBody";
        let fm = parse_front_matter(text);
        assert_eq!(fm.get("title"), Some("My Title"));
        assert_eq!(fm.get("tags"), Some("a, b"));
        assert_eq!(extract_body(text), "Body");
    }

    #[test]
    fn value_keeps_later_colons() {
        let fm = parse_front_matter("---\nlink: https://example.com:8080/x\n---\n");
        assert_eq!(fm.get("link"), Some("https://example.com:8080/x"));
    }

    #[test]
    fn lines_without_colon_ignored() {
        let fm = parse_front_matter("---\njust words\ndate: 2024-01-02\n---\nx");
        assert_eq!(fm.get("just words"), None);
        assert_eq!(fm.get("date"), Some("2024-01-02"));
    }

    #[test]
    fn keys_and_values_trimmed() {
        let fm = parse_front_matter("---\n  week :  07  \n---\n");
        assert_eq!(fm.get("week"), Some("07"));
    }

    #[test]
    fn empty_block() {
        let text = "---\n---\nBody";
        assert!(parse_front_matter(text).is_empty());
        assert_eq!(extract_body(text), "Body");
    }

    #[test]
    fn trailing_blank_line_removed_once() {
        let text = "---\ntitle: T\n---\n\n\nBody";
        assert_eq!(extract_body(text), "\nBody");
    }

    #[test]
    fn leading_whitespace_of_content_kept() {
        let text = "---\ntitle: T\n---\n    code line\n";
        assert_eq!(extract_body(text), "    code line\n");
    }

    #[test]
    fn crlf_block() {
        let text = "---\r\ntitle: T\r\n---\r\nBody\r\n";
        assert_eq!(parse_front_matter(text).get("title"), Some("T"));
        assert_eq!(extract_body(text), "Body\r\n");
    }

    #[test]
    fn block_at_end_of_text() {
        let text = "---\ntitle: Only\n---";
        assert_eq!(parse_front_matter(text).get("title"), Some("Only"));
        assert_eq!(extract_body(text), "");
    }

    #[test]
    fn unclosed_block_is_not_front_matter() {
        let text = "---\ntitle: T\nBody";
        assert!(parse_front_matter(text).is_empty());
        assert_eq!(extract_body(text), text);
    }
}
