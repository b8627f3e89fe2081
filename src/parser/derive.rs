use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::front_matter::FrontMatter;
use crate::record::Label;

static EXTENSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\.(md|markdown)$").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static UNSAFE_CHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[/\\:?*"<>|\x00-\x1F\x7F]"#).unwrap());
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.+?)[ \t]*\r?$").unwrap());
static H1_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+.*(?:\r?\n|$)").unwrap());
static HEADING_MARK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^#{1,6}[ \t]+").unwrap());
static IMAGE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());
static EMPHASIS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[*_`~]").unwrap());
static NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?:\r?\n)+").unwrap());

pub const ELLIPSIS: char = '…';

/// Filename → URL/filesystem-safe stem. Whitespace runs collapse to one `-`
/// first; characters reserved on common filesystems then map to `-` one by one.
pub fn slugify(filename: &str) -> String {
    let stem = EXTENSION_RE.replace(filename, "");
    let stem = WHITESPACE_RE.replace_all(&stem, "-");
    UNSAFE_CHAR_RE.replace_all(&stem, "-").into_owned()
}

/// Explicit title, else first `# ` heading, else the slug.
pub fn derive_title(fm: &FrontMatter, body: &str, slug: &str) -> String {
    if let Some(title) = fm.get_non_empty("title") {
        return title.to_string();
    }
    H1_RE
        .captures(body)
        .map(|caps| caps[1].trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| slug.to_string())
}

/// Plain-text preview of the body. Rule order matters: links are unwrapped
/// before the generic marker characters go.
///
/// `drop_title_line` removes the first `# ` line outright; set it when that
/// line supplied the title so the preview doesn't repeat it.
pub fn derive_excerpt(body: &str, max_len: usize, drop_title_line: bool) -> String {
    let text = if drop_title_line {
        H1_LINE_RE.replace(body, "")
    } else {
        Cow::Borrowed(body)
    };
    let text = HEADING_MARK_RE.replace_all(&text, "");
    let text = IMAGE_RE.replace_all(&text, "");
    let text = LINK_RE.replace_all(&text, "$1");
    let text = EMPHASIS_RE.replace_all(&text, "");
    let text = NEWLINES_RE.replace_all(&text, " ");
    let text = text.trim();

    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut excerpt: String = text.chars().take(max_len).collect();
    excerpt.push(ELLIPSIS);
    excerpt
}

/// Explicit date, else the date half of the source timestamp, else empty.
pub fn derive_date(fm: &FrontMatter, modified_time: Option<&str>) -> String {
    if let Some(date) = fm.get_non_empty("date") {
        return date.to_string();
    }
    modified_time
        .and_then(|ts| ts.split('T').next())
        .unwrap_or_default()
        .to_string()
}

/// `tags: a, b` or `tags: [a, b]`. Order and duplicates preserved.
pub fn derive_tags(fm: &FrontMatter) -> Vec<String> {
    let Some(raw) = fm.get_non_empty("tags") else {
        return Vec::new();
    };
    let raw = raw
        .strip_prefix('[')
        .and_then(|r| r.strip_suffix(']'))
        .unwrap_or(raw);
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

pub fn classify(title: &str, tags: &[String], keywords: &[String]) -> Label {
    let haystack = format!("{} {}", title, tags.join(" ")).to_lowercase();
    let hit = keywords
        .iter()
        .filter(|k| !k.is_empty())
        .any(|k| haystack.contains(&k.to_lowercase()));
    if hit {
        Label::Update
    } else {
        Label::Signal
    }
}
