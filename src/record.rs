use serde::{Deserialize, Serialize};

/// One entry of a source listing. Content is fetched separately.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMeta {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub modified_time: Option<String>,
}

/// A fetched document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub id: String,
    pub name: String,
    pub modified_time: Option<String>,
    pub content: String,
}

impl RawDocument {
    pub fn new(meta: DocumentMeta, content: String) -> Self {
        Self {
            id: meta.id,
            name: meta.name,
            modified_time: meta.modified_time,
            content,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Update,
    Signal,
}

impl Label {
    pub fn css_class(self) -> &'static str {
        match self {
            Label::Update => "label-update",
            Label::Signal => "label-signal",
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Label::Update => "Update",
            Label::Signal => "Signal",
        }
    }
}

/// Normalized per-article data; the ordered list of these is what the index
/// page embeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleRecord {
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub date: String,
    pub week: String,
    pub tags: Vec<String>,
    pub label: Label,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_json_shape() {
        let rec = ArticleRecord {
            slug: "week01-notes".into(),
            title: "Hello".into(),
            excerpt: "World".into(),
            date: "2024-01-01".into(),
            week: "01".into(),
            tags: vec!["a".into()],
            label: Label::Signal,
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["label"], "signal");
        assert_eq!(json["week"], "01");
        assert_eq!(json["tags"][0], "a");
    }

    #[test]
    fn drive_listing_entry_deserializes() {
        let meta: DocumentMeta = serde_json::from_str(
            r#"{"id":"abc","name":"a.md","mimeType":"text/markdown","modifiedTime":"2024-02-03T04:05:06.000Z"}"#,
        )
        .unwrap();
        assert_eq!(meta.mime_type.as_deref(), Some("text/markdown"));
        assert_eq!(meta.modified_time.as_deref(), Some("2024-02-03T04:05:06.000Z"));
    }
}
