use std::sync::LazyLock;

use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};

use crate::record::ArticleRecord;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([A-Z_]+)\}\}").unwrap());

pub const TITLE: &str = "TITLE";
pub const DATE: &str = "DATE";
pub const WEEK: &str = "WEEK";
pub const LABEL_CLASS: &str = "LABEL_CLASS";
pub const LABEL: &str = "LABEL";
pub const TAGS: &str = "TAGS";
pub const CONTENT: &str = "CONTENT";
pub const ARTICLES_DATA: &str = "ARTICLES_DATA";

/// Markdown → HTML with the common GFM-style extensions.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escape for HTML text and double-quoted attribute context.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn tags_markup(tags: &[String]) -> String {
    tags.iter()
        .map(|t| format!(r#"<span class="tag">{}</span>"#, escape_html(t)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Fill an article template. Substituted values are never re-scanned, so a
/// title containing `{{CONTENT}}` stays literal. Content goes into the first
/// `{{CONTENT}}` only; unknown tokens are left alone.
pub fn render_article(template: &str, record: &ArticleRecord, content_html: &str) -> String {
    let title = escape_html(&record.title);
    let date = escape_html(&record.date);
    let week = escape_html(&record.week);
    let tags = tags_markup(&record.tags);
    let mut content_done = false;

    TOKEN_RE
        .replace_all(template, |caps: &Captures| match &caps[1] {
            TITLE => title.clone(),
            DATE => date.clone(),
            WEEK => week.clone(),
            LABEL_CLASS => record.label.css_class().to_string(),
            LABEL => record.label.text().to_string(),
            TAGS => tags.clone(),
            CONTENT if !content_done => {
                content_done = true;
                content_html.to_string()
            }
            _ => caps[0].to_string(),
        })
        .into_owned()
}

/// Fill the index template with the JSON list of every record in build order.
pub fn render_index(template: &str, records: &[ArticleRecord]) -> serde_json::Result<String> {
    // `</` would end an enclosing <script> element early
    let data = serde_json::to_string(records)?.replace("</", r"<\/");
    Ok(TOKEN_RE
        .replace_all(template, |caps: &Captures| match &caps[1] {
            ARTICLES_DATA => data.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Label;

    fn record() -> ArticleRecord {
        ArticleRecord {
            slug: "s".into(),
            title: r#"Fish & "Chips" <b>"#.into(),
            excerpt: "e".into(),
            date: "2024-01-02".into(),
            week: "07".into(),
            tags: vec!["a<b".into(), "c".into()],
            label: Label::Update,
        }
    }

    #[test]
    fn escapes_four_characters() {
        assert_eq!(escape_html(r#"a&b<c>d"e'f"#), "a&amp;b&lt;c&gt;d&quot;e'f");
    }

    #[test]
    fn article_placeholders() {
        let tpl = "<title>{{TITLE}}</title><h1 data-t=\"{{TITLE}}\">{{TITLE}}</h1>\
                   <p>{{DATE}} W{{WEEK}} <i class=\"{{LABEL_CLASS}}\">{{LABEL}}</i></p>\
                   <div>{{TAGS}}</div><main>{{CONTENT}}</main>{{CONTENT}}{{UNKNOWN}}";
        let out = render_article(tpl, &record(), "<p>body</p>");
        let title = "Fish &amp; &quot;Chips&quot; &lt;b&gt;";
        assert_eq!(out.matches(title).count(), 3);
        assert!(out.contains("2024-01-02 W07"));
        assert!(out.contains(r#"<i class="label-update">Update</i>"#));
        assert!(out.contains("<span class=\"tag\">a&lt;b</span>\n<span class=\"tag\">c</span>"));
        assert!(out.contains("<main><p>body</p></main>{{CONTENT}}{{UNKNOWN}}"));
    }

    #[test]
    fn substituted_values_not_rescanned() {
        let mut rec = record();
        rec.title = "{{CONTENT}}".into();
        let out = render_article("{{TITLE}}|{{CONTENT}}", &rec, "<p>x</p>");
        assert_eq!(out, "{{CONTENT}}|<p>x</p>");
    }

    #[test]
    fn empty_tags_render_empty() {
        let mut rec = record();
        rec.tags.clear();
        assert_eq!(render_article("[{{TAGS}}]", &rec, ""), "[]");
    }

    #[test]
    fn index_embeds_json() {
        let mut rec = record();
        rec.excerpt = "ends </script> here".into();
        let out = render_index("<script>const articles = {{ARTICLES_DATA}};</script>", &[rec]).unwrap();
        assert!(out.starts_with("<script>const articles = [{\"slug\":\"s\""));
        assert!(out.contains(r"<\/script> here"));
        assert!(out.ends_with(";</script>"));

        let json = out
            .trim_start_matches("<script>const articles = ")
            .trim_end_matches(";</script>");
        let parsed: serde_json::Value = serde_json::from_str(json).unwrap();
        assert_eq!(parsed[0]["excerpt"], "ends </script> here");
        assert_eq!(parsed[0]["label"], "update");
    }

    #[test]
    fn index_with_no_articles() {
        assert_eq!(render_index("x={{ARTICLES_DATA}}", &[]).unwrap(), "x=[]");
    }

    #[test]
    fn markdown_renders() {
        let html = markdown_to_html("# Hi\n\nSome *em* and ~~gone~~.\n\n| a |\n|---|\n| 1 |\n");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<em>em</em>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("<table>"));
    }
}
