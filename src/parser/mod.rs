pub mod derive;
pub mod front_matter;

use crate::error::BuildError;
use crate::record::{ArticleRecord, RawDocument};

/// Knobs the record builder needs; a slice of `BuildConfig`.
#[derive(Debug, Clone)]
pub struct DeriveOptions {
    pub excerpt_max_len: usize,
    pub label_keywords: Vec<String>,
}

/// Output of the record builder: the record plus the markdown body the page
/// renderer consumes.
#[derive(Debug, Clone)]
pub struct ParsedArticle {
    pub record: ArticleRecord,
    pub body: String,
}

/// Two-pass pipeline: raw text → front matter + body → article record.
///
/// `position` is the 1-based index of the document in the filtered listing and
/// only feeds the week fallback.
pub fn build_record(
    doc: &RawDocument,
    position: usize,
    opts: &DeriveOptions,
) -> Result<ParsedArticle, BuildError> {
    if position == 0 {
        return Err(BuildError::Document {
            name: doc.name.clone(),
            id: doc.id.clone(),
            reason: anyhow::anyhow!("batch position is 1-based, got 0"),
        });
    }

    let fm = front_matter::parse_front_matter(&doc.content);
    let body = front_matter::extract_body(&doc.content);

    let slug = derive::slugify(&doc.name);
    if slug.is_empty() {
        return Err(BuildError::Document {
            name: doc.name.clone(),
            id: doc.id.clone(),
            reason: anyhow::anyhow!("filename yields an empty slug"),
        });
    }

    let title = derive::derive_title(&fm, body, &slug);
    // The leading `# ` line is the title only when front matter didn't name one
    let title_from_heading = fm.get_non_empty("title").is_none();
    let excerpt = derive::derive_excerpt(body, opts.excerpt_max_len, title_from_heading);
    let date = derive::derive_date(&fm, doc.modified_time.as_deref());
    let week = fm
        .get_non_empty("week")
        .map(String::from)
        .unwrap_or_else(|| format!("{:02}", position));
    let tags = derive::derive_tags(&fm);
    let label = derive::classify(&title, &tags, &opts.label_keywords);

    tracing::debug!(
        name = %doc.name,
        slug = %slug,
        front_matter = !fm.is_empty(),
        "derived record"
    );

    Ok(ParsedArticle {
        record: ArticleRecord {
            slug,
            title,
            excerpt,
            date,
            week,
            tags,
            label,
        },
        body: body.to_string(),
    })
}
