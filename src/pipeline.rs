use std::collections::HashSet;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::config::{BuildConfig, FailurePolicy};
use crate::error::BuildError;
use crate::output;
use crate::parser::{self, DeriveOptions};
use crate::record::{ArticleRecord, DocumentMeta, RawDocument};
use crate::render;
use crate::source::DocumentSource;

/// Build stats returned after completion.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildStats {
    pub total: usize,
    pub ok: usize,
    pub skipped: usize,
    /// Files actually rewritten (unchanged outputs are left alone).
    pub written: usize,
}

struct Templates {
    article: String,
    index: String,
}

/// List → fetch → parse → render → write, one document at a time in listing
/// order, then write the index over every record that made it.
pub async fn run_build<S: DocumentSource>(
    source: &S,
    cfg: &BuildConfig,
) -> Result<BuildStats, BuildError> {
    let templates = Templates {
        article: output::read_template(&cfg.article_template)?,
        index: output::read_template(&cfg.index_template)?,
    };

    let docs = source.list_markdown().await.map_err(BuildError::Listing)?;

    output::ensure_dir(&cfg.articles_path())?;
    let mut stats = BuildStats {
        total: docs.len(),
        ..Default::default()
    };
    if output::write_if_changed(&cfg.template_copy_path(), &templates.article)? {
        stats.written += 1;
    }

    let pb = ProgressBar::new(docs.len() as u64);
    pb.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let opts = cfg.derive_options();
    let mut records: Vec<ArticleRecord> = Vec::with_capacity(docs.len());
    // The template copy shares the articles directory with the pages
    let mut seen_slugs: HashSet<String> = cfg.reserved_slug().into_iter().collect();

    for (i, meta) in docs.iter().enumerate() {
        pb.set_message(meta.name.clone());
        let result =
            process_one(source, meta, i + 1, cfg, &opts, &templates.article, &seen_slugs).await;

        match result {
            Ok((record, written)) => {
                seen_slugs.insert(record.slug.clone());
                records.push(record);
                stats.ok += 1;
                if written {
                    stats.written += 1;
                }
            }
            Err(e) if e.is_per_document() && cfg.failure_policy == FailurePolicy::Skip => {
                warn!(name = %meta.name, id = %meta.id, "Skipping document: {}", e);
                stats.skipped += 1;
            }
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let index = render::render_index(&templates.index, &records)?;
    if output::write_if_changed(&cfg.index_path(), &index)? {
        stats.written += 1;
    }

    info!(
        "Built {} of {} articles ({} skipped, {} files written)",
        stats.ok, stats.total, stats.skipped, stats.written
    );
    Ok(stats)
}

async fn process_one<S: DocumentSource>(
    source: &S,
    meta: &DocumentMeta,
    position: usize,
    cfg: &BuildConfig,
    opts: &DeriveOptions,
    article_template: &str,
    seen_slugs: &HashSet<String>,
) -> Result<(ArticleRecord, bool), BuildError> {
    let content = source
        .fetch(meta)
        .await
        .map_err(|reason| BuildError::Document {
            name: meta.name.clone(),
            id: meta.id.clone(),
            reason,
        })?;
    let doc = RawDocument::new(meta.clone(), content);

    let parsed = parser::build_record(&doc, position, opts)?;
    if seen_slugs.contains(&parsed.record.slug) {
        return Err(BuildError::DuplicateSlug {
            slug: parsed.record.slug,
            name: doc.name,
        });
    }

    let content_html = render::markdown_to_html(&parsed.body);
    let page = render::render_article(article_template, &parsed.record, &content_html);
    let path = cfg.article_path(&parsed.record.slug);
    let written = output::write_if_changed(&path, &page)?;

    info!(
        name = %doc.name,
        slug = %parsed.record.slug,
        week = %parsed.record.week,
        label = parsed.record.label.text(),
        "Processed document"
    );
    Ok((parsed.record, written))
}
