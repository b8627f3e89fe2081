mod config;
mod error;
mod output;
mod parser;
mod pipeline;
mod record;
mod render;
mod source;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::config::{BuildConfig, FailurePolicy, SourceSettings};
use record::{DocumentMeta, RawDocument};
use source::{DocumentSource, DriveSource, LocalSource};

#[derive(Parser)]
#[command(name = "site_builder", about = "Build article pages and an index from markdown in a Drive folder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every markdown document and regenerate article pages + index
    Build {
        /// Read markdown from this directory instead of Drive
        #[arg(long)]
        local: Option<PathBuf>,
        /// Output root (articles go under <out>/articles)
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        article_template: Option<PathBuf>,
        #[arg(long)]
        index_template: Option<PathBuf>,
        /// Stop on the first failing document instead of skipping it
        #[arg(long)]
        fail_fast: bool,
    },
    /// Show the filtered document listing in build order
    List {
        /// Read markdown from this directory instead of Drive
        #[arg(long)]
        local: Option<PathBuf>,
    },
    /// Derive the record for one local markdown file and print it as JSON
    Preview {
        file: PathBuf,
        /// Position in the batch, used for the week fallback
        #[arg(short, long, default_value = "1")]
        position: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Build {
            local,
            out,
            article_template,
            index_template,
            fail_fast,
        } => {
            let mut cfg = BuildConfig::default();
            if let Some(out) = out {
                cfg.output_dir = out;
            }
            if let Some(path) = article_template {
                cfg.article_template = path;
            }
            if let Some(path) = index_template {
                cfg.index_template = path;
            }
            if fail_fast {
                cfg.failure_policy = FailurePolicy::Abort;
            }

            let stats = match local {
                Some(dir) => pipeline::run_build(&LocalSource::new(dir), &cfg).await?,
                None => pipeline::run_build(&drive_source()?, &cfg).await?,
            };
            println!(
                "Done: {} documents ({} built, {} skipped), {} files written to {}.",
                stats.total,
                stats.ok,
                stats.skipped,
                stats.written,
                cfg.output_dir.display()
            );
            Ok(())
        }
        Commands::List { local } => {
            let docs = match local {
                Some(dir) => LocalSource::new(dir).list_markdown().await?,
                None => drive_source()?.list_markdown().await?,
            };
            print_listing(&docs);
            Ok(())
        }
        Commands::Preview { file, position } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let doc = RawDocument {
                id: file.to_string_lossy().into_owned(),
                name,
                modified_time: None,
                content,
            };
            let parsed = parser::build_record(&doc, position, &BuildConfig::default().derive_options())?;
            println!("{}", serde_json::to_string_pretty(&parsed.record)?);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn drive_source() -> anyhow::Result<DriveSource> {
    let settings = SourceSettings::from_env()?;
    let api_key = settings
        .api_key
        .context("DRIVE_API_KEY environment variable must be set (or use --local)")?;
    Ok(DriveSource::new(settings.folder_id, api_key))
}

fn print_listing(docs: &[DocumentMeta]) {
    if docs.is_empty() {
        println!("No markdown documents found.");
        return;
    }

    println!("{:>3} | {:<40} | {:<10} | {:<34}", "#", "Name", "Modified", "Id");
    println!("{}", "-".repeat(96));
    for (i, d) in docs.iter().enumerate() {
        let modified = d
            .modified_time
            .as_deref()
            .and_then(|t| t.split('T').next())
            .unwrap_or("-");
        println!(
            "{:>3} | {:<40} | {:<10} | {:<34}",
            i + 1,
            truncate(&d.name, 40),
            modified,
            truncate(&d.id, 34)
        );
    }
    println!("\n{} documents", docs.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_build_flags() {
        let cli = Cli::try_parse_from(["site_builder", "build", "--local", "docs", "-o", "public", "--fail-fast"]).unwrap();
        match cli.command {
            Commands::Build { local, out, fail_fast, .. } => {
                assert_eq!(local, Some(PathBuf::from("docs")));
                assert_eq!(out, Some(PathBuf::from("public")));
                assert!(fail_fast);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn truncate_keeps_width() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long document name.md", 10), "a very ...");
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(std::time::Duration::from_secs(75)), "1m 15s");
        assert_eq!(format_duration(std::time::Duration::from_secs(3725)), "1h 2m 5s");
    }
}
