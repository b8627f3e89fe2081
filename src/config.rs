use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::BuildError;
use crate::parser::DeriveOptions;

/// Drive folder used when `DRIVE_FOLDER_ID` is unset.
pub const DEFAULT_FOLDER_ID: &str = "1x9QnVq3yMgG0lqA6v1o7bCkS4tRkWw2E";

pub const ENV_PREFIX: &str = "DRIVE";
pub const DEFAULT_EXCERPT_MAX_LEN: usize = 150;

pub fn default_label_keywords() -> Vec<String> {
    ["update", "更新", "日志"].into_iter().map(String::from).collect()
}

/// Remote source settings, read from `DRIVE_*` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceSettings {
    pub folder_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl SourceSettings {
    pub fn from_env() -> Result<Self, BuildError> {
        Self::load(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn load(env: config::Environment) -> Result<Self, BuildError> {
        let settings = config::Config::builder()
            .set_default("folder_id", DEFAULT_FOLDER_ID)?
            .add_source(env)
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

/// What happens when a single document cannot be fetched or processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log, leave the document out, keep going.
    #[default]
    Skip,
    /// Stop the build on the first failing document.
    Abort,
}

/// Everything the orchestrator needs; passed in explicitly.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub article_template: PathBuf,
    pub index_template: PathBuf,
    pub output_dir: PathBuf,
    pub articles_dir: String,
    pub excerpt_max_len: usize,
    pub label_keywords: Vec<String>,
    pub failure_policy: FailurePolicy,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            article_template: PathBuf::from("templates/article.html"),
            index_template: PathBuf::from("templates/index.html"),
            output_dir: PathBuf::from("dist"),
            articles_dir: "articles".to_string(),
            excerpt_max_len: DEFAULT_EXCERPT_MAX_LEN,
            label_keywords: default_label_keywords(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl BuildConfig {
    pub fn derive_options(&self) -> DeriveOptions {
        DeriveOptions {
            excerpt_max_len: self.excerpt_max_len,
            label_keywords: self.label_keywords.clone(),
        }
    }

    pub fn articles_path(&self) -> PathBuf {
        self.output_dir.join(&self.articles_dir)
    }

    pub fn article_path(&self, slug: &str) -> PathBuf {
        self.articles_path().join(format!("{}.html", slug))
    }

    pub fn index_path(&self) -> PathBuf {
        self.output_dir.join("index.html")
    }

    /// Where the reusable copy of the article template lands.
    pub fn template_copy_path(&self) -> PathBuf {
        let name = self
            .article_template
            .file_name()
            .map(Path::new)
            .unwrap_or_else(|| Path::new("article.html"));
        self.articles_path().join(name)
    }

    /// Slug whose `<slug>.html` page would overwrite the template copy.
    pub fn reserved_slug(&self) -> Option<String> {
        let path = self.template_copy_path();
        if path.extension().and_then(|e| e.to_str()) != Some("html") {
            return None;
        }
        path.file_stem().map(|s| s.to_string_lossy().into_owned())
    }
}
