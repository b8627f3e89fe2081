use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use crate::record::DocumentMeta;

const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType, modifiedTime)";
const PAGE_SIZE: &str = "1000";

const MARKDOWN_EXTENSIONS: &[&str] = &[".md", ".markdown"];
const MARKDOWN_MIME_TYPES: &[&str] = &["text/markdown", "text/x-markdown"];

/// Where markdown documents come from. Listing order is the build order.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    /// All documents, name-descending, before markdown filtering.
    async fn list(&self) -> Result<Vec<DocumentMeta>>;

    async fn fetch(&self, meta: &DocumentMeta) -> Result<String>;

    /// Listing restricted to markdown documents, order preserved.
    async fn list_markdown(&self) -> Result<Vec<DocumentMeta>> {
        let all = self.list().await?;
        let total = all.len();
        let filtered: Vec<DocumentMeta> = all.into_iter().filter(is_markdown).collect();
        info!("Markdown documents after filtering: {} of {}", filtered.len(), total);
        Ok(filtered)
    }
}

/// Name suffix or media type marks a markdown document.
pub fn is_markdown(meta: &DocumentMeta) -> bool {
    let name = meta.name.to_lowercase();
    MARKDOWN_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        || meta
            .mime_type
            .as_deref()
            .is_some_and(|m| MARKDOWN_MIME_TYPES.contains(&m))
}

// ── Google Drive ──

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DocumentMeta>,
    next_page_token: Option<String>,
}

/// Google Drive v3 folder, read with an API key.
pub struct DriveSource {
    client: reqwest::Client,
    folder_id: String,
    api_key: String,
}

impl DriveSource {
    pub fn new(folder_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            folder_id: folder_id.into(),
            api_key: api_key.into(),
        }
    }
}

impl DocumentSource for DriveSource {
    async fn list(&self) -> Result<Vec<DocumentMeta>> {
        let query = format!("'{}' in parents and trashed = false", self.folder_id);
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        info!("Listing Drive folder {}", self.folder_id);
        loop {
            let mut params = vec![
                ("q", query.as_str()),
                ("orderBy", "name desc"),
                ("fields", LIST_FIELDS),
                ("pageSize", PAGE_SIZE),
                ("key", self.api_key.as_str()),
            ];
            if let Some(token) = page_token.as_deref() {
                params.push(("pageToken", token));
            }

            let page: FileList = self
                .client
                .get(DRIVE_FILES_URL)
                .query(&params)
                .send()
                .await
                .context("Drive listing request failed")?
                .error_for_status()
                .context("Drive listing returned an error status")?
                .json()
                .await
                .context("Drive listing response is not a file list")?;

            debug!(count = page.files.len(), "listing page");
            files.extend(page.files);
            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        info!("Total files in folder: {}", files.len());
        Ok(files)
    }

    async fn fetch(&self, meta: &DocumentMeta) -> Result<String> {
        let url = format!("{}/{}", DRIVE_FILES_URL, meta.id);
        let text = self
            .client
            .get(&url)
            .query(&[("alt", "media"), ("key", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to download {}", meta.name))?
            .error_for_status()
            .with_context(|| format!("Download of {} returned an error status", meta.name))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", meta.name))?;
        Ok(text)
    }
}

// ── Local directory ──

/// A directory of markdown files. The file path doubles as the document id.
pub struct LocalSource {
    dir: PathBuf,
}

impl LocalSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl DocumentSource for LocalSource {
    async fn list(&self) -> Result<Vec<DocumentMeta>> {
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .with_context(|| format!("Cannot read source directory {:?}", self.dir))?;

        let mut files = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let modified_time = metadata
                .modified()
                .ok()
                .map(|t| DateTime::<Utc>::from(t).to_rfc3339_opts(SecondsFormat::Millis, true));
            files.push(DocumentMeta {
                id: entry.path().to_string_lossy().into_owned(),
                name: entry.file_name().to_string_lossy().into_owned(),
                mime_type: None,
                modified_time,
            });
        }

        files.sort_by(|a, b| b.name.cmp(&a.name));
        info!("Total files in {:?}: {}", self.dir, files.len());
        Ok(files)
    }

    async fn fetch(&self, meta: &DocumentMeta) -> Result<String> {
        tokio::fs::read_to_string(&meta.id)
            .await
            .with_context(|| format!("Failed to read {}", meta.id))
    }
}
