use std::path::PathBuf;

use thiserror::Error;

/// Failure classes of a build. Listing, template and output failures are fatal;
/// `Document` and `DuplicateSlug` go through the per-document policy.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("document listing failed: {0:#}")]
    Listing(anyhow::Error),

    #[error("document {name} ({id}) failed: {reason:#}")]
    Document {
        name: String,
        id: String,
        reason: anyhow::Error,
    },

    #[error("slug {slug:?} from {name} collides with another output of this build")]
    DuplicateSlug { slug: String, name: String },

    #[error("template {path:?} unreadable")]
    TemplateMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {path:?}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize article data: {0}")]
    Render(#[from] serde_json::Error),

    #[error("configuration: {0}")]
    Config(#[from] config::ConfigError),
}

impl BuildError {
    /// Whether the per-document failure policy applies to this error.
    pub fn is_per_document(&self) -> bool {
        matches!(self, BuildError::Document { .. } | BuildError::DuplicateSlug { .. })
    }
}
