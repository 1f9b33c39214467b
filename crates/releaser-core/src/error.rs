//! Error taxonomy for a release run.
//!
//! Every variant is fatal for the current run; nothing here is retried except
//! asset availability polling, which happens below this layer (see `retry`).

use thiserror::Error;

use crate::template::RenderError;

/// Top-level error returned by the release components.
#[derive(Debug, Error)]
pub enum ReleaseError {
    /// Git ref is neither `refs/tags/<tag>` nor the default branch.
    #[error("failed to parse release tag name from ref '{0}'")]
    UnrecognizedRef(String),

    /// Tag (or project manifest) yields no semantic version.
    #[error("unable to extract semver from '{0}'")]
    UnparseableVersion(String),

    /// An asset could not be downloaded or hashed, or the release was not found.
    #[error("checksum resolution failed for {url}: {reason}")]
    ResolutionFailed { url: String, reason: String },

    /// Template could not be rendered into a valid manifest.
    #[error("template render failed: {0}")]
    TemplateRender(#[from] RenderError),

    /// A URL has no path segment usable as a filename.
    #[error("failed to find filename from asset url '{0}'")]
    FilenameExtraction(String),

    /// Non-asset HTTP call (API, upload, webhook) failed.
    #[error("{0}")]
    Http(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReleaseError {
    pub(crate) fn resolution(url: impl Into<String>, reason: impl ToString) -> Self {
        ReleaseError::ResolutionFailed {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = ReleaseError> = std::result::Result<T, E>;
