//! Error types for the build pipeline.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while building the blog.
#[derive(Error, Debug)]
pub enum BuildError {
    /// I/O error on a specific file or directory.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A list page does not contain the markers of a slot.
    #[error("slot `{slot}` not found in list page {page:?}")]
    SlotNotFound { slot: &'static str, page: PathBuf },

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Refused to overwrite an existing file.
    #[error("file already exists: {0:?}")]
    AlreadyExists(PathBuf),

    /// Unsupported language code.
    #[error("unknown language `{0}`, expected `zh` or `en`")]
    UnknownLanguage(String),

    /// Post title is empty.
    #[error("a post title is required")]
    EmptyTitle,
}

impl BuildError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Result alias for pipeline operations.
pub type Result<T> = std::result::Result<T, BuildError>;
