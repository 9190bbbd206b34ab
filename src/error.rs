//! Build error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the site.
///
/// Everything except [`BuildError::Rasterization`] aborts the build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Front-matter missing, unterminated, not YAML, or lacking a required field
    #[error("malformed record {path:?}: {message}")]
    MalformedRecord { path: PathBuf, message: String },

    /// The body compiler rejected a record
    #[error("failed to compile {slug}: {message}")]
    Compilation { slug: String, message: String },

    /// A preview image could not be produced
    #[error("failed to render preview image {name}: {message}")]
    Rasterization { name: String, message: String },

    /// A required page template is missing or unreadable
    #[error("missing template {path:?}: {source}")]
    Template {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Two content files map to the same output path
    #[error("slug conflict for '{slug}': {first:?} and {second:?}")]
    SlugConflict {
        slug: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("invalid configuration {path:?}: {message}")]
    Config { path: PathBuf, message: String },

    /// A font asset could not be loaded
    #[error("failed to load asset {path:?}: {source}")]
    Asset {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A build task panicked or was cancelled
    #[error("build worker failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, BuildError>;

impl BuildError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole build
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Rasterization { .. })
    }
}
