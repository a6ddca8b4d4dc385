//! Generator error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while generating constructors from a catalog.
///
/// Catalog and pattern failures abort the run. Everything else is
/// scoped to one catalog entry: the entry is skipped and the run goes on.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to read catalog {path}: {source}")]
    CatalogRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to compile validation pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid entry {code:?}: {reason}")]
    InvalidEntry { code: String, reason: String },

    #[error("duplicate error code {0:?}")]
    DuplicateCode(String),

    #[error("failed to render {code}: {source}")]
    Render {
        code: String,
        #[source]
        source: std::fmt::Error,
    },

    #[error("generated source for {code} is malformed: {reason}")]
    Malformed { code: String, reason: String },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read module index {path}: {source}")]
    IndexRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write to stdout: {0}")]
    Stdout(#[source] std::io::Error),
}

impl GenerateError {
    pub(crate) fn invalid(code: &str, reason: impl Into<String>) -> Self {
        Self::InvalidEntry {
            code: code.to_string(),
            reason: reason.into(),
        }
    }

    /// True for failures that abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::CatalogRead { .. } | Self::CatalogParse { .. } | Self::Pattern(_)
        )
    }
}

pub type Result<T, E = GenerateError> = std::result::Result<T, E>;
