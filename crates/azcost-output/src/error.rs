//! Error types for presentation and export.

use std::path::PathBuf;

use thiserror::Error;

/// Output errors.
#[derive(Debug, Error)]
pub enum OutputError {
    /// Export file could not be written
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Interactive prompt failed
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Unrecognized export choice
    #[error("unknown export choice '{0}' (expected detailed, summary, both or skip)")]
    UnknownSelection(String),
}

/// Result alias for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;

impl OutputError {
    pub(crate) fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Write {
            path: path.into(),
            source,
        }
    }
}
