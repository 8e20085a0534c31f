//! Error types for catalog runs.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a catalog run.
///
/// Every variant is fatal: a run stops at the first error and the output
/// directory must be regenerated from scratch.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Invalid or missing option, detected before traversal starts.
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Failure listing, statting, or reading from a source filesystem.
    #[error("Failed to read {path}: {source}")]
    FilesystemRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failure creating or writing any catalog artifact.
    #[error("Failed to write {path}: {source}")]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a source read error with path context.
    pub fn read(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FilesystemRead {
            path: path.into(),
            source,
        }
    }

    /// Create an output write error with path context.
    pub fn write(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::OutputWrite {
            path: path.into(),
            source,
        }
    }
}
