//! Error types for runstat
//!
//! Every variant names the pipeline stage that failed (load, aggregate, render)
//! and the file or column involved.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// runstat error types
#[derive(Error, Debug)]
pub enum Error {
    /// Input table missing, unreadable, or malformed (load stage)
    #[error("Data source error ({}): {reason}", path.display())]
    DataSource {
        /// Input resource that failed
        path: PathBuf,
        /// What went wrong, including the offending column when known
        reason: String,
    },

    /// Non-numeric metric data inside a successful subset (aggregate stage)
    #[error("Aggregation error for variant '{variant}', column '{column}': {reason}")]
    Aggregation {
        /// Variant label whose successful runs contain the bad cell
        variant: String,
        /// Metric column name
        column: String,
        /// What went wrong
        reason: String,
    },

    /// Report destination not writable or backend failure (render stage)
    #[error("Render error ({}): {reason}", path.display())]
    Render {
        /// Output destination
        path: PathBuf,
        /// What went wrong
        reason: String,
    },
}

impl Error {
    pub(crate) fn data_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn render(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Render {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
