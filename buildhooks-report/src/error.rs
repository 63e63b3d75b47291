//! Error types for buildhooks-report.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while rendering a report.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (`--json` reports).
    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem error while loading override templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
