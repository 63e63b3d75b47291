//! Error types for buildhooks-script.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading or parsing a hook script.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Syntax error with the script identifier and 1-based line.
    #[error("{script} line {line}: {message}")]
    Parse { script: String, line: u32, message: String },
}
