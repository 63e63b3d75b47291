//! Error types for buildhooks-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Phase;

/// Raised by a callback body. The message is reported verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct CallbackError {
    pub message: String,
}

impl CallbackError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// Registration problems. These are reported at registration time, never
/// deferred to dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// The phase name does not match any [`Phase`].
    #[error("unknown lifecycle phase '{name}'")]
    UnknownPhase { name: String },

    /// The phase has already been dispatched in this build; the callback could never run.
    #[error("cannot register a '{phase}' listener: that phase has already been notified")]
    PhaseAlreadyFired { phase: Phase },

    /// Script-registered callbacks cannot target internal phases.
    #[error("'{phase}' is an internal phase and does not accept script listeners")]
    InternalPhase { phase: Phase },
}

/// Errors from loading `buildhooks.yaml` and resolving script paths.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, unreadable directory, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error with the file path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    /// A script named in the config does not exist.
    #[error("script not found at {path}")]
    ScriptNotFound { path: PathBuf },
}
