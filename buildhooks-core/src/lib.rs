//! buildhooks core library — lifecycle phases, callbacks, the listener
//! registry, location attribution, configuration and errors.
//!
//! - [`types`] — [`Phase`], [`SourceLocation`], [`Failure`], [`DispatchResult`]
//! - [`callback`] — [`Callback`] variants, [`CallbackContext`], [`Console`]
//! - [`registry`] — [`ListenerRegistry`]
//! - [`location`] — [`LocationResolver`]
//! - [`config`] — `buildhooks.yaml` loading and script discovery
//! - [`error`] — [`RegistrationError`], [`ConfigError`], [`CallbackError`]

pub mod callback;
pub mod config;
pub mod error;
pub mod location;
pub mod registry;
pub mod types;

pub use callback::{
    Action, BuildListener, Callback, CallbackContext, CallbackKind, CallbackOrigin,
    CapturedConsole, Console, StderrConsole, StdoutConsole,
};
pub use config::{BuildConfig, BuildPlan};
pub use error::{CallbackError, ConfigError, RegistrationError};
pub use location::LocationResolver;
pub use registry::ListenerRegistry;
pub use types::{
    DispatchPolicy, DispatchResult, Failure, Phase, ScriptKind, ScriptSource, SourceLocation,
};
