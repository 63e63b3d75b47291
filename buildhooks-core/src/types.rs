//! Domain types for the build lifecycle listener core.
//!
//! Everything here is plain data: phases, script identities, source
//! locations, failures and per-phase dispatch results. Behaviour lives in
//! [`crate::registry`], [`crate::location`] and the `buildhooks-dispatch` crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// A named point in the build lifecycle at which registered callbacks run.
///
/// Variants are declared in lifecycle order; `Ord` follows that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SettingsEvaluated,
    ProjectsLoaded,
    ProjectsEvaluated,
    TaskGraphReady,
    BuildFinished,
    /// Internal notification; always dispatched last, once per build.
    RootBuildCompletion,
}

impl Phase {
    /// All phases in dispatch order.
    pub fn all() -> &'static [Phase] {
        &[
            Phase::SettingsEvaluated,
            Phase::ProjectsLoaded,
            Phase::ProjectsEvaluated,
            Phase::TaskGraphReady,
            Phase::BuildFinished,
            Phase::RootBuildCompletion,
        ]
    }

    /// Phases user scripts and listener objects may register against.
    pub fn public() -> &'static [Phase] {
        &Self::all()[..5]
    }

    /// Whether a failing callback in this phase carries a [`SourceLocation`].
    pub fn location_attributed(self) -> bool {
        !matches!(self, Phase::BuildFinished | Phase::RootBuildCompletion)
    }

    /// Internal phases only accept system-registered callbacks.
    pub fn is_internal(self) -> bool {
        matches!(self, Phase::RootBuildCompletion)
    }

    /// Stable snake_case name used by scripts, logs and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Phase::SettingsEvaluated => "settings_evaluated",
            Phase::ProjectsLoaded => "projects_loaded",
            Phase::ProjectsEvaluated => "projects_evaluated",
            Phase::TaskGraphReady => "task_graph_ready",
            Phase::BuildFinished => "build_finished",
            Phase::RootBuildCompletion => "root_build_completion",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Phase {
    type Err = RegistrationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Phase::all()
            .iter()
            .copied()
            .find(|p| p.name() == s)
            .ok_or_else(|| RegistrationError::UnknownPhase { name: s.to_owned() })
    }
}

// ---------------------------------------------------------------------------
// Script identity and source locations
// ---------------------------------------------------------------------------

/// The kind of script a callback was registered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptKind {
    BuildFile,
    SettingsFile,
    InitScript,
}

impl fmt::Display for ScriptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptKind::BuildFile => write!(f, "Build file"),
            ScriptKind::SettingsFile => write!(f, "Settings file"),
            ScriptKind::InitScript => write!(f, "Initialization script"),
        }
    }
}

/// Registration-time identity of a script: its kind plus an identifier
/// (usually the file path as the user wrote it).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScriptSource {
    pub kind: ScriptKind,
    pub identifier: String,
}

impl ScriptSource {
    pub fn new(kind: ScriptKind, identifier: impl Into<String>) -> Self {
        Self { kind, identifier: identifier.into() }
    }

    pub fn build_file(identifier: impl Into<String>) -> Self {
        Self::new(ScriptKind::BuildFile, identifier)
    }

    pub fn settings_file(identifier: impl Into<String>) -> Self {
        Self::new(ScriptKind::SettingsFile, identifier)
    }

    pub fn init_script(identifier: impl Into<String>) -> Self {
        Self::new(ScriptKind::InitScript, identifier)
    }
}

impl fmt::Display for ScriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.kind, self.identifier)
    }
}

/// Script plus 1-based line of the statement that was executing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub source: ScriptSource,
    pub line: u32,
}

impl SourceLocation {
    /// Returns `None` for line `0`; lines are 1-based.
    pub fn new(source: ScriptSource, line: u32) -> Option<Self> {
        (line >= 1).then_some(Self { source, line })
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} line: {}", self.source, self.line)
    }
}

// ---------------------------------------------------------------------------
// Failure
// ---------------------------------------------------------------------------

/// A captured build failure.
///
/// Callback errors are never wrapped: their message becomes `description`
/// and `cause` stays `None`. Only script evaluation problems carry a cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<Failure>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Failure {
    pub fn new(description: impl Into<String>) -> Self {
        Self { description: description.into(), cause: None, location: None }
    }

    pub fn with_location(mut self, location: Option<SourceLocation>) -> Self {
        self.location = location;
        self
    }

    pub fn with_cause(mut self, cause: Failure) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn cause(&self) -> Option<&Failure> {
        self.cause.as_deref()
    }

    /// Iterates the cause chain, nearest cause first. Excludes `self`.
    pub fn causes(&self) -> impl Iterator<Item = &Failure> {
        std::iter::successors(self.cause(), |f| f.cause())
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|c| c as &(dyn std::error::Error + 'static))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Outcome of dispatching one phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchResult {
    Success,
    Failed(Failure),
}

impl DispatchResult {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchResult::Success)
    }

    pub fn failure(&self) -> Option<&Failure> {
        match self {
            DispatchResult::Success => None,
            DispatchResult::Failed(f) => Some(f),
        }
    }

    pub fn into_failure(self) -> Option<Failure> {
        match self {
            DispatchResult::Success => None,
            DispatchResult::Failed(f) => Some(f),
        }
    }
}

/// What a dispatcher does after the first callback in a phase fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchPolicy {
    /// Stop invoking the phase's remaining callbacks.
    #[default]
    FailFast,
    /// Invoke the remaining callbacks anyway; the first failure still wins.
    RunAll,
}

impl fmt::Display for DispatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchPolicy::FailFast => write!(f, "fail_fast"),
            DispatchPolicy::RunAll => write!(f, "run_all"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
