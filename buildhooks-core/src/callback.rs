//! Callbacks, the per-invocation context they run in, and the console they
//! write to.
//!
//! Three registration styles share one invocation capability:
//!
//! | Style            | Variant                         | Registered via                                  |
//! |------------------|---------------------------------|-------------------------------------------------|
//! | closure block    | [`CallbackKind::Closure`]        | [`Callback::closure`]                           |
//! | action object    | [`CallbackKind::Action`]         | [`Callback::action`]                            |
//! | listener method  | [`CallbackKind::ListenerMethod`] | `ListenerRegistry::add_multi_phase_listener`    |
//!
//! The variant is fixed when the callback is built; [`Callback::invoke`]
//! only matches on it.

use std::fmt;
use std::rc::Rc;

use crate::error::CallbackError;
use crate::types::{Failure, Phase, ScriptSource};

// ---------------------------------------------------------------------------
// Console
// ---------------------------------------------------------------------------

/// Ordered sink for text produced by callback bodies and scripts.
pub trait Console {
    fn line(&mut self, text: &str);
}

/// Writes every line to stdout as soon as it is produced.
#[derive(Debug, Default)]
pub struct StdoutConsole;

impl Console for StdoutConsole {
    fn line(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Writes every line to stderr, keeping stdout free for a machine-readable report.
#[derive(Debug, Default)]
pub struct StderrConsole;

impl Console for StderrConsole {
    fn line(&mut self, text: &str) {
        eprintln!("{text}");
    }
}

/// Records lines in order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CapturedConsole {
    pub lines: Vec<String>,
}

impl CapturedConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first line equal to `text`.
    pub fn position(&self, text: &str) -> Option<usize> {
        self.lines.iter().position(|l| l == text)
    }
}

impl Console for CapturedConsole {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_owned());
    }
}

// ---------------------------------------------------------------------------
// CallbackContext
// ---------------------------------------------------------------------------

/// Execution context handed to a callback for one invocation.
///
/// Script bodies call [`CallbackContext::at_line`] before each statement, so
/// the line of the failing statement is still here when the body returns
/// `Err`. The dispatcher reads it before the context is dropped.
pub struct CallbackContext<'a> {
    console: &'a mut dyn Console,
    line: Option<u32>,
    build_failure: Option<&'a Failure>,
}

impl<'a> CallbackContext<'a> {
    pub fn new(console: &'a mut dyn Console) -> Self {
        Self { console, line: None, build_failure: None }
    }

    /// Exposes the build's first failure so far (build-finished style listeners).
    pub fn with_build_failure(mut self, failure: Option<&'a Failure>) -> Self {
        self.build_failure = failure;
        self
    }

    /// Marks the statement about to execute.
    pub fn at_line(&mut self, line: u32) {
        self.line = Some(line);
    }

    pub fn current_line(&self) -> Option<u32> {
        self.line
    }

    pub fn println(&mut self, text: &str) {
        self.console.line(text);
    }

    pub fn build_failure(&self) -> Option<&Failure> {
        self.build_failure
    }
}

// ---------------------------------------------------------------------------
// Callback styles
// ---------------------------------------------------------------------------

/// Closure-style callback body.
pub type CallbackFn = dyn Fn(&mut CallbackContext<'_>) -> Result<(), CallbackError>;

/// An explicit action object registered for a single phase.
pub trait Action {
    fn execute(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError>;
}

/// A listener object answering several phases through one method each.
///
/// `handles` declares which methods are implemented; each listed public
/// phase is registered in lifecycle order. Unlisted methods are never called.
pub trait BuildListener {
    fn handles(&self) -> &[Phase];

    fn settings_evaluated(&self, _ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        Ok(())
    }

    fn projects_loaded(&self, _ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        Ok(())
    }

    fn projects_evaluated(&self, _ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        Ok(())
    }

    fn task_graph_ready(&self, _ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        Ok(())
    }

    fn build_finished(&self, _ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        Ok(())
    }
}

fn call_listener_method(
    listener: &dyn BuildListener,
    phase: Phase,
    ctx: &mut CallbackContext<'_>,
) -> Result<(), CallbackError> {
    match phase {
        Phase::SettingsEvaluated => listener.settings_evaluated(ctx),
        Phase::ProjectsLoaded => listener.projects_loaded(ctx),
        Phase::ProjectsEvaluated => listener.projects_evaluated(ctx),
        Phase::TaskGraphReady => listener.task_graph_ready(ctx),
        Phase::BuildFinished => listener.build_finished(ctx),
        // Not a listener method; registry never builds this combination.
        Phase::RootBuildCompletion => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Callback
// ---------------------------------------------------------------------------

/// Where a callback was registered from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOrigin {
    /// Registered while evaluating a script.
    Script(ScriptSource),
    /// Registered by the system; never location-attributed.
    Internal,
}

pub enum CallbackKind {
    Closure(Box<CallbackFn>),
    Action(Box<dyn Action>),
    ListenerMethod { listener: Rc<dyn BuildListener>, phase: Phase },
}

impl CallbackKind {
    pub fn style(&self) -> &'static str {
        match self {
            CallbackKind::Closure(_) => "closure",
            CallbackKind::Action(_) => "action",
            CallbackKind::ListenerMethod { .. } => "listener",
        }
    }
}

/// One registered unit of work.
pub struct Callback {
    kind: CallbackKind,
    origin: CallbackOrigin,
}

impl Callback {
    pub fn closure<F>(origin: CallbackOrigin, body: F) -> Self
    where
        F: Fn(&mut CallbackContext<'_>) -> Result<(), CallbackError> + 'static,
    {
        Self { kind: CallbackKind::Closure(Box::new(body)), origin }
    }

    pub fn action(origin: CallbackOrigin, action: impl Action + 'static) -> Self {
        Self { kind: CallbackKind::Action(Box::new(action)), origin }
    }

    pub fn listener_method(
        origin: CallbackOrigin,
        listener: Rc<dyn BuildListener>,
        phase: Phase,
    ) -> Self {
        Self { kind: CallbackKind::ListenerMethod { listener, phase }, origin }
    }

    pub fn kind(&self) -> &CallbackKind {
        &self.kind
    }

    pub fn origin(&self) -> &CallbackOrigin {
        &self.origin
    }

    /// Runs the callback body to completion or failure.
    pub fn invoke(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        match &self.kind {
            CallbackKind::Closure(body) => body(ctx),
            CallbackKind::Action(action) => action.execute(ctx),
            CallbackKind::ListenerMethod { listener, phase } => {
                call_listener_method(listener.as_ref(), *phase, ctx)
            }
        }
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("style", &self.kind.style())
            .field("origin", &self.origin)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
