//! Evaluating a parsed script against a registry.
//!
//! Top-level `println`/`fail` run immediately. Listener blocks become
//! [`Callback`]s whose origin is this script, so a failure inside one is
//! attributed to this script and the failing line.

use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

use buildhooks_core::{
    Action, BuildListener, Callback, CallbackContext, CallbackError, CallbackOrigin, Failure,
    Phase, ScriptKind, ScriptSource, SourceLocation,
};
use buildhooks_dispatch::EvaluationScope;

use crate::error::ScriptError;
use crate::parser::{self, Body, Command, Method, Statement, Step};

// ---------------------------------------------------------------------------
// Body execution
// ---------------------------------------------------------------------------

/// Runs steps in order, marking each line on the context before it executes.
fn run_steps(steps: &[Step], ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
    for step in steps {
        ctx.at_line(step.line);
        match &step.command {
            Command::Println(text) => ctx.println(text),
            Command::Fail(message) => return Err(CallbackError::new(message.clone())),
        }
    }
    Ok(())
}

struct ScriptAction {
    body: Body,
}

impl Action for ScriptAction {
    fn execute(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        run_steps(&self.body, ctx)
    }
}

struct ScriptListener {
    phases: Vec<Phase>,
    methods: BTreeMap<Phase, Body>,
}

impl ScriptListener {
    fn call(&self, phase: Phase, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        match self.methods.get(&phase) {
            Some(body) => run_steps(body, ctx),
            None => Ok(()),
        }
    }
}

impl BuildListener for ScriptListener {
    fn handles(&self) -> &[Phase] {
        &self.phases
    }

    fn settings_evaluated(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        self.call(Phase::SettingsEvaluated, ctx)
    }

    fn projects_loaded(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        self.call(Phase::ProjectsLoaded, ctx)
    }

    fn projects_evaluated(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        self.call(Phase::ProjectsEvaluated, ctx)
    }

    fn task_graph_ready(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        self.call(Phase::TaskGraphReady, ctx)
    }

    fn build_finished(&self, ctx: &mut CallbackContext<'_>) -> Result<(), CallbackError> {
        self.call(Phase::BuildFinished, ctx)
    }
}

// ---------------------------------------------------------------------------
// Script
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Script {
    source: ScriptSource,
    statements: Vec<Statement>,
}

impl Script {
    pub fn parse(source: ScriptSource, text: &str) -> Result<Self, ScriptError> {
        let statements = parser::parse(&source.identifier, text)?;
        Ok(Self { source, statements })
    }

    /// Reads and parses `path`. `identifier` is how the script is named in
    /// locations and errors.
    pub fn load(kind: ScriptKind, path: &Path, identifier: impl Into<String>) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path)
            .map_err(|source| ScriptError::Io { path: path.to_path_buf(), source })?;
        Self::parse(ScriptSource::new(kind, identifier), &text)
    }

    pub fn source(&self) -> &ScriptSource {
        &self.source
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Runs top-level statements and registers listeners, stopping at the
    /// first problem.
    pub fn evaluate(&self, scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        tracing::debug!(script = %self.source, "evaluating script");
        for statement in &self.statements {
            match statement {
                Statement::Run(step) => {
                    let mut ctx = CallbackContext::new(&mut *scope.console);
                    run_steps(std::slice::from_ref(step), &mut ctx)
                        .map_err(|e| self.problem(step.line, Failure::new(e.message)))?;
                }
                Statement::On { line, phase, body } => {
                    let body = Rc::clone(body);
                    let callback =
                        Callback::closure(self.origin(), move |ctx| run_steps(&body, ctx));
                    scope
                        .registry
                        .register_named(phase, callback)
                        .map_err(|e| self.problem(*line, Failure::new(e.to_string())))?;
                }
                Statement::Action { line, phase, body } => {
                    let callback =
                        Callback::action(self.origin(), ScriptAction { body: Rc::clone(body) });
                    scope
                        .registry
                        .register_named(phase, callback)
                        .map_err(|e| self.problem(*line, Failure::new(e.to_string())))?;
                }
                Statement::Listener { line, methods } => {
                    let listener = self.listener(methods)?;
                    scope
                        .registry
                        .add_multi_phase_listener(self.origin(), Rc::new(listener))
                        .map_err(|e| self.problem(*line, Failure::new(e.to_string())))?;
                }
            }
        }
        Ok(())
    }

    fn listener(&self, methods: &[Method]) -> Result<ScriptListener, Failure> {
        let mut phases = Vec::with_capacity(methods.len());
        let mut bodies = BTreeMap::new();
        for method in methods {
            let phase: Phase = method
                .phase
                .parse()
                .map_err(|e: buildhooks_core::RegistrationError| {
                    self.problem(method.line, Failure::new(e.to_string()))
                })?;
            phases.push(phase);
            bodies.insert(phase, Rc::clone(&method.body));
        }
        Ok(ScriptListener { phases, methods: bodies })
    }

    fn origin(&self) -> CallbackOrigin {
        CallbackOrigin::Script(self.source.clone())
    }

    /// Evaluation failure at `line`, with the underlying problem as cause.
    fn problem(&self, line: u32, cause: Failure) -> Failure {
        Failure::new(format!("A problem occurred evaluating {}.", self.source))
            .with_cause(cause)
            .with_location(SourceLocation::new(self.source.clone(), line))
    }
}
