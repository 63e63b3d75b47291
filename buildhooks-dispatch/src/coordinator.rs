//! Build lifecycle coordinator.
//!
//! ## State machine
//!
//! ```text
//! Init ─► SettingsEvaluated ─► ProjectsLoaded ─► ProjectsEvaluated ─► TaskGraphReady ─► Executing
//!   │            │                   │                  │                   │               │
//!   └────────────┴───── first failure: skip the rest of the forward stages ─┴───────────────┤
//!                                                                                           ▼
//!                                              BuildFinished ─► RootBuildCompletion ─► Terminal
//! ```
//!
//! Each forward stage first runs its [`BuildSession`] step (which may
//! register listeners) and then dispatches the matching phase. The two
//! closing stages always run, in that order, whatever happened before.
//!
//! The build's failure is the first one in stage order. Later failures are
//! kept in [`BuildOutcome::suppressed`] and never replace it.

use chrono::{DateTime, Utc};
use serde::Serialize;

use buildhooks_core::{
    Console, DispatchPolicy, DispatchResult, Failure, ListenerRegistry, Phase,
};

use crate::dispatcher::{PhaseDispatcher, PhaseReport};
use crate::session::{BuildSession, EvaluationScope};

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildStage {
    Init,
    SettingsEvaluated,
    ProjectsLoaded,
    ProjectsEvaluated,
    TaskGraphReady,
    Executing,
    BuildFinished,
    RootBuildCompletion,
    Terminal,
}

impl BuildStage {
    /// Stages skipped once anything has failed.
    pub const FORWARD: [BuildStage; 5] = [
        BuildStage::SettingsEvaluated,
        BuildStage::ProjectsLoaded,
        BuildStage::ProjectsEvaluated,
        BuildStage::TaskGraphReady,
        BuildStage::Executing,
    ];

    /// The phase dispatched when this stage is entered, if any.
    pub fn phase(self) -> Option<Phase> {
        match self {
            BuildStage::SettingsEvaluated => Some(Phase::SettingsEvaluated),
            BuildStage::ProjectsLoaded => Some(Phase::ProjectsLoaded),
            BuildStage::ProjectsEvaluated => Some(Phase::ProjectsEvaluated),
            BuildStage::TaskGraphReady => Some(Phase::TaskGraphReady),
            BuildStage::BuildFinished => Some(Phase::BuildFinished),
            BuildStage::RootBuildCompletion => Some(Phase::RootBuildCompletion),
            BuildStage::Init | BuildStage::Executing | BuildStage::Terminal => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of one build, handed to the reporting layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildOutcome {
    /// First failure in stage order; `None` on success.
    pub failure: Option<Failure>,
    /// Failures raised after `failure` was already set: later listeners of
    /// the failing phase under `RunAll`, and failing closing-stage listeners.
    pub suppressed: Vec<Failure>,
    /// Stages entered, in order.
    pub stages: Vec<BuildStage>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Process exit status for this outcome.
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinator
// ---------------------------------------------------------------------------

/// Drives one build through every stage. Consumed by [`run`](Self::run):
/// listeners live for exactly one build.
#[derive(Debug, Default)]
pub struct BuildLifecycleCoordinator {
    registry: ListenerRegistry,
    dispatcher: PhaseDispatcher,
}

impl BuildLifecycleCoordinator {
    pub fn new(policy: DispatchPolicy) -> Self {
        Self::with_registry(ListenerRegistry::new(), policy)
    }

    /// Starts from listeners registered ahead of the build (e.g. internal ones).
    pub fn with_registry(registry: ListenerRegistry, policy: DispatchPolicy) -> Self {
        Self { registry, dispatcher: PhaseDispatcher::new(policy) }
    }

    pub fn registry(&self) -> &ListenerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ListenerRegistry {
        &mut self.registry
    }

    /// Runs the build. Never fails itself: every callback or session failure
    /// ends up in the returned [`BuildOutcome`].
    pub fn run(mut self, session: &mut dyn BuildSession, console: &mut dyn Console) -> BuildOutcome {
        let started_at = Utc::now();
        let mut stages = vec![BuildStage::Init];
        let mut suppressed = Vec::new();
        tracing::debug!(policy = %self.dispatcher.policy(), "starting build lifecycle");

        let failure = BuildStage::FORWARD.iter().copied().try_fold((), |(), stage| {
            stages.push(stage);
            self.advance(stage, &mut *session, &mut *console, &mut suppressed)
        });
        let mut failure = failure.err();
        if failure.is_some() {
            let skipped = BuildStage::FORWARD.len() + 1 - stages.len();
            tracing::info!(skipped, "build failed; skipping remaining forward stages");
        }

        for stage in [BuildStage::BuildFinished, BuildStage::RootBuildCompletion] {
            stages.push(stage);
            let Some(phase) = stage.phase() else { continue };
            let report = self.fire(phase, &mut *console, failure.as_ref());
            let mut later = report.additional;
            if let DispatchResult::Failed(f) = report.result {
                if failure.is_none() {
                    failure = Some(f);
                } else {
                    later.insert(0, f);
                }
            }
            for f in later {
                tracing::warn!(%phase, error = %f, "failure after earlier build failure");
                suppressed.push(f);
            }
        }
        stages.push(BuildStage::Terminal);

        BuildOutcome { failure, suppressed, stages, started_at, finished_at: Utc::now() }
    }

    /// Session step for `stage`, then its phase. `Err` carries the failure;
    /// failures that followed it in the same phase go to `suppressed`.
    fn advance(
        &mut self,
        stage: BuildStage,
        session: &mut dyn BuildSession,
        console: &mut dyn Console,
        suppressed: &mut Vec<Failure>,
    ) -> Result<(), Failure> {
        tracing::debug!(?stage, "entering stage");
        {
            let mut scope = EvaluationScope::new(&mut self.registry, &mut *console);
            match stage {
                BuildStage::SettingsEvaluated => session.evaluate_settings(&mut scope)?,
                BuildStage::ProjectsLoaded => session.load_projects(&mut scope)?,
                BuildStage::ProjectsEvaluated => session.evaluate_projects(&mut scope)?,
                BuildStage::TaskGraphReady => session.calculate_task_graph(&mut scope)?,
                BuildStage::Executing => session.execute_tasks(&mut scope)?,
                _ => {}
            }
        }
        let Some(phase) = stage.phase() else {
            return Ok(());
        };
        let report = self.fire(phase, console, None);
        suppressed.extend(report.additional);
        match report.result {
            DispatchResult::Success => Ok(()),
            DispatchResult::Failed(f) => Err(f),
        }
    }

    fn fire(
        &mut self,
        phase: Phase,
        console: &mut dyn Console,
        build_failure: Option<&Failure>,
    ) -> PhaseReport {
        let report = self.dispatcher.dispatch_phase(&self.registry, phase, console, build_failure);
        self.registry.mark_fired(phase);
        report
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use buildhooks_core::{Callback, CallbackError, CallbackOrigin, CapturedConsole};

    struct NoopSession;
    impl BuildSession for NoopSession {}

    #[test]
    fn empty_build_visits_every_stage() {
        let mut console = CapturedConsole::new();
        let outcome = BuildLifecycleCoordinator::default().run(&mut NoopSession, &mut console);
        assert!(outcome.is_success());
        assert_eq!(outcome.exit_code(), 0);
        assert_eq!(
            outcome.stages,
            [
                BuildStage::Init,
                BuildStage::SettingsEvaluated,
                BuildStage::ProjectsLoaded,
                BuildStage::ProjectsEvaluated,
                BuildStage::TaskGraphReady,
                BuildStage::Executing,
                BuildStage::BuildFinished,
                BuildStage::RootBuildCompletion,
                BuildStage::Terminal,
            ]
        );
        assert!(outcome.started_at <= outcome.finished_at);
    }

    #[test]
    fn early_failure_skips_execution_but_not_closing_stages() {
        let mut coordinator = BuildLifecycleCoordinator::default();
        coordinator
            .registry_mut()
            .register(
                Phase::ProjectsLoaded,
                Callback::closure(CallbackOrigin::Internal, |_| Err(CallbackError::new("nope"))),
            )
            .unwrap();
        let mut console = CapturedConsole::new();
        let outcome = coordinator.run(&mut NoopSession, &mut console);
        assert_eq!(outcome.exit_code(), 1);
        assert_eq!(
            outcome.stages,
            [
                BuildStage::Init,
                BuildStage::SettingsEvaluated,
                BuildStage::ProjectsLoaded,
                BuildStage::BuildFinished,
                BuildStage::RootBuildCompletion,
                BuildStage::Terminal,
            ]
        );
    }

    #[test]
    fn phase_is_marked_fired_after_dispatch() {
        let mut coordinator = BuildLifecycleCoordinator::default();
        coordinator.fire(Phase::SettingsEvaluated, &mut CapturedConsole::new(), None);
        assert!(coordinator.registry().is_fired(Phase::SettingsEvaluated));
        assert!(!coordinator.registry().is_fired(Phase::ProjectsLoaded));
    }
}
