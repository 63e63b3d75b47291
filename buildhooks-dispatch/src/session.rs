//! The build-model collaborator driven by the coordinator.
//!
//! A [`BuildSession`] evaluates scripts and runs tasks; it is where listeners
//! get registered. Every step defaults to doing nothing.

use buildhooks_core::{Console, Failure, ListenerRegistry};

/// What a session step may touch: the registry (to add listeners) and the
/// console (to produce output in order with listener output).
pub struct EvaluationScope<'a> {
    pub registry: &'a mut ListenerRegistry,
    pub console: &'a mut dyn Console,
}

impl<'a> EvaluationScope<'a> {
    pub fn new(registry: &'a mut ListenerRegistry, console: &'a mut dyn Console) -> Self {
        Self { registry, console }
    }
}

pub trait BuildSession {
    /// Init scripts and the settings script.
    fn evaluate_settings(&mut self, _scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        Ok(())
    }

    fn load_projects(&mut self, _scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        Ok(())
    }

    /// Build scripts.
    fn evaluate_projects(&mut self, _scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        Ok(())
    }

    fn calculate_task_graph(&mut self, _scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        Ok(())
    }

    fn execute_tasks(&mut self, _scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        Ok(())
    }
}
