//! [`BuildSession`] backed by hook scripts.

use std::path::Path;

use buildhooks_core::{BuildPlan, Failure, ScriptKind};
use buildhooks_dispatch::{BuildSession, EvaluationScope};

use crate::error::ScriptError;
use crate::script::Script;

/// Scripts and tasks for one build.
///
/// - settings stage: init scripts, then the settings script
/// - projects-evaluated stage: build scripts, in order
/// - execution: one `> Task :<name>` line per task
#[derive(Debug, Clone, Default)]
pub struct ScriptSession {
    pub init_scripts: Vec<Script>,
    pub settings: Option<Script>,
    pub build_scripts: Vec<Script>,
    pub tasks: Vec<String>,
}

impl ScriptSession {
    /// Loads and parses every script in `plan`. Identifiers are paths
    /// relative to the project directory where possible.
    pub fn from_plan(plan: &BuildPlan) -> Result<Self, ScriptError> {
        let load = |kind, path: &Path| Script::load(kind, path, identifier(&plan.project_dir, path));
        Ok(Self {
            init_scripts: plan
                .init_scripts
                .iter()
                .map(|p| load(ScriptKind::InitScript, p.as_path()))
                .collect::<Result<_, _>>()?,
            settings: plan
                .settings
                .as_deref()
                .map(|p| load(ScriptKind::SettingsFile, p))
                .transpose()?,
            build_scripts: plan
                .build_scripts
                .iter()
                .map(|p| load(ScriptKind::BuildFile, p.as_path()))
                .collect::<Result<_, _>>()?,
            tasks: plan.tasks.clone(),
        })
    }

    /// Every script in evaluation order.
    pub fn scripts(&self) -> impl Iterator<Item = &Script> {
        self.init_scripts.iter().chain(self.settings.iter()).chain(self.build_scripts.iter())
    }
}

impl BuildSession for ScriptSession {
    fn evaluate_settings(&mut self, scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        for script in self.init_scripts.iter().chain(self.settings.iter()) {
            script.evaluate(scope)?;
        }
        Ok(())
    }

    fn evaluate_projects(&mut self, scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        for script in &self.build_scripts {
            script.evaluate(scope)?;
        }
        Ok(())
    }

    fn execute_tasks(&mut self, scope: &mut EvaluationScope<'_>) -> Result<(), Failure> {
        for task in &self.tasks {
            tracing::debug!(task = %task, "executing task");
            scope.console.line(&format!("> Task :{task}"));
        }
        Ok(())
    }
}

fn identifier(project_dir: &Path, path: &Path) -> String {
    path.strip_prefix(project_dir)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}
