//! `buildhooks run [--project-dir DIR] [--json] [--run-all] [--report-templates DIR] [TASK...]`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;

use buildhooks_core::{DispatchPolicy, StderrConsole, StdoutConsole};
use buildhooks_dispatch::BuildLifecycleCoordinator;
use buildhooks_report::FailureReporter;
use buildhooks_script::ScriptSession;

/// Run the build lifecycle for a project.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Project directory containing buildhooks.yaml and the scripts.
    #[arg(long, short = 'C', value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Emit the outcome as JSON on stdout; console lines move to stderr.
    #[arg(long)]
    pub json: bool,

    /// Keep invoking a phase's listeners after one of them fails.
    #[arg(long)]
    pub run_all: bool,

    /// Directory of .tera files overriding the built-in report templates.
    #[arg(long, value_name = "DIR")]
    pub report_templates: Option<PathBuf>,

    /// Tasks to execute; replaces the tasks listed in buildhooks.yaml.
    pub tasks: Vec<String>,
}

impl RunArgs {
    pub fn run(self) -> Result<ExitCode> {
        let plan = super::load_plan(self.project_dir)?;
        let mut session = ScriptSession::from_plan(&plan).context("failed to load scripts")?;
        if !self.tasks.is_empty() {
            session.tasks = self.tasks;
        }
        let reporter = FailureReporter::with_template_dir(self.report_templates.as_deref())
            .context("failed to load report templates")?;

        let policy = if self.run_all { DispatchPolicy::RunAll } else { plan.dispatch };
        let mut coordinator = BuildLifecycleCoordinator::new(policy);
        coordinator
            .registry_mut()
            .add_root_completion_listener(|ctx| {
                match ctx.build_failure() {
                    Some(failure) => tracing::info!(error = %failure, "root build completed: failed"),
                    None => tracing::info!("root build completed: successful"),
                }
                Ok(())
            })
            .context("failed to register root build listener")?;

        tracing::debug!(%policy, scripts = session.scripts().count(), "starting build");
        // With --json, stdout carries only the report.
        let outcome = if self.json {
            coordinator.run(&mut session, &mut StderrConsole)
        } else {
            coordinator.run(&mut session, &mut StdoutConsole)
        };

        if self.json {
            println!("{}", reporter.render_json(&outcome)?);
        } else {
            eprint!("{}", reporter.render_outcome(&outcome)?);
        }
        Ok(ExitCode::from(outcome.exit_code() as u8))
    }
}
