//! `buildhooks check [--project-dir DIR]`

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use buildhooks_script::ScriptSession;

/// Parse every script of a project without running it.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Project directory containing buildhooks.yaml and the scripts.
    #[arg(long, short = 'C', value_name = "DIR")]
    pub project_dir: Option<PathBuf>,
}

impl CheckArgs {
    pub fn run(self) -> Result<ExitCode> {
        let plan = super::load_plan(self.project_dir)?;
        let session = ScriptSession::from_plan(&plan).context("script check failed")?;

        for script in session.scripts() {
            println!(
                "{} {} ({} statements)",
                "✓".green().bold(),
                script.source(),
                script.statements().len()
            );
        }
        if session.scripts().next().is_none() {
            println!("No scripts found in '{}'", plan.project_dir.display());
        }
        Ok(ExitCode::SUCCESS)
    }
}
