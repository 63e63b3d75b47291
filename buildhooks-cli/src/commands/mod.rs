pub mod check;
pub mod phases;
pub mod run;

use std::path::PathBuf;

use anyhow::{Context, Result};

use buildhooks_core::{config, BuildPlan};

/// Resolves `dir` (default: current directory) into a build plan.
fn load_plan(dir: Option<PathBuf>) -> Result<BuildPlan> {
    let project_dir = dir.unwrap_or_else(|| PathBuf::from("."));
    config::load(&project_dir)
        .with_context(|| format!("failed to load project at '{}'", project_dir.display()))
}
