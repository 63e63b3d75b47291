//! buildhooks — run hook scripts through a build lifecycle.
//!
//! # Usage
//!
//! ```text
//! buildhooks run [--project-dir DIR] [--json] [--run-all] [--report-templates DIR] [TASK...]
//! buildhooks check [--project-dir DIR]
//! buildhooks phases [--json]
//! ```
//!
//! Exit status: 0 on success, 1 when the build fails, 2 when configuration
//! or scripts cannot be loaded.

mod commands;

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;

use commands::{check::CheckArgs, phases::PhasesArgs, run::RunArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "buildhooks",
    version,
    about = "Run lifecycle hook scripts and report where they failed",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluate the project's scripts and run the build lifecycle.
    Run(RunArgs),

    /// Parse every script without running anything.
    Check(CheckArgs),

    /// List lifecycle phases and whether failures in them carry a location.
    Phases(PhasesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();
    match dispatch(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::from(2)
        }
    }
}

fn dispatch(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Run(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Phases(args) => args.run(),
    }
}

/// Diagnostics go to stderr so stdout carries only console lines and reports.
fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
