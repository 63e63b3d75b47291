//! `buildhooks phases [--json]`

use std::process::ExitCode;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use buildhooks_core::Phase;

/// List the lifecycle phases scripts can listen to.
#[derive(Args, Debug)]
pub struct PhasesArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct PhaseRow {
    name: &'static str,
    location_attributed: bool,
}

impl PhasesArgs {
    pub fn run(self) -> Result<ExitCode> {
        let rows: Vec<PhaseRow> = Phase::public()
            .iter()
            .map(|p| PhaseRow { name: p.name(), location_attributed: p.location_attributed() })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rows)?);
            return Ok(ExitCode::SUCCESS);
        }

        for row in rows {
            let attribution = if row.location_attributed {
                "reports script and line".green()
            } else {
                "no location".yellow()
            };
            println!("{:<20} {}", row.name.bold(), attribution);
        }
        Ok(ExitCode::SUCCESS)
    }
}
