//! Tera-based [`FailureReporter`].
//!
//! | Template            | Renders                                          |
//! |---------------------|--------------------------------------------------|
//! | `failure.txt.tera`  | one [`Failure`]: where, what went wrong, causes  |
//! | `outcome.txt.tera`  | the build footer, embedding the failure block    |
//!
//! Both are embedded; a directory of `.tera` files with the same names
//! overrides them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tera::Tera;

use buildhooks_core::Failure;
use buildhooks_dispatch::BuildOutcome;

use crate::context::{format_duration, FailureCtx, JsonReport, OutcomeCtx};
use crate::error::ReportError;

const FAILURE_TEMPLATE: &str = "failure.txt.tera";
const OUTCOME_TEMPLATE: &str = "outcome.txt.tera";

const TPLS: &[(&str, &str)] = &[
    (FAILURE_TEMPLATE, include_str!("templates/failure.txt.tera")),
    (OUTCOME_TEMPLATE, include_str!("templates/outcome.txt.tera")),
];

// ---------------------------------------------------------------------------
// Template loading helpers
// ---------------------------------------------------------------------------

fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ReportError {
    ReportError::Io { path: path.into(), source }
}

fn load_override_templates(dir: &Path) -> Result<Vec<(String, String)>, ReportError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut templates = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("tera") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        templates.push((name, contents));
    }
    Ok(templates)
}

fn build_tera(override_dir: Option<&Path>) -> Result<Tera, ReportError> {
    let mut templates: HashMap<String, String> = TPLS
        .iter()
        .map(|(name, content)| ((*name).to_string(), (*content).to_string()))
        .collect();
    if let Some(dir) = override_dir {
        templates.extend(load_override_templates(dir)?);
    }

    let mut tera = Tera::default();
    tera.add_raw_templates(templates.into_iter().collect::<Vec<_>>())?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// FailureReporter
// ---------------------------------------------------------------------------

/// Renders failures and build outcomes for the end user.
///
/// The location block appears only when the failure carries a location;
/// failures from `build_finished` listeners never do. A flat failure (no
/// cause) renders no cause lines.
pub struct FailureReporter {
    tera: Tera,
}

impl FailureReporter {
    /// Embedded templates only.
    pub fn new() -> Result<Self, ReportError> {
        Self::with_template_dir(None)
    }

    /// Embedded templates, overridden by any same-named `.tera` files in `dir`.
    pub fn with_template_dir(dir: Option<&Path>) -> Result<Self, ReportError> {
        Ok(Self { tera: build_tera(dir)? })
    }

    /// Renders one failure. Output ends with exactly one newline.
    pub fn render(&self, failure: &Failure) -> Result<String, ReportError> {
        let ctx = FailureCtx::from_failure(failure).to_tera_context()?;
        let text = self.tera.render(FAILURE_TEMPLATE, &ctx)?;
        Ok(format!("{}\n", text.trim_end()))
    }

    /// Renders the failure block (if any) followed by the build footer.
    pub fn render_outcome(&self, outcome: &BuildOutcome) -> Result<String, ReportError> {
        let failure = outcome.failure.as_ref().map(|f| self.render(f)).transpose()?;
        let ctx = OutcomeCtx {
            failure,
            duration: format_duration(outcome.finished_at - outcome.started_at),
        };
        let text = self.tera.render(OUTCOME_TEMPLATE, &tera::Context::from_serialize(&ctx)?)?;
        Ok(format!("{}\n", text.trim_end()))
    }

    /// Pretty-printed JSON report of the outcome.
    pub fn render_json(&self, outcome: &BuildOutcome) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(&JsonReport::from_outcome(outcome))?)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
