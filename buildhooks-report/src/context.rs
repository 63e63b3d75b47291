//! Template payloads built from [`Failure`] and [`BuildOutcome`].

use chrono::Duration;
use serde::Serialize;

use buildhooks_core::Failure;
use buildhooks_dispatch::{BuildOutcome, BuildStage};

use crate::error::ReportError;

/// Payload for `failure.txt.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct FailureCtx {
    pub description: String,
    /// Cause descriptions, nearest first. Empty when the failure has no cause.
    pub causes: Vec<String>,
    /// Pre-formatted `"<origin> '<id>' line: <n>"`, absent when unresolved.
    pub location: Option<String>,
}

impl FailureCtx {
    pub fn from_failure(failure: &Failure) -> Self {
        Self {
            description: failure.description.clone(),
            causes: failure.causes().map(|c| c.description.clone()).collect(),
            location: failure.location.as_ref().map(ToString::to_string),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, ReportError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

/// Payload for `outcome.txt.tera`.
#[derive(Debug, Clone, Serialize)]
pub struct OutcomeCtx {
    /// Rendered failure block, absent on success.
    pub failure: Option<String>,
    pub duration: String,
}

/// Machine-readable report emitted by `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub success: bool,
    pub failure: Option<&'a Failure>,
    pub suppressed_failures: usize,
    pub stages: &'a [BuildStage],
    pub duration_ms: i64,
}

impl<'a> JsonReport<'a> {
    pub fn from_outcome(outcome: &'a BuildOutcome) -> Self {
        Self {
            success: outcome.is_success(),
            failure: outcome.failure.as_ref(),
            suppressed_failures: outcome.suppressed.len(),
            stages: &outcome.stages,
            duration_ms: (outcome.finished_at - outcome.started_at).num_milliseconds(),
        }
    }
}

/// `850ms`, `3s`, `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
    let ms = duration.num_milliseconds().max(0);
    if ms < 1_000 {
        return format!("{ms}ms");
    }
    let secs = ms / 1_000;
    if secs < 60 {
        return format!("{secs}s");
    }
    format!("{}m {}s", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use buildhooks_core::{ScriptSource, SourceLocation};

    #[test]
    fn flat_failure_has_no_causes() {
        let ctx = FailureCtx::from_failure(&Failure::new("broken"));
        assert!(ctx.causes.is_empty());
        assert!(ctx.location.is_none());
    }

    #[test]
    fn location_is_preformatted() {
        let failure = Failure::new("broken")
            .with_location(SourceLocation::new(ScriptSource::build_file("build.hooks"), 3));
        let ctx = FailureCtx::from_failure(&failure);
        assert_eq!(ctx.location.as_deref(), Some("Build file 'build.hooks' line: 3"));
    }

    #[test]
    fn durations_are_humanized() {
        assert_eq!(format_duration(Duration::milliseconds(850)), "850ms");
        assert_eq!(format_duration(Duration::milliseconds(3_400)), "3s");
        assert_eq!(format_duration(Duration::seconds(125)), "2m 5s");
        assert_eq!(format_duration(Duration::milliseconds(-5)), "0ms");
    }
}
