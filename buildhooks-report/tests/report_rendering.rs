use std::fs;

use buildhooks_core::{Failure, ScriptSource, SourceLocation};
use buildhooks_dispatch::{BuildOutcome, BuildStage};
use buildhooks_report::FailureReporter;
use chrono::{Duration, Utc};
use tempfile::TempDir;

fn outcome(failure: Option<Failure>) -> BuildOutcome {
    let finished_at = Utc::now();
    BuildOutcome {
        failure,
        suppressed: vec![],
        stages: vec![BuildStage::Init, BuildStage::Terminal],
        started_at: finished_at - Duration::milliseconds(42),
        finished_at,
    }
}

#[test]
fn successful_outcome_has_only_footer() {
    let reporter = FailureReporter::new().unwrap();
    let text = reporter.render_outcome(&outcome(None)).unwrap();
    assert_eq!(text, "BUILD SUCCESSFUL in 42ms\n");
}

#[test]
fn failed_outcome_renders_failure_then_footer() {
    let reporter = FailureReporter::new().unwrap();
    let failure = Failure::new("broken")
        .with_location(SourceLocation::new(ScriptSource::build_file("build.hooks"), 3));
    let text = reporter.render_outcome(&outcome(Some(failure))).unwrap();

    let where_at = text.find("Build file 'build.hooks' line: 3").expect("location");
    let what_at = text.find("broken").expect("description");
    let footer_at = text.find("BUILD FAILED in 42ms").expect("footer");
    assert!(where_at < what_at && what_at < footer_at, "got:\n{text}");
    assert!(!text.contains("> "), "flat failure must not list causes:\n{text}");
}

#[test]
fn build_finished_failure_renders_without_where_block() {
    let reporter = FailureReporter::new().unwrap();
    let text = reporter.render_outcome(&outcome(Some(Failure::new("broken")))).unwrap();
    assert!(!text.contains("* Where:"), "got:\n{text}");
    assert!(text.contains("* What went wrong:\nbroken\n"));
}

#[test]
fn json_report_carries_failure_shape() {
    let reporter = FailureReporter::new().unwrap();
    let json = reporter.render_json(&outcome(Some(Failure::new("broken")))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).expect("valid json");
    assert_eq!(value["success"], false);
    assert_eq!(value["failure"]["description"], "broken");
    assert!(value["failure"].get("cause").is_none());
    assert!(value["failure"].get("location").is_none());
    assert_eq!(value["duration_ms"], 42);
    assert_eq!(value["stages"][1], "terminal");
}

#[test]
fn override_directory_replaces_embedded_template() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("failure.txt.tera"), "ERR {{ description }}").expect("write");
    fs::write(dir.path().join("notes.txt"), "not a template").expect("write");

    let reporter = FailureReporter::with_template_dir(Some(dir.path())).unwrap();
    assert_eq!(reporter.render(&Failure::new("broken")).unwrap(), "ERR broken\n");
    // untouched templates keep their embedded version
    assert_eq!(reporter.render_outcome(&outcome(None)).unwrap(), "BUILD SUCCESSFUL in 42ms\n");
}

#[test]
fn missing_override_directory_falls_back_to_embedded() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent");
    let reporter = FailureReporter::with_template_dir(Some(&missing)).unwrap();
    assert!(reporter.render(&Failure::new("x")).unwrap().starts_with("FAILURE:"));
}

#[test]
fn broken_override_template_is_a_tera_error() {
    let dir = TempDir::new().expect("tempdir");
    fs::write(dir.path().join("failure.txt.tera"), "{% if %}").expect("write");
    let err = FailureReporter::with_template_dir(Some(dir.path())).err().expect("error");
    assert!(err.to_string().starts_with("template engine error"));
}
