//! Build plan resolution, script discovery and config error-message tests.

use assert_fs::prelude::*;
use buildhooks_core::{config, ConfigError, DispatchPolicy};
use predicates::prelude::predicate;

// ---------------------------------------------------------------------------
// 1. Defaults
// ---------------------------------------------------------------------------

#[test]
fn defaults_pick_up_conventional_scripts() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    project.child("settings.hooks").write_str("println \"settings\"\n").unwrap();
    project.child("build.hooks").write_str("println \"build\"\n").unwrap();

    let plan = config::load_at(project.path(), home.path()).expect("load");
    assert_eq!(plan.settings, Some(project.path().join("settings.hooks")));
    assert_eq!(plan.build_scripts, vec![project.path().join("build.hooks")]);
    assert!(plan.init_scripts.is_empty());
    assert!(plan.tasks.is_empty());
    assert_eq!(plan.dispatch, DispatchPolicy::FailFast);
}

#[test]
fn empty_project_has_no_scripts() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    let plan = config::load_at(project.path(), home.path()).expect("load");
    assert_eq!(plan.scripts().count(), 0);
}

// ---------------------------------------------------------------------------
// 2. Explicit configuration
// ---------------------------------------------------------------------------

#[test]
fn explicit_scripts_are_resolved_relative_to_project() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    project.child("gradle/settings.hooks").write_str("").unwrap();
    project.child("a.hooks").write_str("").unwrap();
    project.child("b.hooks").write_str("").unwrap();
    project.child("init/ci.hooks").write_str("").unwrap();
    project
        .child("buildhooks.yaml")
        .write_str(
            "settings: gradle/settings.hooks\n\
             build_scripts: [b.hooks, a.hooks]\n\
             init_scripts: [init/ci.hooks]\n\
             tasks: [compile, test]\n\
             dispatch: run_all\n",
        )
        .unwrap();

    let plan = config::load_at(project.path(), home.path()).expect("load");
    assert_eq!(plan.settings, Some(project.path().join("gradle/settings.hooks")));
    // configured order is kept
    assert_eq!(
        plan.build_scripts,
        vec![project.path().join("b.hooks"), project.path().join("a.hooks")]
    );
    assert_eq!(plan.init_scripts, vec![project.path().join("init/ci.hooks")]);
    assert_eq!(plan.tasks, ["compile", "test"]);
    assert_eq!(plan.dispatch, DispatchPolicy::RunAll);
}

#[test]
fn missing_configured_script_is_reported_with_path() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    project.child("buildhooks.yaml").write_str("build_scripts: [nope.hooks]\n").unwrap();

    let err = config::load_at(project.path(), home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ScriptNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("nope.hooks"));
}

#[test]
fn corrupt_config_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    project.child("buildhooks.yaml").write_str("tasks: [unclosed\n").unwrap();

    let err = config::load_at(project.path(), home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("buildhooks.yaml"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    project.child("buildhooks.yaml").write_str("parallel: true\n").unwrap();

    let err = config::load_at(project.path(), home.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
}

// ---------------------------------------------------------------------------
// 3. User init scripts
// ---------------------------------------------------------------------------

#[test]
fn user_init_scripts_are_sorted_and_run_before_project_ones() {
    let home = assert_fs::TempDir::new().expect("home");
    let project = assert_fs::TempDir::new().expect("project");
    home.child(".buildhooks/init.d/20-second.hooks").write_str("").unwrap();
    home.child(".buildhooks/init.d/10-first.hooks").write_str("").unwrap();
    home.child(".buildhooks/init.d/README.md").write_str("ignored").unwrap();
    project.child("local.hooks").write_str("").unwrap();
    project.child("buildhooks.yaml").write_str("init_scripts: [local.hooks]\n").unwrap();

    let plan = config::load_at(project.path(), home.path()).expect("load");
    let names: Vec<_> = plan
        .init_scripts
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, ["10-first.hooks", "20-second.hooks", "local.hooks"]);

    home.child(".buildhooks/init.d/10-first.hooks").assert(predicate::path::exists());
}
