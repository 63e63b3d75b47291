//! Whole builds driven by hook scripts on disk.

use std::fs;

use buildhooks_core::{
    config, CapturedConsole, DispatchPolicy, Failure, ScriptKind, ScriptSource, SourceLocation,
};
use buildhooks_dispatch::{BuildLifecycleCoordinator, BuildOutcome};
use buildhooks_script::{Script, ScriptError, ScriptSession};
use rstest::rstest;
use tempfile::TempDir;

fn build_session(build_script: &str) -> ScriptSession {
    ScriptSession {
        build_scripts: vec![
            Script::parse(ScriptSource::build_file("build.hooks"), build_script).expect("parse"),
        ],
        ..Default::default()
    }
}

fn run(mut session: ScriptSession, post_build: bool) -> (BuildOutcome, CapturedConsole) {
    let mut coordinator = BuildLifecycleCoordinator::new(DispatchPolicy::FailFast);
    if post_build {
        coordinator
            .registry_mut()
            .add_root_completion_listener(|ctx| {
                ctx.println("post build");
                Ok(())
            })
            .expect("internal listener");
    }
    let mut console = CapturedConsole::new();
    let outcome = coordinator.run(&mut session, &mut console);
    (outcome, console)
}

// ---------------------------------------------------------------------------
// 1. Attribution through the script engine
// ---------------------------------------------------------------------------

#[rstest]
#[case::closure("on task_graph_ready {\n  println \"x\"\n  fail \"broken\"\n}\n")]
#[case::action("action task_graph_ready {\n  println \"x\"\n  fail \"broken\"\n}\n")]
#[case::listener("listener {\n  task_graph_ready {\n  fail \"broken\"\n  }\n}\n")]
fn task_graph_failure_is_attributed_to_line_three(#[case] script: &str) {
    let (outcome, _) = run(build_session(script), false);
    assert_eq!(
        outcome.failure,
        Some(
            Failure::new("broken")
                .with_location(SourceLocation::new(ScriptSource::build_file("build.hooks"), 3))
        )
    );
}

#[test]
fn build_finished_failure_is_not_attributed() {
    let (outcome, _) = run(build_session("on build_finished {\n  fail \"broken\"\n}\n"), false);
    assert_eq!(outcome.failure, Some(Failure::new("broken")));
}

#[test]
fn settings_listener_failure_names_settings_file() {
    let session = ScriptSession {
        settings: Some(
            Script::parse(
                ScriptSource::settings_file("settings.hooks"),
                "# settings\non settings_evaluated {\n  fail \"no settings\"\n}\n",
            )
            .unwrap(),
        ),
        ..Default::default()
    };
    let (outcome, _) = run(session, false);
    let location = outcome.failure.and_then(|f| f.location).expect("location");
    assert_eq!(location.to_string(), "Settings file 'settings.hooks' line: 3");
}

#[test]
fn init_script_listener_failure_names_initialization_script() {
    let session = ScriptSession {
        init_scripts: vec![Script::parse(
            ScriptSource::init_script("init.hooks"),
            "on projects_loaded {\n  fail \"no mirror configured\"\n}\n",
        )
        .unwrap()],
        ..Default::default()
    };
    let (outcome, _) = run(session, false);
    let failure = outcome.failure.expect("failure");
    assert_eq!(failure.description, "no mirror configured");
    assert!(failure.cause().is_none());
    let location = failure.location.expect("location");
    assert_eq!(location.source.kind, ScriptKind::InitScript);
    assert_eq!(location.to_string(), "Initialization script 'init.hooks' line: 2");
}

// ---------------------------------------------------------------------------
// 2. Output ordering around root build completion
// ---------------------------------------------------------------------------

#[test]
fn build_finished_output_precedes_post_build() {
    let (outcome, console) =
        run(build_session("on build_finished {\n  println \"build finished\"\n}\n"), true);
    assert!(outcome.is_success());
    assert_eq!(console.lines, ["build finished", "post build"]);
}

#[test]
fn failing_build_finished_output_precedes_post_build() {
    let script = "on build_finished {\n  println \"breaking\"\n  fail \"broken\"\n}\n";
    let (outcome, console) = run(build_session(script), true);
    assert_eq!(outcome.failure.map(|f| f.description), Some("broken".to_owned()));
    assert_eq!(console.lines, ["breaking", "post build"]);
}

// ---------------------------------------------------------------------------
// 3. Evaluation failures
// ---------------------------------------------------------------------------

#[test]
fn build_script_failure_wraps_cause_and_skips_tasks() {
    let mut session = build_session("println \"configuring\"\nfail \"bad\"\n");
    session.tasks = vec!["compile".into()];
    let (outcome, console) = run(session, true);

    let failure = outcome.failure.expect("failure");
    assert_eq!(failure.description, "A problem occurred evaluating Build file 'build.hooks'.");
    assert_eq!(failure.cause(), Some(&Failure::new("bad")));
    assert_eq!(failure.location.map(|l| l.line), Some(2));
    assert_eq!(console.lines, ["configuring", "post build"]);
}

#[test]
fn build_script_cannot_register_settings_listener() {
    let (outcome, _) = run(build_session("on settings_evaluated {\n}\n"), false);
    let failure = outcome.failure.expect("failure");
    let cause = failure.cause().expect("cause");
    assert!(cause.description.contains("already been notified"), "{}", cause.description);
}

// ---------------------------------------------------------------------------
// 4. Loading from a project directory
// ---------------------------------------------------------------------------

#[test]
fn session_from_plan_runs_scripts_in_order() {
    let home = TempDir::new().expect("home");
    let project = TempDir::new().expect("project");
    let init_d = home.path().join(".buildhooks").join("init.d");
    fs::create_dir_all(&init_d).unwrap();
    fs::write(init_d.join("greet.hooks"), "println \"init\"\n").unwrap();
    fs::write(project.path().join("settings.hooks"), "println \"settings\"\n").unwrap();
    fs::write(
        project.path().join("build.hooks"),
        "println \"build\"\non task_graph_ready {\n  println \"graph\"\n}\n",
    )
    .unwrap();
    fs::write(project.path().join("buildhooks.yaml"), "tasks: [assemble]\n").unwrap();

    let plan = config::load_at(project.path(), home.path()).expect("plan");
    let session = ScriptSession::from_plan(&plan).expect("session");
    assert_eq!(session.scripts().count(), 3);
    assert_eq!(session.settings.as_ref().unwrap().source().kind, ScriptKind::SettingsFile);
    assert_eq!(session.build_scripts[0].source().identifier, "build.hooks");

    let (outcome, console) = run(session, false);
    assert!(outcome.is_success());
    assert_eq!(console.lines, ["init", "settings", "build", "graph", "> Task :assemble"]);
}

#[test]
fn parse_error_surfaces_from_plan() {
    let home = TempDir::new().expect("home");
    let project = TempDir::new().expect("project");
    fs::write(project.path().join("build.hooks"), "on build_finished {\n").unwrap();

    let plan = config::load_at(project.path(), home.path()).expect("plan");
    let err = ScriptSession::from_plan(&plan).unwrap_err();
    assert!(matches!(err, ScriptError::Parse { line: 1, .. }), "got {err}");
    assert_eq!(err.to_string(), "build.hooks line 1: unclosed block");
}
