//! Scenario trees built from the file system

use std::path::PathBuf;

use locustgen_core::plugins::Plugin;
use locustgen_core::{Child, Scenario, ScenarioBuilder, ScenarioError, Task};
use locustgen_har::{to_identifier, Denylist};
use locustgen_test_utils::{har_with_entries, ScenarioDir};

fn child_names(scenario: &Scenario) -> Vec<&str> {
    scenario.scenarios().map(|s| s.name.as_str()).collect()
}

#[test]
fn har_file_reads_its_weight() {
    let dir = ScenarioDir::new();
    let har = dir.har("a.har");
    dir.weight("a.har", "7");

    let scenario = Scenario::from_path(&har).unwrap();
    assert_eq!(scenario.weight, 7);
    assert_eq!(scenario.origin.as_deref(), Some(har.as_path()));
    assert_eq!(scenario.tasks().count(), 1);
}

#[test]
fn directory_child_reads_its_weight() {
    let dir = ScenarioDir::new();
    let har = dir.har("a.har");
    dir.weight("a.har", "7");

    let root = Scenario::from_path(dir.path()).unwrap();
    assert_eq!(root.weight, 1);
    match &root.children[..] {
        [Child::Scenario(a)] => {
            assert_eq!(a.weight, 7);
            assert_eq!(a.origin.as_deref(), Some(har.as_path()));
        }
        other => panic!("unexpected children: {other:?}"),
    }
}

#[test]
fn root_is_named_after_full_path() {
    let dir = ScenarioDir::new();
    let har = dir.har("a.har");
    let scenario = Scenario::from_path(&har).unwrap();
    assert_eq!(scenario.name, to_identifier(&har.to_string_lossy()));
}

#[test]
fn nested_scenarios_are_named_after_file_stems() {
    let dir = ScenarioDir::new();
    dir.har("sub/a.har");
    dir.har("b.har");
    dir.weight("sub", "4");

    let root = Scenario::from_path(dir.path()).unwrap();
    assert_eq!(child_names(&root), ["b", "sub"]);

    let sub = root.scenarios().nth(1).unwrap();
    assert_eq!(sub.weight, 4);
    assert_eq!(child_names(sub), ["a"]);
}

#[test]
fn invalid_files_are_skipped() {
    let dir = ScenarioDir::new();
    dir.har("good.har");
    dir.write("bad.har", "not json");
    dir.write("notes.txt", "{}");
    dir.mkdir("empty");

    let root = Scenario::from_path(dir.path()).unwrap();
    assert_eq!(child_names(&root), ["good"]);
}

#[test]
fn directory_without_scenarios_is_skippable() {
    let dir = ScenarioDir::new();
    dir.write("bad.har", "not json");
    let err = Scenario::from_path(dir.path()).unwrap_err();
    assert!(err.is_skippable(), "{err}");

    let empty = ScenarioDir::new();
    assert!(Scenario::from_path(empty.path()).unwrap_err().is_skippable());
}

#[test]
fn missing_path_is_skippable() {
    let dir = ScenarioDir::new();
    let err = Scenario::from_path(dir.join("nope.har")).unwrap_err();
    assert!(err.is_skippable());
}

#[test]
fn colliding_names_are_fatal() {
    let dir = ScenarioDir::new();
    let har = dir.har("x.har");
    let json = dir.har("x.json");
    dir.har("y.har");

    match Scenario::from_path(dir.path()).unwrap_err() {
        ScenarioError::CollidingNames { path, groups } => {
            assert_eq!(path, dir.path());
            assert_eq!(groups, vec![vec![har, json]]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn dangling_weight_files_are_fatal() {
    let dir = ScenarioDir::new();
    dir.har("a.har");
    dir.weight("a.har", "2");
    let dangling = dir.weight("b.har", "3");

    match Scenario::from_path(dir.path()).unwrap_err() {
        ScenarioError::DanglingWeights { files, .. } => assert_eq!(files, vec![dangling]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn weight_of_skipped_child_is_dangling() {
    let dir = ScenarioDir::new();
    dir.har("a.har");
    dir.write("b.har", "not json");
    dir.weight("b.har", "3");

    let err = Scenario::from_path(dir.path()).unwrap_err();
    assert!(matches!(err, ScenarioError::DanglingWeights { .. }), "{err:?}");
}

#[test]
fn integrity_errors_cross_directories() {
    let dir = ScenarioDir::new();
    dir.har("ok.har");
    dir.har("deep/a.har");
    let weight = dir.weight("deep/a.har", "2.1");

    match Scenario::from_path(dir.path()).unwrap_err() {
        ScenarioError::InvalidWeight { path, value } => {
            assert_eq!(path, weight);
            assert_eq!(value, "2.1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn invalid_weight_values() {
    for value in ["0", "-2", "2.1", "abc", " ", ""] {
        let dir = ScenarioDir::new();
        let har = dir.har("a.har");
        dir.weight("a.har", value);
        let err = Scenario::from_path(&har).unwrap_err();
        assert!(!err.is_skippable(), "{value:?}");
        assert!(matches!(err, ScenarioError::InvalidWeight { .. }), "{value:?}");
    }
}

#[test]
fn tasks_follow_timestamps_and_denylist() {
    let dir = ScenarioDir::new();
    let har = dir.write(
        "a.har",
        &har_with_entries(&[
            ("2018-01-01T00:00:03Z", "GET", "https://c.example/"),
            ("2018-01-01T00:00:01Z", "POST", "https://a.example/"),
            ("2018-01-01T00:00:02Z", "GET", "https://ads.example:8080/"),
        ]),
    );

    let scenario = ScenarioBuilder::new()
        .with_denylist(Denylist::new(["ads.example:8080"]))
        .build(&har)
        .unwrap();
    let hosts: Vec<String> = scenario.tasks().map(|t| t.request.netloc()).collect();
    assert_eq!(hosts, ["a.example", "c.example"]);
}

#[test]
fn sequence_plugins_run_before_task_plugins() {
    let dir = ScenarioDir::new();
    let har = dir.har("a.har");

    let sequence = Plugin::on_task_sequence("seq", |tasks: Vec<Task>| -> Vec<Task> {
        tasks
            .into_iter()
            .map(|t| Task {
                name: "seq".to_string(),
                ..t
            })
            .collect()
    });
    let task = Plugin::on_task("task", |t: Task| Task {
        name: format!("{}_task", t.name),
        ..t
    });

    let scenario = ScenarioBuilder::new()
        .with_sequence_plugins(vec![sequence])
        .with_task_plugins(vec![task])
        .build(&har)
        .unwrap();
    let names: Vec<&str> = scenario.tasks().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["seq_task"]);
}

#[test]
fn directory_origins_and_children_kinds() {
    let dir = ScenarioDir::new();
    let har = dir.har("a.har");
    let root = Scenario::from_path(dir.path()).unwrap();

    assert_eq!(root.origin, Some(PathBuf::from(dir.path())));
    assert_eq!(root.tasks().count(), 0);
    match &root.children[..] {
        [Child::Scenario(a)] => assert_eq!(a.origin.as_deref(), Some(har.as_path())),
        other => panic!("unexpected children: {other:?}"),
    }
}
