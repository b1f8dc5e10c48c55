use std::collections::BTreeMap;
use std::io::Write;

use chrono::Utc;
use pretty_assertions::assert_eq;
use prio_core::config::AnalysisConfig;
use prio_core::entities::{AnalysisResult, Task};
use prio_core::lookup::{Repository, TaskLookup};
use prio_store::JsonlRepository;

fn open() -> (tempfile::TempDir, JsonlRepository) {
    let dir = tempfile::tempdir().unwrap();
    let repo = JsonlRepository::open(dir.path().join("data")).unwrap();
    (dir, repo)
}

fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

#[test]
fn missing_project_reads_empty() {
    let (_dir, repo) = open();
    assert!(repo.fetch_tasks("nope").unwrap().is_empty());
    assert!(repo.latest_analysis("nope").unwrap().is_none());
    assert!(repo.lookup("x").is_none());
}

#[test]
fn import_groups_by_project_and_keeps_order() {
    let (_dir, repo) = open();
    let imported = repo
        .import_tasks(&[
            Task::new("a", "p1", "A").with_effort(2.0),
            Task::new("x", "p2", "X"),
            Task::new("b", "p1", "B"),
        ])
        .unwrap();
    assert_eq!(imported, 3);
    assert_eq!(ids(&repo.fetch_tasks("p1").unwrap()), vec!["a", "b"]);
    assert_eq!(repo.projects().unwrap(), vec!["p1", "p2"]);
    assert_eq!(repo.lookup("a").and_then(|t| t.effort), Some(2.0));
}

#[test]
fn reimport_replaces_in_place() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "old"), Task::new("b", "p", "B")])
        .unwrap();
    repo.import_tasks(&[Task::new("a", "p", "new")]).unwrap();
    let tasks = repo.fetch_tasks("p").unwrap();
    assert_eq!(ids(&tasks), vec!["a", "b"]);
    assert_eq!(tasks[0].title, "new");
}

#[test]
fn label_updates_replay_in_write_order() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A")]).unwrap();
    repo.update_task_labels("a", &BTreeMap::from([("RICE_BIN".into(), "LOW".into())]))
        .unwrap();
    repo.update_task_labels(
        "a",
        &BTreeMap::from([
            ("RICE_BIN".into(), "HIGH".into()),
            ("KANO".into(), "attractive".into()),
        ]),
    )
    .unwrap();

    let task = &repo.fetch_tasks("p").unwrap()[0];
    assert_eq!(task.metadata.text("RICE_BIN"), Some("HIGH"));
    assert_eq!(task.metadata.text("KANO"), Some("attractive"));
    assert_eq!(
        repo.lookup("a").unwrap().metadata.text("RICE_BIN"),
        Some("HIGH")
    );
}

#[test]
fn saved_analyses_append_and_latest_wins() {
    let (_dir, repo) = open();
    for methods in [["RICE"], ["WSJF"]] {
        repo.save_analysis(&AnalysisResult {
            project_id: "p".into(),
            tasks: Vec::new(),
            created_at: Utc::now(),
            config_used: AnalysisConfig::with_methods(methods),
        })
        .unwrap();
    }
    assert_eq!(repo.analyses("p").unwrap().len(), 2);
    let latest = repo.latest_analysis("p").unwrap().unwrap();
    assert_eq!(latest.config_used.methods, vec!["WSJF"]);
}

#[test]
fn corrupt_lines_are_skipped() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A")]).unwrap();
    let path = repo.root().join("tasks").join("p.jsonl");
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{{not json").unwrap();
    drop(file);
    repo.import_tasks(&[Task::new("b", "p", "B")]).unwrap();

    assert_eq!(ids(&repo.fetch_tasks("p").unwrap()), vec!["a", "b"]);
}

#[test]
fn data_survives_reopen() {
    let (dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A")]).unwrap();
    drop(repo);
    let reopened = JsonlRepository::open(dir.path().join("data")).unwrap();
    assert_eq!(ids(&reopened.fetch_tasks("p").unwrap()), vec!["a"]);
}

#[test]
fn lookalike_project_ids_stay_isolated() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("x1", "a/b", "X"), Task::new("y1", "a_b", "Y")])
        .unwrap();

    let slash = repo.fetch_tasks("a/b").unwrap();
    assert_eq!(ids(&slash), vec!["x1"]);
    assert_eq!(slash[0].project_id, "a/b");
    assert_eq!(ids(&repo.fetch_tasks("a_b").unwrap()), vec!["y1"]);
    assert_eq!(repo.projects().unwrap(), vec!["a/b", "a_b"]);
}

#[test]
fn stray_records_in_a_project_file_are_ignored() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A")]).unwrap();
    let path = repo.root().join("tasks").join("p.jsonl");
    let stray = serde_json::to_string(&Task::new("z", "other", "Z")).unwrap();
    let mut file = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
    writeln!(file, "{stray}").unwrap();
    drop(file);

    assert_eq!(ids(&repo.fetch_tasks("p").unwrap()), vec!["a"]);
}

#[test]
fn labels_are_keyed_by_project() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p1", "A"), Task::new("a", "p2", "A again")])
        .unwrap();
    let labels = BTreeMap::from([("MOSCOW".to_string(), "must".to_string())]);
    repo.update_project_labels("p2", &BTreeMap::from([("a".to_string(), labels)]))
        .unwrap();

    assert_eq!(repo.fetch_tasks("p1").unwrap()[0].metadata.text("MOSCOW"), None);
    assert_eq!(
        repo.fetch_tasks("p2").unwrap()[0].metadata.text("MOSCOW"),
        Some("must")
    );
}

#[test]
fn label_file_keeps_one_line_per_task() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A"), Task::new("b", "p", "B")])
        .unwrap();
    for bin in ["LOW", "MEDIUM", "HIGH"] {
        repo.update_task_labels("a", &BTreeMap::from([("RICE_BIN".into(), bin.into())]))
            .unwrap();
    }
    repo.update_task_labels("b", &BTreeMap::from([("KANO".into(), "basic".into())]))
        .unwrap();

    let text = std::fs::read_to_string(repo.root().join("labels").join("p.jsonl")).unwrap();
    assert_eq!(text.lines().count(), 2);
    assert_eq!(
        repo.lookup("a").unwrap().metadata.text("RICE_BIN"),
        Some("HIGH")
    );
}

#[test]
fn label_update_for_unknown_task_is_not_found() {
    let (_dir, repo) = open();
    let err = repo
        .update_task_labels("ghost", &BTreeMap::from([("KANO".into(), "basic".into())]))
        .unwrap_err();
    assert!(matches!(err, prio_core::RepositoryError::NotFound { .. }));
}

#[test]
fn lookups_see_tasks_imported_after_first_use() {
    let (_dir, repo) = open();
    repo.import_tasks(&[Task::new("a", "p", "A")]).unwrap();
    assert!(repo.lookup("a").is_some());
    assert!(repo.lookup("b").is_none());

    repo.import_tasks(&[Task::new("b", "q", "B")]).unwrap();
    assert_eq!(repo.lookup("b").map(|t| t.project_id), Some("q".to_string()));
}
