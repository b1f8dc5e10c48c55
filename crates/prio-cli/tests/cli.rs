use std::path::Path;
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::Value;

fn prio(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_prio"))
        .args(args)
        .arg("--data-dir")
        .arg(dir.join("data"))
        .current_dir(dir)
        .env("HOME", dir)
        .env_remove("PRIO_LOG")
        .output()
        .expect("prio should run")
}

fn json(output: &Output) -> Value {
    assert!(
        output.status.success(),
        "prio failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout should be json")
}

fn write_tasks(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("tasks.jsonl");
    std::fs::write(
        &path,
        concat!(
            r#"{"id": "T-1", "project_id": "web", "title": "Checkout", "reach": 8000, "impact": 2, "confidence": 0.8, "effort": 5, "metadata": {"moscow": "must"}}"#,
            "\n",
            r#"{"id": "T-2", "project_id": "web", "title": "Search", "dependencies": ["T-1"], "metadata": {"effort_o": 1, "effort_m": 2, "effort_p": 3}}"#,
            "\n",
        ),
    )
    .expect("write tasks");
    path
}

#[test]
fn import_then_analyze_saves_labels() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = write_tasks(dir.path());

    let imported = json(&prio(dir.path(), &["import", tasks.to_str().expect("utf8")]));
    assert_eq!(imported["imported"], 2);
    assert_eq!(imported["projects"], serde_json::json!(["web"]));

    let result = json(&prio(
        dir.path(),
        &["analyze", "web", "--methods", "RICE,MOSCOW"],
    ));
    assert_eq!(result["project_id"], "web");
    assert_eq!(result["tasks"].as_array().map(Vec::len), Some(2));
    assert_eq!(result["tasks"][0]["labels"]["MOSCOW"], "must");

    let analyses = dir.path().join("data").join("analyses").join("web.jsonl");
    assert!(analyses.is_file());
}

#[test]
fn score_reads_an_input_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = write_tasks(dir.path());

    let report = json(&prio(
        dir.path(),
        &[
            "score",
            "T-1",
            "--input",
            tasks.to_str().expect("utf8"),
            "--methods",
            "RICE",
        ],
    ));
    assert_eq!(report["task_id"], "T-1");
    assert_eq!(report["aggregate"]["weighted_score"], 0.5);
}

#[test]
fn rank_respects_the_limit() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = write_tasks(dir.path());

    let rows = json(&prio(
        dir.path(),
        &["rank", "--input", tasks.to_str().expect("utf8"), "--limit", "1"],
    ));
    let rows = rows.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["rank"], 1);
}

#[test]
fn analytics_reports_the_pert_forecast() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = write_tasks(dir.path());

    let report = json(&prio(
        dir.path(),
        &[
            "analytics",
            "--input",
            tasks.to_str().expect("utf8"),
            "--task",
            "T-2",
        ],
    ));
    assert_eq!(report["summary"]["effort_source"], "PERT");
    assert_eq!(report["dependency"]["node_count"], 2);
}

#[test]
fn unknown_task_fails_with_a_message() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = prio(dir.path(), &["score", "nope"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prio error: task nope not found"));
}

#[test]
fn rank_table_prints_one_line_per_task() {
    let dir = tempfile::tempdir().expect("tempdir");
    let tasks = write_tasks(dir.path());

    let output = prio(
        dir.path(),
        &["rank", "--input", tasks.to_str().expect("utf8"), "--format", "table"],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("rank"));
    assert!(lines[0].contains("score"));
    assert!(stdout.contains("T-1") && stdout.contains("T-2"));
    assert!(!stdout.contains('\u{1b}'));
}

#[test]
fn rejected_weight_names_the_setting() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_prio"))
        .args(["config"])
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .env("PRIO_ANALYSIS__WEIGHTS__RICE", "-2")
        .output()
        .expect("prio should run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("analysis.weights.RICE"), "stderr: {stderr}");
}
