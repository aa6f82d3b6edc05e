//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn copycat() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("copycat").unwrap();
    cmd.env_remove("COPYCAT_CORPUS");
    cmd
}

/// A corpus with four students in F23 and one in S24.
///
/// alice/bob declare each other, carol names dave (who names nobody), and
/// erin declares alice from another semester.
fn make_corpus() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    std::fs::write(
        root.join("semesters.csv"),
        "alice,F23\nbob,F23\ncarol,F23\ndave,F23\nerin,S24\n",
    )
    .unwrap();
    std::fs::write(root.join("students.txt"), "alice\nbob\ncarol\ndave\nerin\n").unwrap();

    for (student, partner) in [("alice", "bob"), ("bob", "alice"), ("carol", "dave"), ("erin", "alice")] {
        let student_dir = root.join("hw1").join(student);
        std::fs::create_dir_all(&student_dir).unwrap();
        std::fs::write(student_dir.join("partners.txt"), format!("{partner}\n")).unwrap();
    }
    std::fs::create_dir_all(root.join("hw1").join("dave")).unwrap();

    let config = format!(
        "corpus_path = {:?}\n\n[assignments.hw1]\nallow_partners = true\nfiles = [\"main.c\"]\n",
        root.display().to_string()
    );
    let config_path = root.join("copycat.toml");
    std::fs::write(&config_path, config).unwrap();

    (dir, config_path)
}

fn write_candidates(root: &Path) -> PathBuf {
    let path = root.join("candidates.json");
    std::fs::write(
        &path,
        r#"[
  {"file": "main_c_", "score": 1.0, "students": ["alice", "bob"]},
  {"file": "main_c_", "score": 0.9, "students": ["carol", "dave"]},
  {"file": "util_c_", "score": 0.8, "students": ["erin", "alice"]},
  {"file": "util_c_", "score": 0.5, "students": ["bob"]}
]"#,
    )
    .unwrap();
    path
}

fn run_cluster(config: &Path, candidates: &Path) {
    copycat()
        .arg("cluster")
        .arg("--assignment")
        .arg("hw1")
        .arg("--candidates")
        .arg(candidates)
        .arg("--config")
        .arg(config)
        .assert()
        .success();
}

#[test]
fn init_creates_config() {
    let dir = TempDir::new().unwrap();

    copycat()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created copycat.toml"));

    assert!(dir.path().join("copycat.toml").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    copycat().current_dir(dir.path()).arg("init").assert().success();

    copycat()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn validate_reports_roster() {
    let (_dir, config) = make_corpus();

    copycat()
        .arg("validate")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Roster: 5 students"))
        .stdout(predicate::str::contains("Config valid."));
}

#[test]
fn validate_nonexistent_config() {
    copycat()
        .arg("validate")
        .arg("--config")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn cluster_writes_only_cheating_clusters() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());

    copycat()
        .arg("cluster")
        .arg("--assignment")
        .arg("hw1")
        .arg("--candidates")
        .arg(&candidates)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("hw1"));

    let report_path = dir
        .path()
        .join(".copycat/postprocessed/hw1/clusters.json");
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();

    // alice/bob are mutual partners and the lone bob cluster cannot cheat.
    let expected = serde_json::json!([
        {
            "allowPartners": true,
            "file": "main_c_",
            "score": 0.9,
            "members": [
                {"student": "carol", "partner": "dave", "semester": "F23"},
                {"student": "dave", "partner": null, "semester": "F23"}
            ]
        },
        {
            "allowPartners": true,
            "file": "util_c_",
            "score": 0.8,
            "members": [
                {"student": "erin", "partner": null, "semester": "S24"},
                {"student": "alice", "partner": "bob", "semester": "F23"}
            ]
        }
    ]);
    assert_eq!(report, expected);
}

#[test]
fn cluster_custom_output_name() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());

    copycat()
        .arg("cluster")
        .arg("--assignment")
        .arg("hw1")
        .arg("--candidates")
        .arg(&candidates)
        .arg("--output")
        .arg("main_c_")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join(".copycat/postprocessed/hw1/main_c_").is_file());
}

#[test]
fn cluster_names_report_after_source_file() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());

    copycat()
        .arg("cluster")
        .arg("--assignment")
        .arg("hw1")
        .arg("--candidates")
        .arg(&candidates)
        .arg("--file")
        .arg("util.c")
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    assert!(dir.path().join(".copycat/postprocessed/hw1/util_c_").is_file());
}

#[test]
fn cluster_missing_candidates_fails() {
    let (dir, config) = make_corpus();

    copycat()
        .arg("cluster")
        .arg("--assignment")
        .arg("hw1")
        .arg("--candidates")
        .arg(dir.path().join("missing.json"))
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.json"));
}

fn evaluate(config: &Path, index: usize, verdict: &str) -> assert_cmd::assert::Assert {
    copycat()
        .arg("evaluate")
        .arg("--assignment")
        .arg("hw1")
        .arg("--index")
        .arg(index.to_string())
        .arg("--verdict")
        .arg(verdict)
        .arg("--config")
        .arg(config)
        .assert()
}

fn read_report(root: &Path) -> serde_json::Value {
    let path = root.join(".copycat/postprocessed/hw1/clusters.json");
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn analyze_before_review() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);

    copycat()
        .arg("analyze")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("There are 5 total students"))
        .stdout(predicate::str::contains("For hw1/clusters.json:"))
        .stdout(predicate::str::contains("Unreviewed clusters -> 2"))
        .stdout(predicate::str::contains("Of which, 0 or 0.00%"));
}

#[test]
fn analyze_counts_reviewer_verdicts() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);
    evaluate(&config, 0, "clear").success();
    evaluate(&config, 1, "cheating").success();

    copycat()
        .arg("analyze")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("Directly implicated clusters -> 1"))
        .stdout(predicate::str::contains("False positive clusters -> 1"))
        .stdout(predicate::str::contains("Unreviewed clusters -> 0"))
        .stdout(predicate::str::contains("Inter-semester cheating clusters -> 1"));
}

#[test]
fn analyze_json_format() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);
    evaluate(&config, 1, "cheating").success();

    let output = copycat()
        .arg("analyze")
        .arg("--format")
        .arg("json")
        .arg("--config")
        .arg(&config)
        .output()
        .unwrap();
    assert!(output.status.success());

    let analysis: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(analysis["total_students"], 5);
    // erin, alice, and alice's declared partner bob.
    assert_eq!(analysis["cheaters"], 3);
    assert_eq!(analysis["reports"][0]["direct"], 1);
    assert_eq!(analysis["reports"][0]["unreviewed"], 1);
}

#[test]
fn evaluate_writes_verdict_into_report() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);

    evaluate(&config, 1, "cheating")
        .success()
        .stdout(predicate::str::contains("Marked hw1/clusters.json #1 as cheating."))
        .stdout(predicate::str::contains("erin: implicated by clusters.json #1"))
        .stdout(predicate::str::contains("bob: implicated by clusters.json #1"));

    let report = read_report(dir.path());
    assert_eq!(report[1]["evaluation"], 1);
    assert!(report[0].get("evaluation").is_none());
    assert_eq!(report[1]["members"][0]["student"], "erin");
}

#[test]
fn evaluate_clear_releases_students() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);
    evaluate(&config, 1, "cheating").success();

    evaluate(&config, 1, "clear")
        .success()
        .stdout(predicate::str::contains("alice: no confirmed clusters in hw1"));

    assert_eq!(read_report(dir.path())[1]["evaluation"], 2);
}

#[test]
fn evaluate_out_of_range() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);

    evaluate(&config, 9, "cheating")
        .failure()
        .stderr(predicate::str::contains("no cluster #9"));
}

#[test]
fn evaluate_rejects_unknown_verdict() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);

    evaluate(&config, 0, "maybe")
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn analyze_rejects_unknown_format() {
    let (_dir, config) = make_corpus();

    copycat()
        .arg("analyze")
        .arg("--format")
        .arg("xml")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn student_lookup() {
    let (dir, config) = make_corpus();
    let candidates = write_candidates(dir.path());
    run_cluster(&config, &candidates);

    copycat()
        .arg("student")
        .arg("erin")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("hw1/clusters.json #1: util_c_"))
        .stdout(predicate::str::contains("[unreviewed]"));

    copycat()
        .arg("student")
        .arg("nobody")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("No flagged clusters for nobody."));
}

#[test]
fn extract_without_archives() {
    let (_dir, config) = make_corpus();

    copycat()
        .arg("extract")
        .arg("--assignment")
        .arg("hw1")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("hw1: 0/5 extracted, 0 failed"));
}

#[test]
fn extract_unknown_assignment() {
    let (_dir, config) = make_corpus();

    copycat()
        .arg("extract")
        .arg("--assignment")
        .arg("hw9")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("assignment not configured: hw9"));
}
