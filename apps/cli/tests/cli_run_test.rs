//! Integration tests for the `netsec-cli run` and `netsec-cli runs` commands.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fmt::Write as _;
use std::fs;
use tempfile::TempDir;

const SCHEMA: &str = "\
columns:
  - having_IP_Address: int64
  - SSLfinal_State: int64
  - Page_Rank: int64
  - Result: int64
numerical_columns:
  - having_IP_Address
  - SSLfinal_State
  - Page_Rank
  - Result
";

/// Helper to lay out a runnable project: JSONL records, schema and settings.
fn init_project(temp_dir: &TempDir, records: usize) {
    let mut jsonl = String::new();
    for i in 0..records {
        let ssl = if i % 2 == 0 { 1 } else { -1 };
        let ip = if i % 3 == 0 { "\"na\"".to_string() } else { "1".to_string() };
        writeln!(
            jsonl,
            r#"{{"_id": "rec-{i}", "having_IP_Address": {ip}, "SSLfinal_State": {ssl}, "Page_Rank": {}, "Result": {ssl}}}"#,
            if i % 5 == 0 { 1 } else { -1 }
        )
        .unwrap();
    }
    fs::write(temp_dir.path().join("records.jsonl"), jsonl).unwrap();

    fs::create_dir_all(temp_dir.path().join("data_schema")).unwrap();
    fs::write(temp_dir.path().join("data_schema/schema.yaml"), SCHEMA).unwrap();

    let settings = r#"[ingestion]
source = "jsonl"
jsonl_path = "records.jsonl"
seed = 7
"#;
    fs::write(temp_dir.path().join("netsec.toml"), settings).unwrap();
}

/// Replaces the records with constant features and alternating labels and
/// sets a gate no model can pass: a constant predictor never reaches a
/// perfect train f1, so either the test f1 or the train/test gap fails.
fn init_unlearnable_project(temp_dir: &TempDir, enforce: bool) {
    init_project(temp_dir, 40);
    fs::write(
        temp_dir.path().join("records.jsonl"),
        (0..40)
            .map(|i| {
                let label = if i % 2 == 0 { 1 } else { -1 };
                format!(r#"{{"having_IP_Address": 1, "SSLfinal_State": 1, "Page_Rank": 1, "Result": {label}}}"#)
            })
            .collect::<Vec<_>>()
            .join("\n"),
    )
    .unwrap();

    let mut settings = fs::read_to_string(temp_dir.path().join("netsec.toml")).unwrap();
    writeln!(
        settings,
        "\n[trainer]\nexpected_score = 1.0\noverfitting_threshold = 0.0\nenforce_quality_gate = {enforce}"
    )
    .unwrap();
    fs::write(temp_dir.path().join("netsec.toml"), settings).unwrap();
}

fn netsec(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("netsec-cli").unwrap();
    cmd.current_dir(temp_dir.path()).env_remove("MONGODB_URL");
    cmd
}

#[test]
fn test_run_trains_and_lists_run() {
    let temp_dir = TempDir::new().unwrap();
    init_project(&temp_dir, 60);

    netsec(&temp_dir)
        .arg("run")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("Training complete"))
        .stdout(predicate::str::contains("model.json"));

    let artifacts = temp_dir.path().join("Artifacts");
    let run_dirs: Vec<_> = fs::read_dir(&artifacts).unwrap().collect();
    assert_eq!(run_dirs.len(), 1);
    let run_dir = run_dirs[0].as_ref().unwrap().path();
    assert!(run_dir.join("run_manifest.json").exists());
    assert!(run_dir.join("data_ingestion/ingested/train.csv").exists());
    assert!(run_dir.join("data_validation/drift_report/report.yaml").exists());

    let output = netsec(&temp_dir).arg("runs").arg("--json").output().unwrap();
    assert!(output.status.success());
    let manifests: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(manifests.as_array().map(Vec::len), Some(1));
}

#[test]
fn test_default_command_is_run() {
    let temp_dir = TempDir::new().unwrap();
    init_project(&temp_dir, 40);

    netsec(&temp_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("data ingestion completed"));
}

#[test]
fn test_run_fails_when_enforced_quality_gate_rejects_model() {
    let temp_dir = TempDir::new().unwrap();
    init_unlearnable_project(&temp_dir, true);

    netsec(&temp_dir)
        .arg("run")
        .arg("--quiet")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Training pipeline failed"));

    netsec(&temp_dir).arg("runs").assert().success().stdout(predicate::str::contains("No completed runs"));
}

#[test]
fn test_run_keeps_model_rejected_by_quality_gate() {
    let temp_dir = TempDir::new().unwrap();
    init_unlearnable_project(&temp_dir, false);

    netsec(&temp_dir)
        .arg("run")
        .arg("--quiet")
        .assert()
        .success()
        .stdout(predicate::str::contains("model did not pass the quality gate"))
        .stdout(predicate::str::contains("model.json"));

    let output = netsec(&temp_dir).arg("runs").arg("--json").output().unwrap();
    let manifests: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(manifests[0]["quality_gate_passed"], serde_json::json!(false));
}

#[test]
fn test_mongo_source_without_url_fails() {
    let temp_dir = TempDir::new().unwrap();

    netsec(&temp_dir)
        .arg("run")
        .assert()
        .failure()
        .stdout(predicate::str::contains("failed to build document source"))
        .stderr(predicate::str::contains("mongodb_url"));
}

#[test]
fn test_invalid_stage_settings_are_logged_before_any_stage() {
    let temp_dir = TempDir::new().unwrap();
    init_project(&temp_dir, 20);

    netsec(&temp_dir)
        .arg("run")
        .env("NETSEC_TRANSFORMATION__N_NEIGHBORS", "0")
        .assert()
        .failure()
        .stdout(predicate::str::contains("pipeline configuration rejected"))
        .stdout(predicate::str::contains("initiating stage").not());

    assert!(!temp_dir.path().join("Artifacts").exists());
}

#[test]
fn test_missing_config_file_fails() {
    let temp_dir = TempDir::new().unwrap();

    netsec(&temp_dir)
        .arg("--config")
        .arg("absent.toml")
        .arg("runs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("settings file not found"));
}

#[test]
fn test_config_prints_resolved_settings() {
    let temp_dir = TempDir::new().unwrap();
    init_project(&temp_dir, 10);

    netsec(&temp_dir)
        .arg("config")
        .env("NETSEC_INGESTION__SPLIT_RATIO", "0.3")
        .assert()
        .success()
        .stdout(predicate::str::contains("split_ratio = 0.3"))
        .stdout(predicate::str::contains("source = \"jsonl\""));
}
