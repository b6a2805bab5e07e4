use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary run from `dir`, isolated from host settings
fn vidtask(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("vidtask").unwrap();
    cmd.current_dir(dir)
        .env_remove("VIDTASK_SETTINGS")
        .env_remove("VIDTASK_WORKERS")
        .env_remove("VIDTASK_FAIL_FAST")
        .env_remove("RUST_LOG");
    cmd
}

const VALID_DOCUMENT: &str = r#"{
    "global_settings": { "output_extension": "mp4" },
    "tasks": [
        { "order": 1, "type": "split",
          "parameters": { "source_file": "talk.mp4", "output_name": "parts/talk", "max_size": "25MB" } }
    ],
    "batch_tasks": [
        { "type": "clip", "path": "clips", "is_parallel": true,
          "tasks": [
            { "parameters": { "source_file": "a.mp4", "output_name": "a",
                              "intervals": [ { "start": "00:00:05", "end": "00:00:20" } ] } }
          ] }
    ]
}"#;

#[test]
fn test_help_lists_subcommands() {
    let dir = TempDir::new().unwrap();
    vidtask(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("split"))
        .stdout(predicate::str::contains("clip"));
}

#[test]
fn test_validate_accepts_well_formed_document() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tasks.json"), VALID_DOCUMENT).unwrap();

    vidtask(dir.path())
        .args(["validate", "--config", "tasks.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 tasks"))
        .stdout(predicate::str::contains("1 batch groups"));
}

#[test]
fn test_validate_accepts_yaml_document() {
    let dir = TempDir::new().unwrap();
    let yaml = "tasks:\n  - type: download\n    parameters:\n      \
                url: https://cdn.example.com/live.m3u8\n      output_filename: live.mp4\n";
    fs::write(dir.path().join("tasks.yaml"), yaml).unwrap();

    vidtask(dir.path())
        .args(["validate", "-c", "tasks.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("download https://cdn.example.com/live.m3u8"));
}

#[test]
fn test_validate_rejects_mixed_group() {
    let dir = TempDir::new().unwrap();
    let json = r#"{
        "batch_tasks": [
            { "type": "download", "tasks": [
                { "parameters": { "url": "https://cdn.example.com/a.m3u8", "output_filename": "a.mp4" } },
                { "type": "split", "parameters": { "source_file": "a.mp4", "output_name": "a",
                                                   "output_extension": "mp4", "max_size": 1000 } }
            ] }
        ]
    }"#;
    fs::write(dir.path().join("mixed.json"), json).unwrap();

    vidtask(dir.path())
        .args(["validate", "--config", "mixed.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("mixes download and split"));
}

#[test]
fn test_validate_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tasks.txt"), VALID_DOCUMENT).unwrap();

    vidtask(dir.path())
        .args(["validate", "--config", "tasks.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unsupported task document format"));
}

#[test]
fn test_split_rejects_bad_size_before_running() {
    let dir = TempDir::new().unwrap();
    vidtask(dir.path())
        .args(["split", "-i", "in.mp4", "-o", "out", "-m", "lots"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid size"));
}

#[test]
fn test_download_rejects_non_http_url() {
    let dir = TempDir::new().unwrap();
    vidtask(dir.path())
        .args(["download", "-u", "ftp://example.com/a.ts", "-o", "a.mp4"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("expected http or https"));
}

#[test]
fn test_zero_workers_is_a_usage_error() {
    let dir = TempDir::new().unwrap();
    vidtask(dir.path())
        .args(["--workers", "0", "validate", "-c", "tasks.json"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_settings_file_is_reported() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("tasks.json"), VALID_DOCUMENT).unwrap();
    fs::write(dir.path().join("vidtask.toml"), "[split]\nsafety_factor = 1.5\n").unwrap();

    vidtask(dir.path())
        .args(["validate", "-c", "tasks.json"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("split.safety_factor"));
}
