//! CLI end-to-end tests
//!
//! Tests for the probekit command-line interface. Everything here runs
//! without ffprobe installed.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

/// Get a command for the probekit binary
#[allow(deprecated)]
fn probekit_cmd() -> Command {
    Command::cargo_bin("probekit").unwrap()
}

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("crates/probekit-model/tests/fixtures")
        .join(name)
}

#[test]
fn test_cli_no_args_shows_help() {
    let mut cmd = probekit_cmd();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_cli_help_flag() {
    let mut cmd = probekit_cmd();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("probekit"))
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn test_cli_version_flag() {
    let mut cmd = probekit_cmd();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_probe_help() {
    let mut cmd = probekit_cmd();
    cmd.args(["probe", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--timeout"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_cli_parse_fixture_summary() {
    let mut cmd = probekit_cmd();
    cmd.arg("parse")
        .arg(fixture("test_mp4.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Input: test.mp4"))
        .stdout(predicate::str::contains("Duration: 00:00:05.312"))
        .stdout(predicate::str::contains("major_brand: isom"))
        .stdout(predicate::str::contains(
            "Streams: 3 (video 1, audio 1, subtitle 0, data 1, attachment 0)",
        ))
        .stdout(predicate::str::contains("[0] video h264 1280x720"))
        .stdout(predicate::str::contains("2.000000 - 4.000000 Middle"));
}

#[test]
fn test_cli_parse_shows_rotation() {
    let mut cmd = probekit_cmd();
    cmd.arg("parse")
        .arg(fixture("test_mov.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("rotated -180°"));
}

#[test]
fn test_cli_parse_json_output() {
    let output = probekit_cmd()
        .args(["parse", "--json"])
        .arg(fixture("test_mp4.json"))
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["format"]["tags"]["major_brand"], "isom");
    assert_eq!(json["streams"].as_array().unwrap().len(), 3);
    assert_eq!(json["chapters"][1]["tags"]["title"], "Middle");
}

#[test]
fn test_cli_parse_stdin() {
    let document = fs::read(fixture("test_mp4.json")).unwrap();
    probekit_cmd()
        .args(["parse", "-"])
        .write_stdin(document)
        .assert()
        .success()
        .stdout(predicate::str::contains("Chapters: 3"));
}

#[test]
fn test_cli_parse_nonexistent_file() {
    let mut cmd = probekit_cmd();
    cmd.args(["parse", "/nonexistent/report.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read document"));
}

#[test]
fn test_cli_parse_invalid_document() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    probekit_cmd()
        .arg("parse")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid probe document"));
}

#[test]
fn test_cli_streams_rejects_unknown_type() {
    let mut cmd = probekit_cmd();
    cmd.args(["streams", "movie.mkv", "--type", "pictures"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pictures"));
}

#[test]
fn test_cli_invalid_config_rejected() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("probekit.toml");
    fs::write(&config_path, "[ffprobe]\ntimeout_secs = 0\n").unwrap();

    probekit_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["probe", "movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout_secs"));
}

#[test]
fn test_cli_probe_with_missing_configured_tool() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("probekit.toml");
    let missing = dir.path().join("ffprobe");
    fs::write(
        &config_path,
        format!("[ffprobe]\npath = {:?}\ntimeout_secs = 5\n", missing),
    )
    .unwrap();

    probekit_cmd()
        .arg("--config")
        .arg(&config_path)
        .args(["probe", "movie.mkv"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to probe movie.mkv"));
}

#[test]
fn test_cli_check_tools_command() {
    let mut cmd = probekit_cmd();
    cmd.arg("check-tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("ffprobe"));
}
