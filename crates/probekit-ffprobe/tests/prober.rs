//! Prober tests against a stand-in ffprobe script.
//!
//! The script records its arguments and stdin, then prints a saved report,
//! so these run without ffmpeg installed.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_matches::assert_matches;
use probekit_ffprobe::{Error, Ffprobe};
use probekit_model::StreamType;
use tempfile::TempDir;

fn fixture() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../probekit-model/tests/fixtures/test_mp4.json")
}

/// Write an executable script named `ffprobe` into a fresh directory.
fn fake_ffprobe(body: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ffprobe");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    (dir, path)
}

fn recorded_args(dir: &TempDir) -> Vec<String> {
    std::fs::read_to_string(dir.path().join("args"))
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_probe_url_parses_report() {
    let body = format!(
        "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\ncat '{}'",
        fixture().display()
    );
    let (dir, path) = fake_ffprobe(&body);

    let data = Ffprobe::new(&path)
        .with_extra_args(["-analyzeduration", "10M"])
        .probe_url("assets/test.mp4")
        .await
        .unwrap();

    assert_eq!(data.stream_type(StreamType::Any).len(), 3);
    assert_eq!(data.format.tag_list.get_string("major_brand").unwrap(), "isom");
    assert_eq!(data.chapters[1].title(), "Middle");

    let args = recorded_args(&dir);
    assert_eq!(args.first().map(String::as_str), Some("-loglevel"));
    assert!(args.contains(&"-show_chapters".to_string()));
    assert_eq!(&args[args.len() - 3..], ["-analyzeduration", "10M", "assets/test.mp4"]);
}

#[tokio::test]
async fn test_probe_reader_pipes_stdin() {
    let body = format!(
        "printf '%s\\n' \"$@\" > \"$(dirname \"$0\")/args\"\ncat > \"$(dirname \"$0\")/stdin\"\ncat '{}'",
        fixture().display()
    );
    let (dir, path) = fake_ffprobe(&body);

    let media = b"\x00\x00\x00\x20ftypisom".to_vec();
    let data = Ffprobe::new(&path)
        .probe_reader(&media[..])
        .await
        .unwrap();

    assert_eq!(data.streams.len(), 3);
    assert_eq!(recorded_args(&dir).last().map(String::as_str), Some("-"));
    assert_eq!(std::fs::read(dir.path().join("stdin")).unwrap(), media);
}

#[tokio::test]
async fn test_failure_includes_stderr() {
    let (_dir, path) = fake_ffprobe(
        "echo 'assets/test.avi: Invalid data found when processing input' >&2\nexit 1",
    );

    let err = Ffprobe::new(&path)
        .probe_url_with_args("assets/test.avi", &["-loglevel".to_string(), "error".to_string()])
        .await
        .unwrap_err();

    assert_matches!(&err, Error::Tool { .. });
    assert!(err.to_string().contains("Invalid data found"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_missing_format_section_is_an_error() {
    let (_dir, path) = fake_ffprobe("echo '{}'");
    let err = Ffprobe::new(&path).probe_url("empty.bin").await.unwrap_err();
    assert_matches!(err, Error::Tool { message, .. } if message.contains("no format data"));
}

#[tokio::test]
async fn test_non_json_output() {
    let (_dir, path) = fake_ffprobe("echo 'not json'");
    let err = Ffprobe::new(&path).probe_url("x.mp4").await.unwrap_err();
    assert_matches!(err, Error::Model(probekit_model::Error::Json(_)));
}

#[tokio::test]
async fn test_timeout_kills_probe() {
    let (_dir, path) = fake_ffprobe("sleep 10");
    let err = Ffprobe::new(&path)
        .with_timeout(Duration::from_millis(200))
        .probe_url("slow.ts")
        .await
        .unwrap_err();
    assert!(err.to_string().contains("timed out"), "unexpected error: {err}");
}

#[tokio::test]
async fn test_missing_binary() {
    let dir = tempfile::tempdir().unwrap();
    let err = Ffprobe::new(dir.path().join("ffprobe"))
        .probe_url("x.mp4")
        .await
        .unwrap_err();
    assert_matches!(err, Error::ToolNotFound { .. });
}
