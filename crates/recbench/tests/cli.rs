//! Exit codes and artifacts of the recbench binary in headless mode

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

fn recbench() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_recbench"));
    cmd.arg("--headless").env_remove("RUST_LOG");
    cmd
}

fn write_stub(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("recommender");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn test_successful_run_writes_report() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        r#"echo '{"query_time": 10, "memory_usage": 5, "groq_latency": 2}'"#,
    );
    let out = dir.path().join("results");

    recbench()
        .args(["--executable", stub.to_str().unwrap()])
        .args(["--iterations", "5"])
        .args(["--output-dir", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Benchmark Results:"))
        .stdout(predicate::str::contains("query_time:"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("benchmark_results.json")).unwrap())
            .unwrap();
    assert_eq!(report["results"]["query_time"].as_array().unwrap().len(), 5);
    assert_eq!(report["analysis"]["query_time"]["mean"], 10.0);
    assert_eq!(report["analysis"]["query_time"]["std"], 0.0);
    assert_eq!(report["config"]["query"], "fantasy books with magic");
    assert!(out.join("query_time_distribution.json").exists());
    assert!(out.join("groq_latency_percentiles.json").exists());
}

#[test]
fn test_malformed_output_does_not_abort() {
    let dir = tempdir().unwrap();
    let counter = dir.path().join("count");
    let stub = write_stub(
        dir.path(),
        &format!(
            r#"n=$(cat '{c}' 2>/dev/null || echo 0); n=$((n + 1)); echo "$n" > '{c}'
if [ "$n" -eq 3 ]; then echo 'oops'; else echo '{{"query_time": 1, "memory_usage": 1, "groq_latency": 1}}'; fi"#,
            c = counter.display()
        ),
    );
    let out = dir.path().join("results");

    recbench()
        .args(["--executable", stub.to_str().unwrap()])
        .args(["--iterations", "5"])
        .args(["--output-dir", out.to_str().unwrap()])
        .arg("--no-plot-data")
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("benchmark_results.json")).unwrap())
            .unwrap();
    assert_eq!(report["results"]["memory_usage"].as_array().unwrap().len(), 4);
    assert_eq!(report["config"]["dropped"], 1);
    assert!(!out.join("query_time_distribution.json").exists());
}

#[test]
fn test_missing_executable_exits_nonzero() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("results");

    recbench()
        .args(["--executable", dir.path().join("missing").to_str().unwrap()])
        .args(["--iterations", "3"])
        .args(["--output-dir", out.to_str().unwrap()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: failed to launch"));

    assert!(!out.join("benchmark_results.json").exists());
}

#[test]
fn test_zero_iterations_rejected() {
    let dir = tempdir().unwrap();
    let stub = write_stub(dir.path(), "exit 0");
    recbench()
        .args(["--executable", stub.to_str().unwrap()])
        .args(["--iterations", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("iterations must be a positive integer"));
}

#[test]
fn test_interrupt_writes_partial_report_and_exits_one() {
    let dir = tempdir().unwrap();
    let stub = write_stub(
        dir.path(),
        r#"sleep 0.3; echo '{"query_time": 7, "memory_usage": 5, "groq_latency": 2}'"#,
    );
    let out = dir.path().join("results");

    let child = std::process::Command::new(env!("CARGO_BIN_EXE_recbench"))
        .arg("--headless")
        .args(["--executable", stub.to_str().unwrap()])
        .args(["--iterations", "100"])
        .args(["--output-dir", out.to_str().unwrap()])
        .env_remove("RUST_LOG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(1200));
    let killed = std::process::Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(killed.success());

    let output = child.wait_with_output().unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr);
    assert!(stderr.contains("Benchmark interrupted by user"));

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(out.join("benchmark_results.json")).unwrap())
            .unwrap();
    assert_eq!(report["config"]["stop_reason"], "interrupted");

    let attempted = report["config"]["attempted"].as_u64().unwrap();
    let dropped = report["config"]["dropped"].as_u64().unwrap();
    let collected = report["results"]["query_time"].as_array().unwrap().len() as u64;
    assert!(attempted >= 1 && attempted < 100, "attempted {}", attempted);
    assert_eq!(collected, attempted - dropped);
}

#[test]
fn test_tui_without_terminal_launches_nothing() {
    // setsid detaches from any controlling terminal, so the TUI cannot start
    let has_setsid = std::process::Command::new("setsid")
        .arg("true")
        .status()
        .map(|s| s.success())
        .unwrap_or(false);
    if !has_setsid {
        return;
    }

    let dir = tempdir().unwrap();
    let marker = dir.path().join("launched");
    let stub = write_stub(
        dir.path(),
        &format!(
            r#"touch '{m}'; echo '{{"query_time": 1, "memory_usage": 1, "groq_latency": 1}}'"#,
            m = marker.display()
        ),
    );
    let out = dir.path().join("results");

    let output = std::process::Command::new("setsid")
        .arg(env!("CARGO_BIN_EXE_recbench"))
        .args(["--executable", stub.to_str().unwrap()])
        .args(["--iterations", "5"])
        .args(["--output-dir", out.to_str().unwrap()])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
    assert!(!marker.exists());
    assert!(!out.join("benchmark_results.json").exists());
}
