//! Integration tests for the scalebench CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an executable shell script standing in for the program under test
#[cfg(unix)]
fn stub_program(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake_lcs.sh");
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Reports faster computation times as the worker argument grows
#[cfg(unix)]
const SCALING_PROGRAM: &str = r#"test -s "$1" || exit 3
case "$3" in
  1) t=4.0 ;;
  2) t=2.2 ;;
  *) t=1.2 ;;
esac
echo "Sequence lengths: A=?, B=?"
echo "Total time: 5.0 seconds"
echo "LCS computation time: $t seconds""#;

#[cfg(unix)]
fn run_cmd(program: &Path, output: &Path, work: &Path) -> Command {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("run")
        .arg("--program")
        .arg(program)
        .arg("--workers")
        .arg("1,2,4")
        .arg("--sizes")
        .arg("64")
        .arg("--weak-base-size")
        .arg("16")
        .arg("-n")
        .arg("2")
        .arg("--work-dir")
        .arg(work)
        .arg("--output-dir")
        .arg(output)
        .arg("--no-timestamp")
        .arg("--quiet");
    cmd
}

#[cfg(unix)]
#[test]
fn test_run_writes_all_result_files() {
    let temp_dir = TempDir::new().unwrap();
    let program = stub_program(temp_dir.path(), SCALING_PROGRAM);
    let output = temp_dir.path().join("results");

    run_cmd(&program, &output, &temp_dir.path().join("inputs"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Strong scaling (input size 64)"))
        .stdout(predicate::str::contains("Weak scaling"))
        .stdout(predicate::str::contains("Sequential fraction analysis"));

    for name in [
        "strong_scalability.csv",
        "strong_scalability.json",
        "weak_scalability.csv",
        "weak_scalability.json",
        "sequential_analysis.csv",
        "amdahl_law.csv",
    ] {
        assert!(output.join(name).exists(), "missing {name}");
    }

    let strong = fs::read_to_string(output.join("strong_scalability.csv")).unwrap();
    let rows: Vec<&str> = strong.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("strong,64,1,"));
    assert!(rows[2].starts_with("strong,64,2,"));
    assert!(rows[3].starts_with("strong,64,4,"));

    let weak = fs::read_to_string(output.join("weak_scalability.csv")).unwrap();
    assert!(weak.contains("weak,64,4,16,"));
}

#[cfg(unix)]
#[test]
fn test_run_strong_only_json() {
    let temp_dir = TempDir::new().unwrap();
    let program = stub_program(temp_dir.path(), SCALING_PROGRAM);
    let output = temp_dir.path().join("results");

    let assert = run_cmd(&program, &output, temp_dir.path())
        .arg("--mode")
        .arg("strong")
        .arg("--format")
        .arg("json")
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let tables: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let first = &tables[0];
    assert_eq!(first["title"], "Strong scaling (input size 64)");
    assert_eq!(first["rows"][0]["Speedup"], 1.0);
    // 4.0 / 2.2
    assert_eq!(first["rows"][1]["Speedup"], 1.82);

    assert!(!output.join("weak_scalability.csv").exists());
}

#[cfg(unix)]
#[test]
fn test_crashing_program_keeps_partial_results() {
    let temp_dir = TempDir::new().unwrap();
    let program = stub_program(
        temp_dir.path(),
        r#"if [ "$3" = "4" ]; then echo "boom" >&2; exit 1; fi
echo "Total time: 2.0 seconds"
echo "LCS computation time: 1.5 seconds""#,
    );
    let output = temp_dir.path().join("results");

    run_cmd(&program, &output, temp_dir.path())
        .arg("--abort-on-failure")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Run aborted"))
        .stderr(predicate::str::contains("boom"));

    let strong = fs::read_to_string(output.join("strong_scalability.csv")).unwrap();
    assert_eq!(strong.lines().count(), 3);
    assert!(output.join("sequential_analysis.csv").exists());
    assert!(!output.join("weak_scalability.csv").exists());
}

#[cfg(unix)]
#[test]
fn test_unparseable_output_fails() {
    let temp_dir = TempDir::new().unwrap();
    let program = stub_program(temp_dir.path(), r#"echo "Usage: lcs fileA fileB""#);
    let output = temp_dir.path().join("results");

    run_cmd(&program, &output, temp_dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Total time:"));
}

#[test]
fn test_missing_program() {
    let temp_dir = TempDir::new().unwrap();
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("run")
        .arg("--program")
        .arg(temp_dir.path().join("no_such_program"))
        .arg("--output-dir")
        .arg(temp_dir.path())
        .arg("--quiet");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Program not found"));
}

#[test]
fn test_run_rejects_workers_without_baseline() {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("run")
        .arg("--program")
        .arg("lcs")
        .arg("--workers")
        .arg("2,4")
        .arg("--quiet");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("must include 1"));
}

#[test]
fn test_amdahl_table() {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("amdahl").arg("--fraction").arg("0.1");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Amdahl's law (sequential fraction 0.1000)"))
        .stdout(predicate::str::contains("∞"))
        .stdout(predicate::str::contains("10.00"));
}

#[test]
fn test_amdahl_markdown() {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("amdahl")
        .arg("--fraction")
        .arg("0.5")
        .arg("--workers")
        .arg("1,2")
        .arg("-f")
        .arg("markdown");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("| 2 | 1.33 |"))
        .stdout(predicate::str::contains("| ∞ | 2.00 |"));
}

#[test]
fn test_amdahl_rejects_out_of_range_fraction() {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("amdahl").arg("--fraction").arg("1.5");

    cmd.assert().failure();
}

#[test]
fn test_generate_then_validate() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bench.toml");

    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("generate-config").arg("--output").arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("generated successfully"));

    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("validate").arg("--config").arg(&config);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"));
}

#[test]
fn test_validate_invalid_config() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("bench.toml");
    fs::write(&config, "[sweep]\niterations = 0\n").unwrap();

    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("validate").arg("--config").arg(&config);
    cmd.assert()
        .failure()
        .stdout(predicate::str::contains("Configuration is invalid"));
}

#[test]
fn test_help_lists_subcommands() {
    let mut cmd = Command::cargo_bin("scalebench").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("amdahl"))
        .stdout(predicate::str::contains("generate-config"))
        .stdout(predicate::str::contains("validate"));
}
