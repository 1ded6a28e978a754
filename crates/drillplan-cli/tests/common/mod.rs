//! Common utilities for CLI E2E tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::Command;

pub const LIST: &str = r#"{
  "name": "Tiny 4",
  "categories": {
    "Arrays": [
      { "id": 1, "title": "Two Sum", "leetcode_url": "https://leetcode.com/problems/two-sum/" },
      { "id": 217, "title": "Contains Duplicate" }
    ],
    "Stack": [
      { "id": 20, "title": "Valid Parentheses" },
      { "id": 155, "title": "Min Stack" }
    ]
  }
}"#;

/// Invoke the CLI against a journey root and return (stdout, stderr, code).
pub fn run_cli(root: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_drillplan"))
        .arg("--root")
        .arg(root)
        .args(["--date", "2026-08-03"])
        .args(args)
        .env_remove("DRILLPLAN_HOME")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Invoke a CLI command and expect success.
pub fn run_cli_success(root: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(root, args);
    assert_eq!(code, 0, "CLI command failed with code {code}: {args:?}\n{stderr}");
    stdout
}

/// Invoke a CLI command and expect failure.
pub fn run_cli_failure(root: &Path, args: &[&str]) -> (String, String, i32) {
    let (stdout, stderr, code) = run_cli(root, args);
    assert!(code != 0, "CLI command unexpectedly succeeded: {args:?}");
    (stdout, stderr, code)
}

/// Parse JSON output from CLI.
pub fn parse_json<T: for<'de> serde::Deserialize<'de>>(json: &str) -> T {
    serde_json::from_str(json).expect("Failed to parse JSON output")
}

/// A journey root with the tiny list installed and initialized at 2/day.
pub fn initialized_root() -> tempfile::TempDir {
    let temp = tempfile::TempDir::new().unwrap();
    let lists = temp.path().join("problem_lists");
    std::fs::create_dir_all(&lists).unwrap();
    std::fs::write(lists.join("Tiny4.json"), LIST).unwrap();
    run_cli_success(temp.path(), &["init", "--list", "Tiny 4", "--per-day", "2"]);
    temp
}
