//! Integration tests for the command-line entry point
//!
//! These tests run the `datapipes` binary and check its exit codes:
//! - 0 for `--version` and a successful run
//! - 2 for a missing or invalid configuration
//! - 1 for a run that fails while moving data

mod common;

use common::{orders, read_csv, Workspace};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn datapipes(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_datapipes"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("run datapipes")
}

fn write_config(ws: &Workspace, source_key: &str) -> PathBuf {
    let yaml = format!(
        r#"
log_level: info
log_format: text
independent_runs:
  copy:
    data_sources:
      S:
        format: csv
        key: {source_key}
        path: {input}
        observers: [passthrough]
    algorithms:
      passthrough:
        observers: [Out]
    data_output:
      Out:
        format: csv
        key: copied
        path: {output}
"#,
        input = ws.input().display(),
        output = ws.output().display()
    );
    let path = ws.path().join("config.yml");
    std::fs::write(&path, yaml).unwrap();
    path
}

fn cfg_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[test]
fn test_version_exits_zero() {
    let out = datapipes(&["--version"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_config_exits_two() {
    let out = datapipes(&["--cfg", "/nonexistent/datapipes.yml"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nonexistent/datapipes.yml"));
}

#[test]
fn test_invalid_config_exits_two() {
    let ws = Workspace::new();
    let path = ws.path().join("config.yml");
    std::fs::write(&path, "independent_runs: {}\n").unwrap();

    let out = datapipes(&["--cfg", &cfg_arg(&path)]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn test_missing_source_file_exits_one() {
    let ws = Workspace::new();
    let path = write_config(&ws, "absent");

    let out = datapipes(&["--cfg", &cfg_arg(&path)]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("absent.csv"));
    assert!(!ws.output_file("copied").exists());
}

#[test]
fn test_successful_run_exits_zero() {
    let ws = Workspace::new();
    ws.seed("orders", &orders());
    let path = write_config(&ws, "orders");

    let out = datapipes(&["--cfg", &cfg_arg(&path)]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "{}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(read_csv(&ws.output_file("copied")).height(), 4);
}
