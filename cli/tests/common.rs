//! # calibrs CLI Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every command is
//! run from a temporary working directory with its own `HOME` and
//! `XDG_CONFIG_HOME`, so no user or project configuration on the test host
//! leaks into the results.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// # Get calibrs Command (`calibrs_cmd`)
///
/// Creates an `assert_cmd::Command` for the compiled `calibrs` binary.
///
/// ## Panics
/// Panics if the `calibrs` binary cannot be found via `Command::cargo_bin`.
pub fn calibrs_cmd() -> Command {
    Command::cargo_bin("calibrs").expect("Failed to find calibrs binary for testing")
}

/// `calibrs_cmd` isolated inside `dir`: working directory, home and config
/// directory all point into it, and `CALIBRS_LIBRARY` is cleared.
pub fn isolated_cmd(dir: &TempDir) -> Command {
    let mut cmd = calibrs_cmd();
    cmd.current_dir(dir.path())
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join(".config"))
        .env_remove("CALIBRS_LIBRARY")
        .env_remove("RUST_LOG");
    cmd
}

/// Writes an executable shell script named `name` into `dir`.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// `PATH` with `dir` searched first.
pub fn path_with(dir: &Path) -> String {
    format!(
        "{}:{}",
        dir.display(),
        std::env::var("PATH").unwrap_or_default()
    )
}
