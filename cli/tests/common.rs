//! # Archive Plugin Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Each test drives
//! the compiled `archive-plugin` binary the way a CI runner does: through
//! `PLUGIN_*` environment variables.
//!

// Allow potentially unused code in this common module, as different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::fs;
use std::path::Path;

/// # Get Plugin Command (`plugin_cmd`)
///
/// Returns an `assert_cmd::Command` for the `archive-plugin` binary with a
/// clean environment, so no `PLUGIN_*` or `RUST_LOG` value leaks in from the
/// machine running the tests.
///
/// ## Panics
/// Panics if the binary cannot be found via `Command::cargo_bin`.
pub fn plugin_cmd() -> Command {
    let mut cmd =
        Command::cargo_bin("archive-plugin").expect("Failed to find archive-plugin binary");
    cmd.env_clear();
    cmd
}

/// A plugin command preconfigured with source, target, format and action.
pub fn operation_cmd(source: &Path, target: &Path, format: &str, action: &str) -> Command {
    let mut cmd = plugin_cmd();
    cmd.env("PLUGIN_SOURCE", source)
        .env("PLUGIN_TARGET", target)
        .env("PLUGIN_FORMAT", format)
        .env("PLUGIN_ACTION", action);
    cmd
}

/// Writes `files` (relative path, contents) under `root`, creating parents.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("Failed to create fixture directory");
        }
        fs::write(&path, contents).expect("Failed to write fixture file");
    }
}
