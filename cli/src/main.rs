//! # Archive Plugin Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! This file serves as the main entry point for the archive plugin, a CI
//! pipeline step that creates or extracts one zip, tar(.gz) or gzip file per
//! invocation. It handles:
//! - Reading `PLUGIN_*` settings (or the equivalent flags) using Clap
//! - Setting up the logging system from `PLUGIN_LOG_LEVEL`
//! - Handing the resolved operation to the command layer
//!
//! ## Examples
//!
//! ```bash
//! # Zip a build directory, keeping only HTML files
//! PLUGIN_SOURCE=site PLUGIN_TARGET=site.zip PLUGIN_FORMAT=zip \
//! PLUGIN_ACTION=archive PLUGIN_GLOB='**/*.html' archive-plugin
//!
//! # Same thing from a shell, with verbose output
//! archive-plugin --source site --target site.zip --format zip --action archive --log-level debug
//! ```
//!
//! Processing flow:
//! 1. Parse settings via Clap
//! 2. Configure logging
//! 3. Resolve settings into an operation (or auto-detect mode) and run it
//! 4. Print any error with its cause chain and exit with status 1
//!
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

// Declare the top-level modules of the CLI crate.
mod commands; // Dispatcher and zip auto-detect mode
mod common; // Archive engine and filesystem helpers
mod core; // Configuration and errors

use crate::core::config::{LogLevel, PluginArgs};

/// Defines the top-level command-line arguments structure using Clap's derive macros.
#[derive(Parser, Debug)]
#[command(
    name = "archive-plugin",
    about = "Create or extract zip, tar and gzip archives in a CI pipeline step",
    long_about = "Create or extract zip, tar(.gz) and gzip archives.\n\
                  Every setting is read from its PLUGIN_* environment variable or the matching flag.",
    version
)]
struct Cli {
    #[command(flatten)]
    args: PluginArgs,
}

/// Installs the global `tracing` subscriber. At `info` lines carry the message
/// only; `RUST_LOG` takes precedence over `PLUGIN_LOG_LEVEL` when set.
fn init_logging(requested: &str) {
    let level = LogLevel::parse(requested);
    let effective = level.unwrap_or_default();
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective.as_filter()));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if effective == LogLevel::Info {
        builder.without_time().with_level(false).init();
    } else {
        builder.compact().init();
    }

    if level.is_none() {
        tracing::warn!("Unknown log level '{}', using info", requested);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.args.log_level);
    tracing::debug!("Parsed CLI arguments: {:?}", cli);

    let result = cli
        .args
        .resolve()
        .map_err(anyhow::Error::from)
        .and_then(commands::handle_run);

    if let Err(e) = result {
        tracing::debug!("Run failed: {:?}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// --- Basic Integration Tests ---
#[cfg(test)]
mod tests {
    use assert_cmd::Command;
    use predicates::prelude::*;

    fn plugin_cmd() -> Command {
        let mut cmd =
            Command::cargo_bin("archive-plugin").expect("Failed to find archive-plugin binary");
        cmd.env_clear();
        cmd
    }

    #[test]
    fn test_main_help_flag() {
        plugin_cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("PLUGIN_SOURCE"));
    }

    #[test]
    fn test_main_version_flag() {
        plugin_cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    }
}
