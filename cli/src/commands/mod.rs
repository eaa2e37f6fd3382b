//! # Command Handling (`commands`)
//!
//! File: cli/src/commands/mod.rs
//!
//! ## Overview
//!
//! Turns a resolved `RunMode` into work. An explicit operation goes through the
//! `Dispatcher` (preflight, then one of six archive routes); a run with neither
//! format nor action configured falls back to zip auto-detection.
//!
/// Legacy zip auto-detection when no format or action is configured.
pub mod detect;
/// Preflight checks and format/action routing for explicit operations.
pub mod dispatch;

use crate::core::config::RunMode;
use crate::core::error::Result;

pub fn handle_run(mode: RunMode) -> Result<()> {
    match mode {
        RunMode::Explicit(operation) => dispatch::Dispatcher::new(operation).run(),
        RunMode::AutoDetect { source, target } => detect::run(&source, &target),
    }
}
