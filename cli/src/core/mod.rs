//! # Archive Plugin Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! This module aggregates the infrastructure every other part of the plugin
//! relies on: turning `PLUGIN_*` settings into an `Operation`, and the error
//! taxonomy used to report failures.
//!
//! ## Architecture
//!
//! - `config`: Raw plugin arguments, their validation, and the resolved `Operation`
//! - `error`: `ArchiveError` and the `Result` aliases
//!
//! ## Usage
//!
//! ```rust
//! use crate::core::config::{Operation, PluginArgs, RunMode};
//! use crate::core::error::{ArchiveError, ArchiveResult, Result};
//! ```
//!
pub mod config;
pub mod error;
