//! # Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared building blocks used by the command layer:
//!
//! - **`archive`**: the archive engine (patterns, zip, tar, gzip, safe extraction).
//! - **`fs`**: foundational filesystem helpers and entry name sanitization.
//!
pub mod archive;
pub mod fs;
