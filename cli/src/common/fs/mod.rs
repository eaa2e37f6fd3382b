//! # Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//!
//! ## Overview
//!
//! Filesystem helpers shared by the archive engine and the dispatcher.
//!
//! - **`io`**: Directory creation, output file creation, and target removal.
//! - **`sanitize`**: Resolution of untrusted archive entry names under an extraction root.
//!
//! ```rust
//! use crate::common::fs::{io, sanitize};
//!
//! io::ensure_dir_exists(target)?;
//! let dest = sanitize::resolve_entry_path(&root, entry_name)?;
//! ```
//!

/// Directory creation, output files, and removal of existing targets.
pub mod io;
/// Path-traversal guard for archive entry names.
pub mod sanitize;
