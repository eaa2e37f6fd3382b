//! # Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//!
//! ## Overview
//!
//! This module centralizes the small filesystem operations the archive engine
//! and the dispatcher share: making sure directories exist, preparing a fresh
//! output file, and removing a pre-existing target. Every failure is reported
//! as `ArchiveError::Io` carrying the offending path.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: `mkdir -p`, rejecting paths that exist as non-directories.
//! - **`ensure_parent_dir`**: `ensure_dir_exists` on the parent of a file path.
//! - **`create_output_file`**: creates/truncates a file after creating its parent.
//! - **`remove_existing`**: removes a file, symlink, or whole directory tree.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::fs::io;
//!
//! let out = io::create_output_file(Path::new("build/out.zip"))?;
//! io::remove_existing(Path::new("build/old"))?;
//! ```
//!
use crate::core::error::{ArchiveError, ArchiveResult};
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Ensures that a directory exists at the specified path.
///
/// Creates the directory and any missing parents if needed. If the path already
/// exists but is not a directory, an `AlreadyExists` I/O error is returned.
pub fn ensure_dir_exists(path: &Path) -> ArchiveResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| ArchiveError::io(path, e))?;
        debug!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        return Err(ArchiveError::io(
            path,
            io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists but is not a directory",
            ),
        ));
    }
    Ok(())
}

/// Ensures the parent directory of `path` exists. Paths without a parent
/// component (e.g. `out.zip`) need nothing.
pub fn ensure_parent_dir(path: &Path) -> ArchiveResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => ensure_dir_exists(parent),
        _ => Ok(()),
    }
}

/// Creates (or truncates) `path` for writing, creating its parent directory first.
pub fn create_output_file(path: &Path) -> ArchiveResult<File> {
    ensure_parent_dir(path)?;
    File::create(path).map_err(|e| ArchiveError::io(path, e))
}

/// Returns whether anything (including a dangling symlink) exists at `path`.
pub fn path_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Removes whatever exists at `path`. Directories are removed recursively;
/// symlinks are removed without touching what they point to.
pub fn remove_existing(path: &Path) -> ArchiveResult<()> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(ArchiveError::io(path, e)),
    };

    if metadata.is_dir() {
        fs::remove_dir_all(path).map_err(|e| ArchiveError::io(path, e))?;
    } else {
        fs::remove_file(path).map_err(|e| ArchiveError::io(path, e))?;
    }
    info!("Removed existing target {:?}", path);
    Ok(())
}
