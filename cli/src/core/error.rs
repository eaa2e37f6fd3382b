//! # Archive Plugin Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy shared by the archive engine and the
//! dispatcher. Engine functions return the typed `ArchiveResult<T>` so callers
//! (and tests) can tell a security rejection from a plain I/O failure; the
//! dispatcher and `main` work with `Result<T>` (an `anyhow` alias) and attach
//! context as errors travel upward.
//!
//! ## Architecture
//!
//! - `ArchiveError`: a `thiserror` enum with one variant per failure class:
//!   configuration, pre-existing target, I/O, corrupt container, path traversal,
//!   and unsupported entry types.
//! - `ArchiveResult<T>`: `std::result::Result<T, ArchiveError>` for engine code.
//! - `Result<T>`: `anyhow::Result<T>` for application-level code.
//!
//! Malformed glob patterns are deliberately absent from the taxonomy. They are
//! recovered inside `common::archive::pattern` and only ever logged.
//!
//! ## Examples
//!
//! ```rust
//! // Wrap an I/O failure with the path that caused it
//! let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
//!
//! // Inspect a failure surfaced through anyhow
//! match dispatcher.run() {
//!     Err(e) if matches!(e.downcast_ref::<ArchiveError>(), Some(ArchiveError::PathTraversal { .. })) => {
//!         eprintln!("archive tried to escape the target directory");
//!     }
//!     other => other?,
//! }
//! ```
//!
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Every failure the archive engine can surface to its caller.
#[derive(Error, Debug)]
pub enum ArchiveError {
    /// Missing or contradictory settings (format, action, source, target).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The target already exists and overwriting was not requested.
    #[error("Target '{}' already exists; set PLUGIN_OVERWRITE=true to replace it", path.display())]
    TargetExists { path: PathBuf },

    /// Opening, creating, reading or writing a path failed.
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The container could not be decoded (corrupt or not the claimed format).
    #[error("Invalid archive '{}': {message}", path.display())]
    Format { path: PathBuf, message: String },

    /// An entry name resolves outside the extraction directory.
    #[error("Entry '{entry}' resolves outside of target directory '{}'", target.display())]
    PathTraversal { entry: String, target: PathBuf },

    /// The container holds an entry kind the extractor refuses to materialize.
    #[error("Unsupported entry type '{kind}' for entry '{entry}'")]
    UnsupportedEntryType { entry: String, kind: String },
}

impl ArchiveError {
    /// Shorthand for building an `Io` variant from a path and the error it produced.
    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Shorthand for building a `Format` variant from a container path and a decoder error.
    pub fn format(path: impl AsRef<Path>, message: impl ToString) -> Self {
        Self::Format {
            path: path.as_ref().to_path_buf(),
            message: message.to_string(),
        }
    }

    /// Classifies an error raised while decoding `path`: malformed data becomes
    /// `Format`, anything else stays `Io`.
    pub fn from_read(path: impl AsRef<Path>, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::InvalidData
            | io::ErrorKind::InvalidInput
            | io::ErrorKind::UnexpectedEof => Self::format(path, source),
            _ => Self::io(path, source),
        }
    }
}

/// Result type returned by the archive engine.
pub type ArchiveResult<T> = std::result::Result<T, ArchiveError>;

/// Type alias for Result using anyhow::Error for application-level code.
pub type Result<T> = anyhow::Result<T>;
