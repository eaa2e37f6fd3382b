//! # Entry Path Sanitization
//!
//! File: cli/src/common/fs/sanitize.rs
//!
//! ## Overview
//!
//! Archive entry names are untrusted input. Before anything is written during
//! extraction, the entry name is resolved against the (canonical) extraction
//! root and must land strictly inside it; otherwise the whole extraction fails
//! with `ArchiveError::PathTraversal`.
//!
//! Resolution is purely lexical: `.` components are dropped, `..` pops one
//! previously pushed component, and any absolute or drive-prefixed component is
//! rejected outright. Backslashes are treated as separators so names written by
//! Windows tools cannot smuggle `..\..\` past the check.
//!
//! ## Usage
//!
//! ```rust
//! let dest = sanitize::resolve_entry_path(&root, "dir/file.txt")?; // root/dir/file.txt
//! sanitize::resolve_entry_path(&root, "../../etc/passwd");         // Err(PathTraversal)
//! ```
//!
use crate::core::error::{ArchiveError, ArchiveResult};
use std::path::{Component, Path, PathBuf};

/// Resolves `name` under `root`, failing unless the result lies strictly inside it.
pub fn resolve_entry_path(root: &Path, name: &str) -> ArchiveResult<PathBuf> {
    let reject = || ArchiveError::PathTraversal {
        entry: name.to_string(),
        target: root.to_path_buf(),
    };

    let normalized = name.replace('\\', "/");
    let mut resolved = root.to_path_buf();
    let mut depth = 0usize;

    for component in Path::new(&normalized).components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return Err(reject());
                }
                resolved.pop();
                depth -= 1;
            }
            Component::RootDir | Component::Prefix(_) => return Err(reject()),
        }
    }

    // Must be `root` + separator + something, never `root` itself.
    if depth == 0 || !resolved.starts_with(root) || resolved == root {
        return Err(reject());
    }
    Ok(resolved)
}

/// Returns true for names such as `.` or `./` that denote the archive root itself.
pub fn is_root_marker(name: &str) -> bool {
    let normalized = name.replace('\\', "/");
    Path::new(&normalized)
        .components()
        .all(|c| matches!(c, Component::CurDir))
}
