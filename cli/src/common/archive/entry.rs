//! # Archive Entry Model (`common::archive::entry`)
//!
//! File: cli/src/common/archive/entry.rs
//!
//! ## Overview
//!
//! The container-neutral view of one archive record, shared by the zip and tar
//! writers and readers:
//!
//! - **`Entry`**: the stored `/`-separated name, whether it is a file or a
//!   directory, and its permission bits. Directory names always end in `/`.
//! - **`Summary`**: how many entries an operation wrote or extracted and how
//!   many the include/exclude patterns skipped.
//!
//! Containers that carry no mode fall back to `DEFAULT_DIR_MODE` and
//! `DEFAULT_FILE_MODE`.
//!
use std::fmt;

/// Permission bits used when the container carries no mode for a directory.
pub const DEFAULT_DIR_MODE: u32 = 0o755;
/// Permission bits used when the container carries no mode for a file.
pub const DEFAULT_FILE_MODE: u32 = 0o644;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    File,
}

/// One file or directory record of a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Stored name, `/`-separated. Directories carry a trailing `/`.
    pub name: String,
    pub kind: EntryKind,
    /// Permission bits only (no file-type bits).
    pub mode: u32,
}

impl Entry {
    pub fn directory(name: &str, mode: u32) -> Self {
        let mut name = name.trim_end_matches('/').to_string();
        name.push('/');
        Self {
            name,
            kind: EntryKind::Directory,
            mode: mode & 0o7777,
        }
    }

    pub fn file(name: &str, mode: u32) -> Self {
        Self {
            name: name.to_string(),
            kind: EntryKind::File,
            mode: mode & 0o7777,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Entry counts reported at the end of an operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub processed: usize,
    pub skipped: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} entries, {} skipped", self.processed, self.skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_names_get_single_trailing_slash() {
        assert_eq!(Entry::directory("data", 0o40755).name, "data/");
        assert_eq!(Entry::directory("data//", 0o755).name, "data/");
        assert_eq!(Entry::directory("data", 0o40755).mode, 0o755);
        assert!(!Entry::file("data/a.txt", 0o100644).is_dir());
        assert_eq!(Entry::file("data/a.txt", 0o100644).mode, 0o644);
    }
}
