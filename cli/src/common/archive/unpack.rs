//! # Extraction Destination (`common::archive::unpack`)
//!
//! File: cli/src/common/archive/unpack.rs
//!
//! ## Overview
//!
//! `ExtractRoot` is the only way the zip and tar readers touch the filesystem.
//! It owns the canonicalized target directory and materializes one entry at a
//! time, after the entry name has passed `sanitize::resolve_entry_path`.
//!
//! ## Guarantees
//!
//! - Nothing is written unless the destination lies strictly inside the root.
//! - Parent directories that already exist are canonicalized and re-checked, so
//!   a symlink planted inside the target cannot redirect a write elsewhere.
//! - An existing symlink at a file's destination is replaced, never followed.
//! - Directory modes are applied in `finish`, deepest first, so a read-only
//!   directory entry does not block the files that follow it.
//!
use crate::common::archive::entry::Summary;
use crate::common::fs::{io as fsio, sanitize};
use crate::core::error::{ArchiveError, ArchiveResult};
use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ExtractRoot {
    root: PathBuf,
    pending_dir_modes: Vec<(PathBuf, u32)>,
    summary: Summary,
}

impl ExtractRoot {
    /// Creates `target` if needed and pins its canonical path.
    pub fn prepare(target: &Path) -> ArchiveResult<Self> {
        fsio::ensure_dir_exists(target)?;
        let root = fs::canonicalize(target).map_err(|e| ArchiveError::io(target, e))?;
        Ok(Self {
            root,
            pending_dir_modes: Vec::new(),
            summary: Summary::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Records an entry left out by the pattern filter.
    pub fn skip(&mut self, name: &str) {
        debug!("Skipping {} (filtered)", name);
        self.summary.skipped += 1;
    }

    pub fn create_dir(&mut self, name: &str, mode: u32) -> ArchiveResult<()> {
        if sanitize::is_root_marker(name) {
            debug!("Ignoring root directory entry '{}'", name);
            return Ok(());
        }
        let dest = sanitize::resolve_entry_path(&self.root, name)?;
        // Walks every component, so `dest` itself is checked to be a directory too.
        self.create_dirs_within(name, &dest)?;

        debug!("Created directory {:?}", dest);
        // Modes wait for `finish`; a read-only mode now would block the children.
        self.pending_dir_modes.push((dest, mode));
        self.summary.processed += 1;
        Ok(())
    }

    pub fn write_file(&mut self, name: &str, mode: u32, content: &mut dyn Read) -> ArchiveResult<()> {
        let dest = sanitize::resolve_entry_path(&self.root, name)?;
        if let Some(parent) = dest.parent() {
            self.create_dirs_within(name, parent)?;
        }

        // Never write through a symlink left at the destination: drop the link itself.
        if fs::symlink_metadata(&dest).is_ok_and(|m| m.file_type().is_symlink()) {
            fs::remove_file(&dest).map_err(|e| ArchiveError::io(&dest, e))?;
        }

        let file = open_for_write(&dest, mode).map_err(|e| ArchiveError::io(&dest, e))?;
        let mut out = BufWriter::new(file);
        let bytes = io::copy(content, &mut out).map_err(|e| ArchiveError::io(&dest, e))?;
        out.flush().map_err(|e| ArchiveError::io(&dest, e))?;
        drop(out);
        apply_mode(&dest, mode)?;

        debug!("Extracted {:?} ({} bytes)", dest, bytes);
        self.summary.processed += 1;
        Ok(())
    }

    /// Applies deferred directory modes and returns the entry counts.
    pub fn finish(mut self) -> ArchiveResult<Summary> {
        self.pending_dir_modes
            .sort_by(|a, b| b.0.components().count().cmp(&a.0.components().count()));
        for (dir, mode) in &self.pending_dir_modes {
            apply_mode(dir, *mode)?;
        }
        info!("Extracted into {:?} ({})", self.root, self.summary);
        Ok(self.summary)
    }

    /// `mkdir -p` below the root, one level at a time. Existing symlinks on the
    /// way must resolve inside the root, and every existing component must be a
    /// directory.
    fn create_dirs_within(&self, name: &str, dir: &Path) -> ArchiveResult<()> {
        let relative = dir.strip_prefix(&self.root).unwrap_or(Path::new(""));
        let mut current = self.root.clone();
        for component in relative.components() {
            current.push(component);
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    self.ensure_contained(name, &current)?;
                    // Contained, but it may still point at a file.
                    let target_meta =
                        fs::metadata(&current).map_err(|e| ArchiveError::io(&current, e))?;
                    if !target_meta.is_dir() {
                        return Err(not_a_directory(&current));
                    }
                }
                Ok(meta) if meta.is_dir() => {}
                // An earlier entry wrote a file where this entry needs a directory.
                Ok(_) => return Err(not_a_directory(&current)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => match fs::create_dir(&current) {
                    Ok(()) => {}
                    // Lost a race with another writer; fine as long as it is a directory.
                    Err(e) if e.kind() == io::ErrorKind::AlreadyExists && current.is_dir() => {}
                    Err(e) => return Err(ArchiveError::io(&current, e)),
                },
                Err(e) => return Err(ArchiveError::io(&current, e)),
            }
        }
        Ok(())
    }

    fn ensure_contained(&self, name: &str, existing: &Path) -> ArchiveResult<()> {
        let real = fs::canonicalize(existing).map_err(|e| ArchiveError::io(existing, e))?;
        if real.starts_with(&self.root) {
            Ok(())
        } else {
            Err(ArchiveError::PathTraversal {
                entry: name.to_string(),
                target: self.root.clone(),
            })
        }
    }
}

#[cfg(unix)]
fn open_for_write(path: &Path, mode: u32) -> io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(path)
}

#[cfg(not(unix))]
fn open_for_write(path: &Path, _mode: u32) -> io::Result<fs::File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

fn not_a_directory(path: &Path) -> ArchiveError {
    ArchiveError::io(
        path,
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists but is not a directory",
        ),
    )
}

/// Blames the archive, not the destination file, for a body that failed to decode
/// while being copied out.
pub fn blame_archive(archive: &Path, err: ArchiveError) -> ArchiveError {
    match err {
        ArchiveError::Io { source, .. }
            if matches!(
                source.kind(),
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof
            ) =>
        {
            ArchiveError::format(archive, source)
        }
        other => other,
    }
}

/// Sets permission bits, dropping setuid/setgid/sticky.
#[cfg(unix)]
fn apply_mode(path: &Path, mode: u32) -> ArchiveResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o777))
        .map_err(|e| ArchiveError::io(path, e))
}

#[cfg(not(unix))]
fn apply_mode(path: &Path, mode: u32) -> ArchiveResult<()> {
    let mut permissions = fs::metadata(path)
        .map_err(|e| ArchiveError::io(path, e))?
        .permissions();
    permissions.set_readonly(mode & 0o222 == 0);
    fs::set_permissions(path, permissions).map_err(|e| ArchiveError::io(path, e))
}
