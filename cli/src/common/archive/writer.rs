//! # Source Tree Walker (`common::archive::writer`)
//!
//! File: cli/src/common/archive/writer.rs
//!
//! ## Overview
//!
//! The control flow every archive format shares: validate the source, create
//! the target, walk the source tree in a stable order, filter each path through
//! the `PatternSet`, and hand surviving entries to a format-specific
//! `ContainerWriter`.
//!
//! ## Naming
//!
//! - A directory source `path/to/site` produces `site/`, `site/index.html`,
//!   `site/css/`, ... so extraction recreates the top-level folder.
//! - A single-file source produces one entry named after the file.
//!
//! Patterns are matched against the path *relative to the source* (`css/main.css`),
//! so `*.txt` selects top-level text files regardless of where the source lives.
//! Filtering is per entry: a skipped directory is not written, but its children
//! are still visited and judged on their own.
//!
//! ## Resources
//!
//! File contents are streamed with `io::copy` straight into the container. The
//! target is created only after the source has been stat'ed, so a missing source
//! leaves no empty archive behind. A failure mid-walk leaves a partial target.
//!
use crate::common::archive::entry::{Entry, Summary};
#[cfg(not(unix))]
use crate::common::archive::entry::{DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::common::archive::pattern::PatternSet;
use crate::common::fs::io as fsio;
use crate::core::error::{ArchiveError, ArchiveResult};
use std::fs::{self, File, Metadata};
use std::io::{self, BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// A container format that entries can be appended to.
pub trait ContainerWriter: Sized {
    /// Appends a directory entry (no body).
    fn append_dir(&mut self, entry: &Entry, metadata: &Metadata) -> ArchiveResult<()>;

    /// Appends a regular file entry, streaming its body from `content`.
    fn append_file(
        &mut self,
        entry: &Entry,
        metadata: &Metadata,
        content: &mut dyn Read,
    ) -> ArchiveResult<()>;

    /// Writes trailing container structures and flushes every layer down to the file.
    fn finish(self) -> ArchiveResult<()>;
}

/// Archives `source` into a new file at `target` using the container built by `open`.
pub fn archive_path<C, F>(
    source: &Path,
    target: &Path,
    patterns: &PatternSet,
    open: F,
) -> ArchiveResult<Summary>
where
    C: ContainerWriter,
    F: FnOnce(BufWriter<File>) -> C,
{
    let source_meta = fs::metadata(source).map_err(|e| ArchiveError::io(source, e))?;

    let output = fsio::create_output_file(target)?;
    let target_canonical = fs::canonicalize(target).map_err(|e| ArchiveError::io(target, e))?;
    let mut container = open(BufWriter::new(output));

    let summary = if source_meta.is_dir() {
        write_tree(source, &target_canonical, patterns, &mut container)?
    } else {
        write_single_file(source, &source_meta, patterns, &mut container)?
    };

    container.finish()?;
    info!("Archived {:?} into {:?} ({})", source, target, summary);
    Ok(summary)
}

fn write_single_file<C: ContainerWriter>(
    source: &Path,
    metadata: &Metadata,
    patterns: &PatternSet,
    container: &mut C,
) -> ArchiveResult<Summary> {
    let mut summary = Summary::default();
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ArchiveError::Config(format!("source '{}' has no file name", source.display()))
        })?;

    if !patterns.selects(&name) {
        debug!("Skipping {} (filtered)", name);
        summary.skipped += 1;
        return Ok(summary);
    }

    let entry = Entry::file(&name, permission_bits(metadata, false));
    append_file_from_disk(container, &entry, source, metadata)?;
    summary.processed += 1;
    Ok(summary)
}

fn write_tree<C: ContainerWriter>(
    source: &Path,
    target_canonical: &Path,
    patterns: &PatternSet,
    container: &mut C,
) -> ArchiveResult<Summary> {
    let mut summary = Summary::default();
    let base_name = base_name(source)?;
    let target_name = target_canonical.file_name();

    for item in WalkDir::new(source).follow_links(false).sort_by_file_name() {
        let item = item.map_err(walk_error)?;
        let path = item.path();
        let relative = relative_name(source, path);

        // `follow_links(false)` means this is the type of the link itself, not its target.
        let file_type = item.file_type();
        // The target may live inside the source; never archive it into itself.
        if file_type.is_file()
            && path.file_name() == target_name
            && fs::canonicalize(path).ok().as_deref() == Some(target_canonical)
        {
            debug!("Skipping {:?}: it is the archive being written", path);
            continue;
        }

        // Per-entry filtering: a skipped directory's children are still judged on their own.
        if !patterns.selects(&relative) {
            debug!("Skipping {:?} (filtered)", relative);
            summary.skipped += 1;
            continue;
        }

        let stored = join_name(base_name.as_deref(), &relative);
        let metadata = item.metadata().map_err(walk_error)?;

        if file_type.is_dir() {
            if stored.is_empty() {
                // Root of a nameless source such as `/`: nothing to record.
                continue;
            }
            let entry = Entry::directory(&stored, permission_bits(&metadata, true));
            debug!("Adding directory {}", entry.name);
            container.append_dir(&entry, &metadata)?;
        } else if file_type.is_file() {
            let entry = Entry::file(&stored, permission_bits(&metadata, false));
            append_file_from_disk(container, &entry, path, &metadata)?;
        } else {
            // Extraction refuses links and devices, so they are never written either.
            warn!("Skipping {:?}: symlinks and special files are not archived", path);
            summary.skipped += 1;
            continue;
        }
        summary.processed += 1;
    }
    Ok(summary)
}

fn append_file_from_disk<C: ContainerWriter>(
    container: &mut C,
    entry: &Entry,
    path: &Path,
    metadata: &Metadata,
) -> ArchiveResult<()> {
    debug!("Adding file {} ({} bytes)", entry.name, metadata.len());
    let file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut content = BufReader::new(file);
    container.append_file(entry, metadata, &mut content)
}

/// The directory name every stored entry is nested under, if the source has one.
fn base_name(source: &Path) -> ArchiveResult<Option<String>> {
    let named = match source.file_name() {
        Some(name) => Some(PathBuf::from(name)),
        // `.`, `..` and similar: use the name of the directory they point at.
        None => fs::canonicalize(source)
            .map_err(|e| ArchiveError::io(source, e))?
            .file_name()
            .map(PathBuf::from),
    };
    Ok(named.map(|n| n.to_string_lossy().into_owned()))
}

/// `path` relative to `root`, `/`-separated; empty for the root itself.
fn relative_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn join_name(base: Option<&str>, relative: &str) -> String {
    match (base, relative.is_empty()) {
        (Some(base), true) => base.to_string(),
        (Some(base), false) => format!("{}/{}", base, relative),
        (None, _) => relative.to_string(),
    }
}

fn walk_error(err: walkdir::Error) -> ArchiveError {
    let path = err.path().map(Path::to_path_buf).unwrap_or_default();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    ArchiveError::io(path, source)
}

#[cfg(unix)]
fn permission_bits(metadata: &Metadata, _is_dir: bool) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &Metadata, is_dir: bool) -> u32 {
    match (is_dir, metadata.permissions().readonly()) {
        (true, _) => DEFAULT_DIR_MODE,
        (false, true) => 0o444,
        (false, false) => DEFAULT_FILE_MODE,
    }
}
