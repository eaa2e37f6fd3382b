//! # TAR Archive Operations (`common::archive::tar`)
//!
//! File: cli/src/common/archive/tar.rs
//!
//! ## Overview
//!
//! Creates and extracts tar archives, optionally gzip-compressed (`.tar.gz`).
//!
//! ## Architecture
//!
//! The module leverages the `tar` crate for the archive structure and the
//! `compression` module (backed by `flate2`) for the optional gzip layer:
//!
//! ```text
//! tar::Builder -> CompressionWriter (plain | gzip) -> BufWriter<File>
//! ```
//!
//! Each layer is finished innermost-first: the tar trailer, then the gzip footer,
//! then the buffered bytes are flushed to disk.
//!
//! On extraction, a source is treated as gzip-compressed when its name ends in
//! `.gz` / `.tgz` or when it starts with the gzip magic bytes. Directory and
//! regular file entries are materialized; links and device entries fail the
//! extraction with `UnsupportedEntryType`. PAX global headers carry no content
//! and are skipped.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{pattern::PatternSet, tar};
//!
//! tar::archive(Path::new("logs"), Path::new("logs.tar.gz"), &PatternSet::default(), true)?;
//! tar::extract(Path::new("logs.tar.gz"), Path::new("restored"), &PatternSet::default())?;
//! ```
//!
use crate::common::archive::compression::{self, CompressionWriter};
use crate::common::archive::entry::{Entry, Summary, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::common::archive::pattern::PatternSet;
use crate::common::archive::unpack::{self, ExtractRoot};
use crate::common::archive::writer::{self, ContainerWriter};
use crate::core::error::{ArchiveError, ArchiveResult};
use std::fs::{File, Metadata};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tar::{Archive, Builder, EntryType, Header, HeaderMode};
use tracing::debug;

/// Writes entries into a (possibly gzipped) tar stream.
pub struct TarContainer<W: Write> {
    builder: Builder<CompressionWriter<W>>,
    path: PathBuf,
}

impl<W: Write> TarContainer<W> {
    pub fn new(inner: W, path: &Path, compress: bool) -> Self {
        Self {
            builder: Builder::new(compression::wrap_writer(inner, compress)),
            path: path.to_path_buf(),
        }
    }

    /// Writes the tar trailer and gzip footer, returning the underlying writer.
    pub fn into_inner(self) -> ArchiveResult<W> {
        let path = self.path;
        self.builder
            .into_inner()
            .and_then(CompressionWriter::finish)
            .map_err(|e| ArchiveError::io(&path, e))
    }

    fn header_for(entry: &Entry, metadata: &Metadata) -> Header {
        // GNU headers so long names and large uid/gid values round-trip.
        let mut header = Header::new_gnu();
        header.set_metadata_in_mode(metadata, HeaderMode::Complete);
        if entry.is_dir() {
            header.set_entry_type(EntryType::Directory);
            header.set_size(0);
        } else {
            header.set_entry_type(EntryType::Regular);
            header.set_size(metadata.len());
        }
        // The entry mode is already stripped of file-type bits.
        header.set_mode(entry.mode);
        header
    }
}

impl<W: Write> ContainerWriter for TarContainer<W> {
    fn append_dir(&mut self, entry: &Entry, metadata: &Metadata) -> ArchiveResult<()> {
        let mut header = Self::header_for(entry, metadata);
        self.builder
            .append_data(&mut header, entry.name.as_str(), std::io::empty())
            .map_err(|e| ArchiveError::io(&self.path, e))
    }

    fn append_file(
        &mut self,
        entry: &Entry,
        metadata: &Metadata,
        content: &mut dyn Read,
    ) -> ArchiveResult<()> {
        let mut header = Self::header_for(entry, metadata);
        self.builder
            .append_data(&mut header, entry.name.as_str(), content)
            .map_err(|e| ArchiveError::io(&self.path, e))
    }

    fn finish(self) -> ArchiveResult<()> {
        let path = self.path.clone();
        let mut buffered = self.into_inner()?;
        buffered.flush().map_err(|e| ArchiveError::io(&path, e))
    }
}

/// # Create TAR Archive (`archive`)
///
/// Archives `source` (a file or directory) into a new tar file at `target`,
/// gzip-compressing the stream when `compress` is true.
///
/// ## Errors
///
/// - `ArchiveError::Io` if the source is missing or any read/write fails.
pub fn archive(
    source: &Path,
    target: &Path,
    patterns: &PatternSet,
    compress: bool,
) -> ArchiveResult<Summary> {
    debug!("Creating tar archive (gzip: {})", compress);
    writer::archive_path(source, target, patterns, |out: BufWriter<File>| {
        TarContainer::new(out, target, compress)
    })
}

/// Whether `source` should be read through a gzip decoder.
pub fn is_compressed(source: &Path) -> ArchiveResult<bool> {
    let by_name = source
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz") || ext.eq_ignore_ascii_case("tgz"));
    if by_name {
        return Ok(true);
    }
    compression::has_gzip_magic(source)
}

/// # Extract TAR Archive (`extract`)
///
/// Extracts the selected entries of the tar file `source` under the directory
/// `target`, creating it if necessary. Gzip compression is detected from the
/// file name or its leading bytes.
///
/// ## Errors
///
/// - `ArchiveError::Io` if the source cannot be opened or a write fails.
/// - `ArchiveError::Format` if the tar or gzip stream is malformed.
/// - `ArchiveError::PathTraversal` if an entry escapes `target`.
/// - `ArchiveError::UnsupportedEntryType` for link, device and FIFO entries.
pub fn extract(source: &Path, target: &Path, patterns: &PatternSet) -> ArchiveResult<Summary> {
    let compressed = is_compressed(source)?;
    let file = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
    let reader = compression::wrap_reader(BufReader::new(file), compressed);
    let mut archive = Archive::new(reader);

    let mut root = ExtractRoot::prepare(target)?;
    debug!("Extracting {:?} (gzip: {}) into {:?}", source, compressed, root.path());

    let entries = archive
        .entries()
        .map_err(|e| ArchiveError::from_read(source, e))?;
    for item in entries {
        let mut item = item.map_err(|e| ArchiveError::from_read(source, e))?;
        let kind = item.header().entry_type();
        // Global PAX records only set defaults for later headers; there is nothing to write.
        if kind.is_pax_global_extensions() {
            debug!("Skipping PAX global header");
            continue;
        }

        // `path_bytes` already folds in GNU long names and PAX `path` records.
        let name = String::from_utf8_lossy(&item.path_bytes()).into_owned();
        if !patterns.selects(name.trim_end_matches('/')) {
            root.skip(&name);
            continue;
        }

        // An unreadable mode field falls back to the defaults instead of failing the run.
        let mode = item.header().mode().ok();
        if kind.is_dir() {
            root.create_dir(&name, mode.unwrap_or(DEFAULT_DIR_MODE) & 0o7777)?;
        } else if kind.is_file() || kind == EntryType::Continuous {
            // Contiguous files are regular files on every system we extract on.
            let mode = mode.unwrap_or(DEFAULT_FILE_MODE) & 0o7777;
            root.write_file(&name, mode, &mut item)
                .map_err(|e| unpack::blame_archive(source, e))?;
        } else {
            // Links and devices fail closed; see `entry_kind_name` for the reported kinds.
            return Err(ArchiveError::UnsupportedEntryType {
                entry: name,
                kind: entry_kind_name(kind),
            });
        }
    }
    root.finish()
}

fn entry_kind_name(kind: EntryType) -> String {
    match kind {
        EntryType::Symlink => "symlink".into(),
        EntryType::Link => "hard link".into(),
        EntryType::Char => "character device".into(),
        EntryType::Block => "block device".into(),
        EntryType::Fifo => "fifo".into(),
        other => format!("{:?}", other).to_lowercase(),
    }
}
