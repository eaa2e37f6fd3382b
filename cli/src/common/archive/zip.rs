//! # Zip Archive Operations (`common::archive::zip`)
//!
//! File: cli/src/common/archive/zip.rs
//!
//! ## Overview
//!
//! Creates and extracts zip archives with the `zip` crate.
//!
//! - **`archive`**: walks the source (see `writer`), storing directories as
//!   `name/` entries and files DEFLATE-compressed, with Unix permission bits in
//!   the external attributes.
//! - **`extract`**: iterates the central directory in order, filters entry names,
//!   and materializes each entry through `ExtractRoot`. Symlinks and other
//!   special entries abort the extraction with `UnsupportedEntryType`.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{pattern::PatternSet, zip};
//!
//! let patterns = PatternSet::new(Some("**/*.html"), None);
//! zip::archive(Path::new("site"), Path::new("site.zip"), &patterns)?;
//! zip::extract(Path::new("site.zip"), Path::new("restored"), &PatternSet::default())?;
//! ```
//!
use crate::common::archive::entry::{Entry, Summary, DEFAULT_DIR_MODE, DEFAULT_FILE_MODE};
use crate::common::archive::pattern::PatternSet;
use crate::common::archive::unpack::{self, ExtractRoot};
use crate::common::archive::writer::{self, ContainerWriter};
use crate::core::error::{ArchiveError, ArchiveResult};
use std::fs::{File, Metadata};
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const S_IFMT: u32 = 0o170000;
const S_IFREG: u32 = 0o100000;
const S_IFDIR: u32 = 0o040000;
const S_IFLNK: u32 = 0o120000;

/// Writes entries into a zip container.
pub struct ZipContainer<W: Write + Seek> {
    writer: ZipWriter<W>,
    path: PathBuf,
}

impl<W: Write + Seek> ZipContainer<W> {
    pub fn new(inner: W, path: &Path) -> Self {
        Self {
            writer: ZipWriter::new(inner),
            path: path.to_path_buf(),
        }
    }

    /// Finishes the central directory and hands back the underlying writer.
    pub fn into_inner(self) -> ArchiveResult<W> {
        let path = self.path;
        self.writer.finish().map_err(|e| zip_error(&path, e))
    }
}

impl<W: Write + Seek> ContainerWriter for ZipContainer<W> {
    fn append_dir(&mut self, entry: &Entry, _metadata: &Metadata) -> ArchiveResult<()> {
        let options = SimpleFileOptions::default().unix_permissions(entry.mode);
        self.writer
            .add_directory(entry.name.as_str(), options)
            .map_err(|e| zip_error(&self.path, e))
    }

    fn append_file(
        &mut self,
        entry: &Entry,
        metadata: &Metadata,
        content: &mut dyn Read,
    ) -> ArchiveResult<()> {
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .unix_permissions(entry.mode)
            .large_file(metadata.len() >= u64::from(u32::MAX));
        self.writer
            .start_file(entry.name.as_str(), options)
            .map_err(|e| zip_error(&self.path, e))?;
        io::copy(content, &mut self.writer).map_err(|e| ArchiveError::io(&self.path, e))?;
        Ok(())
    }

    fn finish(self) -> ArchiveResult<()> {
        let path = self.path.clone();
        let buffered = self.into_inner()?;
        flush_into_file(buffered, &path)
    }
}

fn flush_into_file<W: Write>(mut writer: W, path: &Path) -> ArchiveResult<()> {
    writer.flush().map_err(|e| ArchiveError::io(path, e))
}

/// # Create Zip Archive (`archive`)
///
/// Archives `source` (a file or directory) into a new zip file at `target`.
///
/// ## Errors
///
/// - `ArchiveError::Io` if the source is missing or any read/write fails.
/// - `ArchiveError::Format` if the zip writer rejects an entry.
pub fn archive(source: &Path, target: &Path, patterns: &PatternSet) -> ArchiveResult<Summary> {
    writer::archive_path(source, target, patterns, |out: BufWriter<File>| {
        ZipContainer::new(out, target)
    })
}

/// # Extract Zip Archive (`extract`)
///
/// Extracts the selected entries of the zip file `source` under the directory
/// `target`, creating it if necessary. Entries are processed in central
/// directory order; the first failure aborts the extraction, leaving whatever
/// was already written in place.
pub fn extract(source: &Path, target: &Path, patterns: &PatternSet) -> ArchiveResult<Summary> {
    let file = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
    let mut archive =
        ZipArchive::new(BufReader::new(file)).map_err(|e| zip_error(source, e))?;
    let mut root = ExtractRoot::prepare(target)?;
    debug!("Extracting {} zip entries into {:?}", archive.len(), root.path());

    for index in 0..archive.len() {
        let mut item = archive.by_index(index).map_err(|e| zip_error(source, e))?;
        let name = item.name().to_string();

        // Directory names carry a trailing `/`; patterns are written without it.
        if !patterns.selects(name.trim_end_matches('/')) {
            root.skip(&name);
            continue;
        }

        // Only archives written on Unix carry a file type in the external
        // attributes. No type bits at all means a plain file or directory.
        let raw_mode = item.unix_mode();
        match raw_mode.map(|m| m & S_IFMT) {
            Some(S_IFLNK) => {
                return Err(ArchiveError::UnsupportedEntryType {
                    entry: name,
                    kind: "symlink".into(),
                })
            }
            None | Some(0) | Some(S_IFREG) | Some(S_IFDIR) => {}
            Some(other) => {
                return Err(ArchiveError::UnsupportedEntryType {
                    entry: name,
                    kind: format!("special file (mode {:o})", other),
                })
            }
        }

        if item.is_dir() {
            root.create_dir(&name, raw_mode.unwrap_or(DEFAULT_DIR_MODE) & 0o7777)?;
        } else {
            let mode = raw_mode.unwrap_or(DEFAULT_FILE_MODE) & 0o7777;
            root.write_file(&name, mode, &mut item)
                .map_err(|e| unpack::blame_archive(source, e))?;
        }
    }
    root.finish()
}

fn zip_error(path: &Path, err: ZipError) -> ArchiveError {
    match err {
        ZipError::Io(e) => ArchiveError::io(path, e),
        other => ArchiveError::format(path, other),
    }
}
