//! # Gzip Compression Layer (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//!
//! ## Overview
//!
//! This module provides the gzip layer used in two places:
//!
//! - **Standalone**: `gzip_file` / `gunzip_file` compress or decompress a single
//!   file with no container around it.
//! - **Layered**: `wrap_writer` / `wrap_reader` optionally put a gzip codec
//!   between the tar container and the archive file.
//!
//! ## Architecture
//!
//! `CompressionWriter` and `CompressionReader` are small enums over "plain" and
//! "gzip" so callers handle both cases through one type. A gzip stream is only
//! complete once its footer is written, so `CompressionWriter::finish` must be
//! called, and must return, before the underlying file is flushed and dropped.
//! Dropping a `GzEncoder` without `finish` swallows any error writing the footer.
//!
//! Decoding uses `MultiGzDecoder` so concatenated gzip members are read in full.
//!
//! ## Usage
//!
//! ```rust
//! let file = File::create("out.tar.gz")?;
//! let mut writer = compression::wrap_writer(BufWriter::new(file), true);
//! writer.write_all(tar_bytes)?;
//! let buffered = writer.finish()?; // gzip footer written here
//! buffered.into_inner()?;          // then the file itself is flushed
//! ```
//!
use crate::common::fs::io as fsio;
use crate::core::error::{ArchiveError, ArchiveResult};
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use tracing::info;

/// The two bytes every gzip member starts with.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// A writer that optionally gzips everything passing through it.
pub enum CompressionWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
}

impl<W: Write> CompressionWriter<W> {
    /// Writes any pending compressed data and the gzip footer, returning the inner writer.
    pub fn finish(self) -> io::Result<W> {
        match self {
            Self::Plain(inner) => Ok(inner),
            Self::Gzip(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for CompressionWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.write(buf),
            Self::Gzip(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(inner) => inner.flush(),
            Self::Gzip(encoder) => encoder.flush(),
        }
    }
}

/// A reader that optionally gunzips everything read through it.
pub enum CompressionReader<R: Read> {
    Plain(R),
    Gzip(MultiGzDecoder<R>),
}

impl<R: Read> Read for CompressionReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(inner) => inner.read(buf),
            Self::Gzip(decoder) => decoder.read(buf),
        }
    }
}

/// Wraps `inner` with a gzip encoder when `compress` is true.
pub fn wrap_writer<W: Write>(inner: W, compress: bool) -> CompressionWriter<W> {
    if compress {
        CompressionWriter::Gzip(GzEncoder::new(inner, Compression::default()))
    } else {
        CompressionWriter::Plain(inner)
    }
}

/// Wraps `inner` with a gzip decoder when `compressed` is true.
pub fn wrap_reader<R: Read>(inner: R, compressed: bool) -> CompressionReader<R> {
    if compressed {
        CompressionReader::Gzip(MultiGzDecoder::new(inner))
    } else {
        CompressionReader::Plain(inner)
    }
}

/// Whether the file at `path` starts with the gzip magic bytes.
pub fn has_gzip_magic(path: &Path) -> ArchiveResult<bool> {
    let mut file = File::open(path).map_err(|e| ArchiveError::io(path, e))?;
    let mut magic = [0u8; 2];
    let mut read = 0;
    while read < magic.len() {
        match file.read(&mut magic[read..]) {
            Ok(0) => return Ok(false),
            Ok(n) => read += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ArchiveError::io(path, e)),
        }
    }
    Ok(magic == GZIP_MAGIC)
}

/// # Gzip a Single File (`gzip_file`)
///
/// Compresses the regular file at `source` into a gzip stream at `target`,
/// creating the target's parent directory if needed.
///
/// ## Errors
///
/// - `ArchiveError::Io` if the source cannot be read (checked before the target is created)
///   or the target cannot be written.
/// - `ArchiveError::Config` if `source` is a directory.
pub fn gzip_file(source: &Path, target: &Path) -> ArchiveResult<()> {
    let metadata = std::fs::metadata(source).map_err(|e| ArchiveError::io(source, e))?;
    if metadata.is_dir() {
        return Err(ArchiveError::Config(format!(
            "gzip can only compress a single file, '{}' is a directory",
            source.display()
        )));
    }
    let input = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
    let mut input = BufReader::new(input);

    let output = fsio::create_output_file(target)?;
    let mut writer = wrap_writer(BufWriter::new(output), true);
    let bytes = io::copy(&mut input, &mut writer).map_err(|e| ArchiveError::io(target, e))?;
    writer
        .finish()
        .and_then(|buffered| buffered.into_inner().map_err(|e| e.into_error()))
        .map_err(|e| ArchiveError::io(target, e))?;

    info!("Compressed {:?} ({} bytes) into {:?}", source, bytes, target);
    Ok(())
}

/// # Gunzip a Single File (`gunzip_file`)
///
/// Decompresses the gzip stream at `source` into the file `target`, creating the
/// target's parent directory if needed. A source that is not valid gzip is
/// reported as `ArchiveError::Format`; the partially written target is left behind.
pub fn gunzip_file(source: &Path, target: &Path) -> ArchiveResult<()> {
    let input = File::open(source).map_err(|e| ArchiveError::io(source, e))?;
    let mut reader = wrap_reader(BufReader::new(input), true);

    let output = fsio::create_output_file(target)?;
    let mut output = BufWriter::new(output);
    let bytes =
        io::copy(&mut reader, &mut output).map_err(|e| ArchiveError::from_read(source, e))?;
    output
        .into_inner()
        .map_err(|e| ArchiveError::io(target, e.into_error()))?;

    info!("Decompressed {:?} into {:?} ({} bytes)", source, target, bytes);
    Ok(())
}
