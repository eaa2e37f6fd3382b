//! # Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//!
//! ## Overview
//!
//! Everything needed to create and extract zip, tar (optionally gzipped) and
//! standalone gzip files.
//!
//! ## Architecture
//!
//! - **`pattern`**: include/exclude glob filtering of entry paths.
//! - **`entry`**: the entry model and operation summary shared by all formats.
//! - **`writer`**: the source tree walk and the `ContainerWriter` trait each
//!   archive format implements.
//! - **`unpack`**: `ExtractRoot`, the single place entries are written to disk,
//!   with path traversal protection.
//! - **`compression`**: the gzip layer, standalone or under tar.
//! - **`zip`** / **`tar`**: the format-specific writers and readers.
//!
//! ## Usage
//!
//! ```rust
//! use crate::common::archive::{pattern::PatternSet, tar, zip};
//!
//! let patterns = PatternSet::new(Some("*.txt"), None);
//! zip::archive(Path::new("docs"), Path::new("docs.zip"), &patterns)?;
//! tar::extract(Path::new("backup.tar.gz"), Path::new("restore"), &PatternSet::default())?;
//! ```
//!
pub mod compression;
pub mod entry;
pub mod pattern;
pub mod tar;
pub mod unpack;
pub mod writer;
pub mod zip;
