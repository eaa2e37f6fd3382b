//! # Archive Plugin Configuration
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module turns the plugin's settings into an immutable `Operation`.
//! CI runners hand settings to plugins as `PLUGIN_*` environment variables, so
//! every argument of `PluginArgs` is bound to one with clap's `env` support; the
//! same settings can be passed as `--long-flags` when running locally.
//!
//! ## Architecture
//!
//! Configuration is resolved in two steps:
//! 1. `clap` parses flags and environment variables into the raw `PluginArgs`.
//! 2. `PluginArgs::resolve` validates them and produces a `RunMode`:
//!    - `RunMode::Explicit(Operation)` when both format and action are set,
//!    - `RunMode::AutoDetect` when neither is set (legacy zip-only behaviour),
//!    - a `ArchiveError::Config` for anything in between.
//!
//! Empty environment values are treated exactly like unset ones.
//!
//! ## Examples
//!
//! ```bash
//! PLUGIN_SOURCE=dist PLUGIN_TARGET=dist.tar.gz PLUGIN_FORMAT=tar \
//! PLUGIN_ACTION=archive PLUGIN_TAR_COMPRESS=true archive-plugin
//! ```
//!
//! ```rust
//! let args = PluginArgs::parse();
//! match args.resolve()? {
//!     RunMode::Explicit(op) => Dispatcher::new(op).run()?,
//!     RunMode::AutoDetect { source, target } => detect::run(&source, &target)?,
//! }
//! ```
//!
use crate::core::error::{ArchiveError, ArchiveResult};
use clap::builder::{BoolishValueParser, TypedValueParser};
use clap::{Args, Command};
use std::ffi::OsStr;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

/// # Plugin Arguments (`PluginArgs`)
///
/// Raw settings as provided by the CI runner. Nothing here is validated yet;
/// see [`PluginArgs::resolve`].
#[derive(Args, Debug, Clone, Default)]
pub struct PluginArgs {
    /// Input file or directory.
    #[arg(long, env = "PLUGIN_SOURCE")]
    pub source: Option<PathBuf>,

    /// Output archive file (archive) or directory/file (extract).
    #[arg(long, env = "PLUGIN_TARGET")]
    pub target: Option<PathBuf>,

    /// Container kind: zip, tar or gzip.
    #[arg(long, env = "PLUGIN_FORMAT")]
    pub format: Option<String>,

    /// Direction: archive or extract.
    #[arg(long, env = "PLUGIN_ACTION")]
    pub action: Option<String>,

    /// Remove a pre-existing target before writing.
    #[arg(
        long,
        env = "PLUGIN_OVERWRITE",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = parse_flag
    )]
    pub overwrite: bool,

    /// Gzip the tar stream (tar only).
    #[arg(
        long,
        env = "PLUGIN_TAR_COMPRESS",
        default_value_t = false,
        action = clap::ArgAction::Set,
        value_parser = parse_flag
    )]
    pub tar_compress: bool,

    /// Only entries matching this glob are processed.
    #[arg(long, env = "PLUGIN_GLOB")]
    pub glob: Option<String>,

    /// Entries matching this glob are skipped.
    #[arg(long, env = "PLUGIN_EXCLUDE")]
    pub exclude: Option<String>,

    /// Diagnostic verbosity: info, debug or trace.
    #[arg(long, env = "PLUGIN_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Container kind of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Zip,
    Tar,
    Gzip,
}

impl FromStr for Format {
    type Err = ArchiveError;

    fn from_str(s: &str) -> ArchiveResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(Self::Zip),
            "tar" => Ok(Self::Tar),
            "gzip" | "gz" => Ok(Self::Gzip),
            other => Err(ArchiveError::Config(format!(
                "unknown format '{}' (expected zip, tar or gzip)",
                other
            ))),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::Gzip => "gzip",
        };
        f.write_str(name)
    }
}

/// Direction of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Archive,
    Extract,
}

impl FromStr for Action {
    type Err = ArchiveError;

    fn from_str(s: &str) -> ArchiveResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "archive" => Ok(Self::Archive),
            "extract" => Ok(Self::Extract),
            other => Err(ArchiveError::Config(format!(
                "unknown action '{}' (expected archive or extract)",
                other
            ))),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive => f.write_str("archive"),
            Self::Extract => f.write_str("extract"),
        }
    }
}

/// Verbosity requested through `PLUGIN_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Parses a level name, returning `None` for anything unrecognized.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    /// The directive handed to `tracing_subscriber::EnvFilter`.
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// One fully validated archive or extract request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub source: PathBuf,
    pub target: PathBuf,
    pub format: Format,
    pub action: Action,
    pub overwrite: bool,
    /// Gzip the tar stream; always `false` for other formats.
    pub compress: bool,
    pub include: Option<String>,
    pub exclude: Option<String>,
}

/// How the dispatcher should be driven for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    Explicit(Operation),
    /// Neither format nor action configured: infer zip archive/extract from the source.
    AutoDetect { source: PathBuf, target: PathBuf },
}

/// Parses a boolean setting. Runners often export unset settings as empty
/// strings, so an empty value reads as `false`; anything else goes through
/// clap's `BoolishValueParser` (`true`/`false`, `yes`/`no`, `on`/`off`, `1`/`0`).
fn parse_flag(value: &str) -> Result<bool, String> {
    if value.trim().is_empty() {
        return Ok(false);
    }
    BoolishValueParser::new()
        .parse_ref(&Command::new("archive-plugin"), None, OsStr::new(value.trim()))
        .map_err(|e| e.to_string())
}

/// Treats empty and whitespace-only strings as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required_path(value: Option<PathBuf>, key: &str) -> ArchiveResult<PathBuf> {
    value
        .filter(|p| !p.as_os_str().is_empty())
        .ok_or_else(|| ArchiveError::Config(format!("{} must be set", key)))
}

impl PluginArgs {
    /// Validates the raw settings and decides how the run proceeds.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError::Config` if the source or target is missing, if only
    /// one of format/action is set, or if either holds an unknown value.
    pub fn resolve(self) -> ArchiveResult<RunMode> {
        let source = required_path(self.source, "PLUGIN_SOURCE")?;
        let target = required_path(self.target, "PLUGIN_TARGET")?;

        let (format, action) = match (non_empty(self.format), non_empty(self.action)) {
            (None, None) => {
                debug!("No format or action configured, using auto-detect mode");
                return Ok(RunMode::AutoDetect { source, target });
            }
            (Some(format), Some(action)) => (format.parse::<Format>()?, action.parse::<Action>()?),
            (Some(_), None) => {
                return Err(ArchiveError::Config(
                    "PLUGIN_ACTION must be set when PLUGIN_FORMAT is set".into(),
                ))
            }
            (None, Some(_)) => {
                return Err(ArchiveError::Config(
                    "PLUGIN_FORMAT must be set when PLUGIN_ACTION is set".into(),
                ))
            }
        };

        if self.tar_compress && format != Format::Tar {
            warn!("PLUGIN_TAR_COMPRESS only applies to tar, ignoring it for {}", format);
        }

        Ok(RunMode::Explicit(Operation {
            source,
            target,
            format,
            action,
            overwrite: self.overwrite,
            compress: self.tar_compress && format == Format::Tar,
            include: non_empty(self.glob),
            exclude: non_empty(self.exclude),
        }))
    }
}
