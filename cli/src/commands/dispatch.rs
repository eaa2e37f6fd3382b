//! # Operation Dispatcher (`commands::dispatch`)
//!
//! File: cli/src/commands/dispatch.rs
//!
//! ## Overview
//!
//! Runs one fully resolved `Operation`:
//!
//! 1. **Preflight**: an existing target is an error unless overwrite is enabled,
//!    in which case it is removed (recursively, for directories). A target that
//!    is or contains the source is never removed.
//! 2. **Dispatch**: one of six routes, zip/tar/gzip × archive/extract.
//! 3. **Invoke**: the archive engine result is returned with context attached.
//!
use crate::common::archive::pattern::PatternSet;
use crate::common::archive::{compression, tar, zip};
use crate::common::fs::io as fsio;
use crate::core::config::{Action, Format, Operation};
use crate::core::error::{ArchiveError, ArchiveResult, Result};
use anyhow::Context;
use std::fs;
use tracing::{debug, warn};

pub struct Dispatcher {
    operation: Operation,
}

impl Dispatcher {
    pub fn new(operation: Operation) -> Self {
        Self { operation }
    }

    /// Runs the preflight check and the selected archive route.
    pub fn run(&self) -> Result<()> {
        let op = &self.operation;
        debug!("Running operation: {:?}", op);

        self.preflight()?;
        self.invoke().with_context(|| {
            format!(
                "{} {} of '{}' into '{}' failed",
                op.format,
                op.action,
                op.source.display(),
                op.target.display()
            )
        })
    }

    fn preflight(&self) -> ArchiveResult<()> {
        let op = &self.operation;
        if !fsio::path_exists(&op.target) {
            return Ok(());
        }
        if !op.overwrite {
            return Err(ArchiveError::TargetExists {
                path: op.target.clone(),
            });
        }
        self.refuse_to_remove_source()?;
        fsio::remove_existing(&op.target)
    }

    fn refuse_to_remove_source(&self) -> ArchiveResult<()> {
        let op = &self.operation;
        let (Ok(source), Ok(target)) = (fs::canonicalize(&op.source), fs::canonicalize(&op.target))
        else {
            // A missing source cannot be harmed; the route reports it.
            return Ok(());
        };
        if source.starts_with(&target) {
            return Err(ArchiveError::Config(format!(
                "refusing to overwrite '{}': it contains the source '{}'",
                op.target.display(),
                op.source.display()
            )));
        }
        Ok(())
    }

    fn invoke(&self) -> ArchiveResult<()> {
        let op = &self.operation;
        let patterns = PatternSet::new(op.include.as_deref(), op.exclude.as_deref());
        let (source, target) = (op.source.as_path(), op.target.as_path());
        debug!("Selecting {}", patterns);

        match (op.format, op.action) {
            (Format::Zip, Action::Archive) => zip::archive(source, target, &patterns).map(drop),
            (Format::Zip, Action::Extract) => zip::extract(source, target, &patterns).map(drop),
            (Format::Tar, Action::Archive) => {
                tar::archive(source, target, &patterns, op.compress).map(drop)
            }
            (Format::Tar, Action::Extract) => tar::extract(source, target, &patterns).map(drop),
            (Format::Gzip, action) => {
                if !patterns.is_empty() {
                    warn!("PLUGIN_GLOB and PLUGIN_EXCLUDE do not apply to gzip, ignoring them");
                }
                match action {
                    Action::Archive => compression::gzip_file(source, target),
                    Action::Extract => compression::gunzip_file(source, target),
                }
            }
        }
    }
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn operation(source: &Path, target: &Path, format: Format, action: Action) -> Operation {
        Operation {
            source: source.to_path_buf(),
            target: target.to_path_buf(),
            format,
            action,
            overwrite: false,
            compress: false,
            include: None,
            exclude: None,
        }
    }

    #[test]
    fn test_existing_target_without_overwrite_is_untouched() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let source = dir.path().join("in.txt");
        fs::write(&source, "new")?;
        let target = dir.path().join("out.gz");
        fs::write(&target, "old")?;

        let err = Dispatcher::new(operation(&source, &target, Format::Gzip, Action::Archive))
            .run()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::TargetExists { .. })
        ));
        assert_eq!(fs::read_to_string(&target)?, "old");
        Ok(())
    }

    #[test]
    fn test_overwrite_replaces_target_directory() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("src");
        fs::create_dir(&src)?;
        fs::write(src.join("fresh.txt"), "fresh")?;
        let archive = dir.path().join("src.zip");
        Dispatcher::new(operation(&src, &archive, Format::Zip, Action::Archive)).run()?;

        let out = dir.path().join("out");
        fs::create_dir(&out)?;
        fs::write(out.join("stale.txt"), "stale")?;

        let mut op = operation(&archive, &out, Format::Zip, Action::Extract);
        op.overwrite = true;
        Dispatcher::new(op).run()?;

        assert!(!out.join("stale.txt").exists());
        assert_eq!(fs::read_to_string(out.join("src/fresh.txt"))?, "fresh");
        Ok(())
    }

    #[test]
    fn test_overwrite_never_removes_the_source() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("project");
        fs::create_dir(&src)?;
        fs::write(src.join("main.rs"), "fn main() {}")?;

        let mut op = operation(&src, dir.path(), Format::Tar, Action::Archive);
        op.overwrite = true;
        let err = Dispatcher::new(op).run().unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::Config(_))
        ));
        assert!(src.join("main.rs").exists());
        Ok(())
    }

    #[test]
    fn test_failure_carries_operation_context() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let err = Dispatcher::new(operation(
            &dir.path().join("missing"),
            &dir.path().join("out.tar"),
            Format::Tar,
            Action::Archive,
        ))
        .run()
        .unwrap_err();

        let message = format!("{:#}", err);
        assert!(message.contains("tar archive of"), "got: {message}");
        assert!(matches!(
            err.downcast_ref::<ArchiveError>(),
            Some(ArchiveError::Io { .. })
        ));
        assert!(!dir.path().join("out.tar").exists());
        Ok(())
    }
}
