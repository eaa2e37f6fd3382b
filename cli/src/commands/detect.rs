//! # Zip Auto-Detect Mode (`commands::detect`)
//!
//! File: cli/src/commands/detect.rs
//!
//! ## Overview
//!
//! Compatibility path for pipelines that set only `PLUGIN_SOURCE` and
//! `PLUGIN_TARGET`. The format is always zip; the action is inferred:
//!
//! - a directory, or a file without a `.zip` extension, is archived;
//! - a `.zip` file is extracted.
//!
//! This mode performs no overwrite preflight and applies no patterns.
//!
use crate::common::archive::pattern::PatternSet;
use crate::common::archive::zip;
use crate::core::config::Action;
use crate::core::error::{ArchiveError, Result};
use anyhow::Context;
use std::fs;
use std::path::Path;
use tracing::info;

/// Decides between zip archive and zip extract for `source`.
pub fn infer_action(source: &Path, is_dir: bool) -> Action {
    let is_zip = source
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if is_dir || !is_zip {
        Action::Archive
    } else {
        Action::Extract
    }
}

pub fn run(source: &Path, target: &Path) -> Result<()> {
    let metadata = fs::metadata(source)
        .map_err(|e| ArchiveError::io(source, e))
        .context("error accessing source")?;

    let action = infer_action(source, metadata.is_dir());
    info!("No format or action configured, running zip {}", action);

    let patterns = PatternSet::default();
    match action {
        Action::Archive => zip::archive(source, target, &patterns),
        Action::Extract => zip::extract(source, target, &patterns),
    }
    .with_context(|| format!("zip {} of '{}' failed", action, source.display()))?;
    Ok(())
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_infer_action() {
        assert_eq!(infer_action(Path::new("site"), true), Action::Archive);
        assert_eq!(infer_action(Path::new("notes.txt"), false), Action::Archive);
        assert_eq!(infer_action(Path::new("bundle.zip"), false), Action::Extract);
        assert_eq!(infer_action(Path::new("BUNDLE.ZIP"), false), Action::Extract);
        // A directory named like an archive is still archived.
        assert_eq!(infer_action(Path::new("odd.zip"), true), Action::Archive);
    }

    #[test]
    fn test_run_archives_then_extracts() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let src = dir.path().join("docs");
        fs::create_dir(&src)?;
        fs::write(src.join("readme.md"), "# docs")?;
        let archive = dir.path().join("docs.zip");

        run(&src, &archive)?;
        run(&archive, &dir.path().join("out"))?;
        assert_eq!(
            fs::read_to_string(dir.path().join("out/docs/readme.md"))?,
            "# docs"
        );
        Ok(())
    }

    #[test]
    fn test_run_reports_missing_source() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let err = run(&dir.path().join("nope"), &dir.path().join("out.zip")).unwrap_err();
        assert!(format!("{:#}", err).starts_with("error accessing source"));
        Ok(())
    }
}
