//! # Configuration and Dispatch Integration Tests
//!
//! File: cli/tests/dispatch.rs
//!
//! ## Overview
//!
//! Verifies how the binary resolves its settings: required keys, partial
//! format/action configuration, flags versus environment, logging, and the
//! zip auto-detect mode.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_source_is_a_config_error() {
    plugin_cmd()
        .env("PLUGIN_TARGET", "out.zip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLUGIN_SOURCE must be set"));
}

#[test]
fn test_format_without_action_is_rejected() {
    let dir = tempdir().unwrap();
    plugin_cmd()
        .env("PLUGIN_SOURCE", dir.path())
        .env("PLUGIN_TARGET", dir.path().join("out.zip"))
        .env("PLUGIN_FORMAT", "zip")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PLUGIN_ACTION must be set"));
    assert!(!dir.path().join("out.zip").exists());
}

#[test]
fn test_unknown_format_is_rejected() {
    let dir = tempdir().unwrap();
    operation_cmd(dir.path(), &dir.path().join("out.rar"), "rar", "archive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format 'rar'"));
}

#[test]
fn test_flags_work_without_environment() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("note.txt");
    fs::write(&source, "flagged").unwrap();
    let target = dir.path().join("note.txt.gz");

    plugin_cmd()
        .arg("--source")
        .arg(&source)
        .arg("--target")
        .arg(&target)
        .args(["--format", "gzip", "--action", "archive"])
        .assert()
        .success();
    assert!(target.exists());
}

#[test]
fn test_debug_log_level_shows_entries() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("data");
    write_tree(&src, &[("a.txt", "a")]);

    operation_cmd(&src, &dir.path().join("data.tar"), "tar", "archive")
        .env("PLUGIN_LOG_LEVEL", "debug")
        .assert()
        .success()
        .stderr(predicate::str::contains("Adding file data/a.txt"));
}

#[test]
fn test_unknown_log_level_falls_back_to_info() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("data");
    write_tree(&src, &[("a.txt", "a")]);

    operation_cmd(&src, &dir.path().join("data.tar"), "tar", "archive")
        .env("PLUGIN_LOG_LEVEL", "chatty")
        .assert()
        .success()
        .stderr(
            predicate::str::contains("Unknown log level 'chatty'")
                .and(predicate::str::contains("Adding file").not()),
        );
}

#[test]
fn test_auto_detect_archives_then_extracts_zip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("bundle");
    write_tree(&src, &[("readme.md", "# bundle")]);
    let archive = dir.path().join("bundle.zip");
    let out = dir.path().join("out");

    plugin_cmd()
        .env("PLUGIN_SOURCE", &src)
        .env("PLUGIN_TARGET", &archive)
        .assert()
        .success();
    assert_eq!(&fs::read(&archive).unwrap()[..2], b"PK");

    plugin_cmd()
        .env("PLUGIN_SOURCE", &archive)
        .env("PLUGIN_TARGET", &out)
        .assert()
        .success();
    assert_eq!(
        fs::read_to_string(out.join("bundle/readme.md")).unwrap(),
        "# bundle"
    );
}

#[test]
fn test_auto_detect_reports_missing_source() {
    let dir = tempdir().unwrap();
    plugin_cmd()
        .env("PLUGIN_SOURCE", dir.path().join("gone"))
        .env("PLUGIN_TARGET", dir.path().join("gone.zip"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("error accessing source"));
}

#[test]
fn test_traversal_entry_fails_the_run() {
    use std::io::Write;

    let dir = tempdir().unwrap();
    let archive = dir.path().join("evil.zip");
    let mut writer = zip::ZipWriter::new(fs::File::create(&archive).unwrap());
    writer
        .start_file("../../outside.txt", zip::write::SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"boom").unwrap();
    writer.finish().unwrap();

    let out = dir.path().join("a/b/out");
    operation_cmd(&archive, &out, "zip", "extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("resolves outside of target directory"));
    assert!(!dir.path().join("a/outside.txt").exists());
}

#[test]
fn test_empty_boolean_settings_read_as_false() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("data");
    write_tree(&src, &[("a.txt", "a")]);
    let archive = dir.path().join("data.tar");

    operation_cmd(&src, &archive, "tar", "archive")
        .env("PLUGIN_OVERWRITE", "")
        .env("PLUGIN_TAR_COMPRESS", "")
        .assert()
        .success();
    // Uncompressed: a plain tar starts with the entry name, not the gzip magic.
    assert_ne!(&fs::read(&archive).unwrap()[..2], &[0x1f, 0x8b]);

    // Empty overwrite still means "do not overwrite".
    operation_cmd(&src, &archive, "tar", "archive")
        .env("PLUGIN_OVERWRITE", "")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}
