//! # Tar Integration Tests
//!
//! File: cli/tests/tar_format.rs
//!
//! ## Overview
//!
//! End-to-end tar and tar.gz runs through the plugin binary.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_compressed_tar_round_trip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("logs");
    write_tree(&src, &[("app.log", "started"), ("old/app.1.log", "rotated")]);
    let archive = dir.path().join("logs.tar.gz");
    let out = dir.path().join("out");

    operation_cmd(&src, &archive, "tar", "archive")
        .env("PLUGIN_TAR_COMPRESS", "true")
        .assert()
        .success();
    assert_eq!(&fs::read(&archive).unwrap()[..2], &[0x1f, 0x8b]);

    operation_cmd(&archive, &out, "tar", "extract").assert().success();
    assert_eq!(fs::read_to_string(out.join("logs/old/app.1.log")).unwrap(), "rotated");
}

#[test]
fn test_plain_tar_with_directory_spanning_glob() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("svc");
    write_tree(
        &src,
        &[
            ("dir/a/keep.log", "a"),
            ("dir/b/keep.log", "b"),
            ("dir/skip.log", "c"),
            ("dir/a/notes.txt", "d"),
        ],
    );
    let archive = dir.path().join("svc.tar");
    let out = dir.path().join("out");

    operation_cmd(&src, &archive, "tar", "archive").assert().success();
    operation_cmd(&archive, &out, "tar", "extract")
        .env("PLUGIN_GLOB", "svc/dir/*/*.log")
        .assert()
        .success();

    assert!(out.join("svc/dir/a/keep.log").exists());
    assert!(out.join("svc/dir/b/keep.log").exists());
    assert!(!out.join("svc/dir/skip.log").exists());
    assert!(!out.join("svc/dir/a/notes.txt").exists());
}

#[test]
fn test_compress_flag_ignored_for_zip() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("data");
    write_tree(&src, &[("a.txt", "a")]);
    let archive = dir.path().join("data.zip");

    operation_cmd(&src, &archive, "zip", "archive")
        .env("PLUGIN_TAR_COMPRESS", "true")
        .assert()
        .success()
        .stderr(predicate::str::contains("PLUGIN_TAR_COMPRESS only applies to tar"));
    assert_eq!(&fs::read(&archive).unwrap()[..2], b"PK");
}

#[test]
fn test_tar_extract_of_garbage_fails() {
    let dir = tempdir().unwrap();
    let archive = dir.path().join("broken.tar.gz");
    fs::write(&archive, "this is not gzip").unwrap();

    operation_cmd(&archive, &dir.path().join("out"), "tar", "extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}
