//! # Gzip Integration Tests
//!
//! File: cli/tests/gzip_format.rs
//!
//! ## Overview
//!
//! Single-file gzip compression and decompression through the plugin binary.
//!

mod common;
use common::*;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_gzip_round_trip_into_new_directories() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("hello.txt");
    fs::write(&source, "hello").unwrap();
    let packed = dir.path().join("packed/hello.txt.gz");
    let restored = dir.path().join("restored/hello.txt");

    operation_cmd(&source, &packed, "gzip", "archive").assert().success();
    operation_cmd(&packed, &restored, "gzip", "extract").assert().success();

    assert_eq!(fs::read(&restored).unwrap(), b"hello");
}

#[test]
fn test_gzip_of_directory_is_rejected() {
    let dir = tempdir().unwrap();
    let target = dir.path().join("out.gz");

    operation_cmd(dir.path(), &target, "gzip", "archive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("is a directory"));
    assert!(!target.exists());
}

#[test]
fn test_gzip_accepts_gz_alias() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("data.bin");
    fs::write(&source, [0u8, 1, 2, 3]).unwrap();
    let packed = dir.path().join("data.bin.gz");

    operation_cmd(&source, &packed, "GZ", "Archive").assert().success();
    assert!(packed.exists());
}
