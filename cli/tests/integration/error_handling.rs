//! Error handling integration tests for the cpf CLI.
//!
//! These tests verify proper error handling behaviors:
//! - Failures name the primitive that failed and exit with status 1
//! - Usage errors are rejected by the parser with status 2
//! - JSON output carries the error code and message

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, cpf, parse_json};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_source_not_found() {
    let fx = TestFixture::new();

    cpf()
        .arg(fx.path("missing"))
        .arg(fx.path("dst"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[stat]"));

    assert!(!fx.path("dst").exists());
}

#[test]
fn test_destination_directory_missing() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"data");

    cpf()
        .arg(&src)
        .arg(fx.path("no/such/dir/dst.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[open_dest]"));
}

/// Creating a directory over an existing one fails instead of merging.
#[test]
fn test_existing_directory_destination() {
    let fx = TestFixture::new();
    let src = fx.path("srcdir");
    let dst = fx.path("dstdir");
    fs::create_dir(&src).unwrap();
    fs::create_dir(&dst).unwrap();
    fs::write(dst.join("inside.txt"), "inside content").unwrap();

    cpf()
        .arg(&src)
        .arg(&dst)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[mkdir]"));

    assert_eq!(
        fs::read_to_string(dst.join("inside.txt")).unwrap(),
        "inside content",
        "Directory content should not be modified"
    );
}

/// A regular file cannot replace a directory.
#[test]
fn test_file_over_directory_fails() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"file content");
    let dst = fx.path("dstdir");
    fs::create_dir(&dst).unwrap();

    cpf()
        .arg(&src)
        .arg(&dst)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[open_dest]"));

    assert!(dst.is_dir());
}

#[test]
fn test_symlink_over_existing_entry_fails() {
    let fx = TestFixture::new();
    let src = fx.path("link");
    std::os::unix::fs::symlink("target", &src).unwrap();
    let dst = fx.create_file("taken", b"keep me");

    cpf()
        .arg(&src)
        .arg(&dst)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[symlink]"));

    fx.assert_file_content(&dst, b"keep me");
}

#[test]
fn test_hard_link_over_existing_file_fails() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"new");
    let dst = fx.create_file("dst.txt", b"old");

    cpf()
        .arg("-l")
        .arg(&src)
        .arg(&dst)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[link]"));

    fx.assert_file_content(&dst, b"old");
}

#[test]
fn test_move_missing_source() {
    let fx = TestFixture::new();

    cpf()
        .arg("-m")
        .arg(fx.path("missing"))
        .arg(fx.path("dst"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[rename]"));
}

#[test]
fn test_conflicting_modes_are_usage_errors() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"data");

    cpf()
        .arg("-a")
        .arg("-m")
        .arg(&src)
        .arg(fx.path("dst"))
        .assert()
        .code(2);

    cpf()
        .arg("-l")
        .arg("--preserve")
        .arg("mode")
        .arg(&src)
        .arg(fx.path("dst"))
        .assert()
        .code(2);

    assert!(!fx.path("dst").exists());
}

#[test]
fn test_unknown_preserve_item() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"data");

    cpf()
        .arg("--preserve")
        .arg("mode,colour")
        .arg(&src)
        .arg(fx.path("dst"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_missing_destination_operand() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"data");

    cpf().arg(&src).assert().code(2);
}

#[test]
fn test_json_output_on_failure() {
    let fx = TestFixture::new();
    let src = fx.path("missing");
    let dst = fx.path("dst");

    let output = cpf()
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let value = parse_json(&output.stdout);
    assert_eq!(value["operation"], "copy");
    assert_eq!(value["outcome"], "failed");
    assert_eq!(value["error_code"], "stat");
    assert!(
        value["error_message"]
            .as_str()
            .is_some_and(|message| message.contains("Getting file information failed"))
    );
    assert_eq!(value["metadata_applied"], serde_json::json!([]));
}
