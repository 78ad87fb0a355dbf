//! Basic functionality integration tests for the cpf CLI.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, cpf, mtime, parse_json};
use predicates::prelude::*;
use rstest::rstest;
use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt, symlink};
use std::time::Duration;

#[test]
fn test_basic_file_copy() {
    let fx = TestFixture::new();
    let src = fx.create_file("test.txt", b"hello world");
    let dst = fx.path("copy.txt");

    cpf().arg(&src).arg(&dst).assert().success();

    fx.assert_file_content(&dst, b"hello world");
}

#[test]
fn test_large_file_copy_with_small_buffer() {
    let fx = TestFixture::new();
    let content: Vec<u8> = (0..300_000u32).map(|i| (i % 251) as u8).collect();
    let src = fx.create_file("big.bin", &content);
    let dst = fx.path("big.copy");

    cpf()
        .arg("--buffer-size")
        .arg("1000")
        .arg("--fsync")
        .arg("-q")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    fx.assert_file_content(&dst, &content);
}

#[test]
fn test_overwrite_existing_file() {
    let fx = TestFixture::new();
    let src = fx.create_file("new.txt", b"new");
    let dst = fx.create_file("old.txt", b"much older and longer content");

    cpf().arg(&src).arg(&dst).assert().success();

    fx.assert_file_content(&dst, b"new");
}

#[test]
fn test_plain_copy_does_not_preserve_mtime() {
    let fx = TestFixture::new();
    let src = fx.create_old_file("src.txt", b"data", Duration::from_secs(3 * 86400));
    let dst = fx.path("dst.txt");

    cpf().arg(&src).arg(&dst).assert().success();

    assert_ne!(mtime(&dst), mtime(&src));
}

#[test]
fn test_archive_preserves_mode_and_mtime() {
    let fx = TestFixture::new();
    let src = fx.create_old_file("src.txt", b"data", Duration::from_secs(3 * 86400));
    fs::set_permissions(&src, fs::Permissions::from_mode(0o640)).unwrap();
    let dst = fx.path("dst.txt");

    cpf()
        .arg("-a")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Archived"));

    assert_eq!(mtime(&dst), mtime(&src));
    assert_eq!(fs::metadata(&dst).unwrap().mode() & 0o7777, 0o640);
}

#[test]
fn test_preserve_selects_metadata() {
    let fx = TestFixture::new();
    let src = fx.create_old_file("src.txt", b"data", Duration::from_secs(3 * 86400));
    fs::set_permissions(&src, fs::Permissions::from_mode(0o600)).unwrap();
    let dst = fx.path("dst.txt");

    cpf()
        .arg("--preserve")
        .arg("timestamps")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success();

    assert_eq!(mtime(&dst), mtime(&src));
    // Mode was not requested; the new file keeps its umask-derived mode.
    assert_ne!(fs::metadata(&dst).unwrap().mode() & 0o7777, 0o600);
}

#[test]
fn test_symlink_is_copied_as_symlink() {
    let fx = TestFixture::new();
    let src = fx.path("link");
    symlink("some/dangling/target", &src).unwrap();
    let dst = fx.path("link.copy");

    cpf().arg(&src).arg(&dst).assert().success();

    assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_link(&dst).unwrap().to_str(),
        Some("some/dangling/target")
    );
}

#[test]
fn test_directory_is_created_not_recursed() {
    let fx = TestFixture::new();
    let src = fx.path("dir");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("inside.txt"), "content").unwrap();
    let dst = fx.path("dir.copy");

    cpf().arg(&src).arg(&dst).assert().success();

    assert!(dst.is_dir());
    assert_eq!(fs::read_dir(&dst).unwrap().count(), 0);
}

#[test]
fn test_hard_link() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"shared");
    let dst = fx.path("dst.txt");

    cpf().arg("-l").arg(&src).arg(&dst).assert().success();

    let src_meta = fs::metadata(&src).unwrap();
    let dst_meta = fs::metadata(&dst).unwrap();
    assert_eq!(src_meta.ino(), dst_meta.ino());
    assert_eq!(src_meta.nlink(), 2);
}

#[test]
fn test_move() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"moving");
    let dst = fx.path("dst.txt");

    cpf()
        .arg("--move")
        .arg(&src)
        .arg(&dst)
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved"));

    assert!(!src.exists());
    fx.assert_file_content(&dst, b"moving");
}

#[rstest]
#[case::copy(&[], "copy", &[])]
#[case::archive(&["-a"], "archive", &["user", "group", "mode", "mtime", "atime"])]
#[case::timestamps(&["--preserve", "timestamps"], "archive", &["mtime", "atime"])]
#[case::mode(&["--preserve", "mode"], "archive", &["mode"])]
#[case::link(
    &["-l"],
    "link",
    &["user", "group", "mode", "mtime", "atime", "acl", "cap"]
)]
fn test_json_output(
    #[case] flags: &[&str],
    #[case] operation: &str,
    #[case] applied: &[&str],
) {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"json");
    let dst = fx.path("dst.txt");

    let output = cpf()
        .args(flags)
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();
    assert!(output.status.success());

    let value = parse_json(&output.stdout);
    assert_eq!(value["source"], src.display().to_string());
    assert_eq!(value["destination"], dst.display().to_string());
    assert_eq!(value["operation"], operation);
    assert_eq!(value["outcome"], "done");
    assert!(value.get("error_code").is_none());

    // Extended attributes depend on the filesystem; compare the rest.
    let reported: Vec<&str> = value["metadata_applied"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .filter(|name| *name != "xattr")
        .collect();
    assert_eq!(reported, applied);
}

#[test]
fn test_quiet_mode() {
    let fx = TestFixture::new();
    let src = fx.create_file("src.txt", b"quiet");

    cpf()
        .arg("-q")
        .arg(&src)
        .arg(fx.path("dst.txt"))
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::is_empty());
}
