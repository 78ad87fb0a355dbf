//! Special file integration tests for the cpf CLI.
//!
//! Named pipes and sockets are recreated at the destination, never opened.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, cpf, parse_json};
use std::ffi::CString;
use std::fs;
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, PermissionsExt};
use std::os::unix::net::UnixListener;
use std::path::Path;

fn mkfifo(path: &Path) {
    let c_path = CString::new(path.as_os_str().as_bytes()).unwrap();
    // SAFETY: c_path is a valid NUL-terminated string.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o644) };
    assert_eq!(rc, 0, "mkfifo failed: {}", std::io::Error::last_os_error());
}

#[test]
fn test_fifo_is_recreated() {
    let fx = TestFixture::new();
    let src = fx.path("pipe");
    mkfifo(&src);
    let dst = fx.path("pipe.copy");

    // Opening the pipe would block without a writer; this must return.
    cpf().arg(&src).arg(&dst).assert().success();

    assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_fifo());
}

#[test]
fn test_socket_is_recreated() {
    let fx = TestFixture::new();
    let src = fx.path("sock");
    let _listener = UnixListener::bind(&src).unwrap();
    let dst = fx.path("sock.copy");

    cpf().arg(&src).arg(&dst).assert().success();

    assert!(fs::symlink_metadata(&dst).unwrap().file_type().is_socket());
}

#[test]
fn test_archived_fifo_keeps_mode() {
    let fx = TestFixture::new();
    let src = fx.path("pipe");
    mkfifo(&src);
    fs::set_permissions(&src, fs::Permissions::from_mode(0o600)).unwrap();
    let dst = fx.path("pipe.copy");

    let output = cpf()
        .arg("-a")
        .arg("--output")
        .arg("json")
        .arg(&src)
        .arg(&dst)
        .output()
        .unwrap();
    assert!(output.status.success());

    let meta = fs::symlink_metadata(&dst).unwrap();
    assert!(meta.file_type().is_fifo());
    assert_eq!(meta.permissions().mode() & 0o7777, 0o600);

    let value = parse_json(&output.stdout);
    assert_eq!(value["operation"], "archive");
    assert_eq!(value["outcome"], "done");
}

#[test]
fn test_moved_directory_keeps_contents() {
    let fx = TestFixture::new();
    let src = fx.path("dir");
    fs::create_dir(&src).unwrap();
    fs::write(src.join("inside.txt"), "content").unwrap();
    let dst = fx.path("moved");

    cpf().arg("-m").arg(&src).arg(&dst).assert().success();

    assert!(!src.exists());
    assert_eq!(
        fs::read_to_string(dst.join("inside.txt")).unwrap(),
        "content"
    );
}
