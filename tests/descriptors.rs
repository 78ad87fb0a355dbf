//! Descriptor leak checks.
//!
//! Every scenario runs inside a single test so no other test thread opens
//! descriptors while `/proc/self/fd` is being counted.

#![cfg(target_os = "linux")]

use copyfile::{Action, CopyOptions, ErrorCode, Event, SpecialFile, Status, copy_file, create_special};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn open_descriptors() -> usize {
    fs::read_dir("/proc/self/fd").unwrap().count()
}

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 253) as u8).collect()
}

fn abort_at_second_checkpoint(dir: &Path) {
    let src = dir.join("abort.src");
    let dst = dir.join("abort.dst");
    let data = pattern(16 * 4096);
    fs::write(&src, &data).unwrap();

    let options = CopyOptions::default().with_callback_interval(3);
    let mut checkpoints = 0;
    let mut callback = |event: &Event<'_>| {
        if matches!(event.status, Status::Running) {
            checkpoints += 1;
            if checkpoints == 2 {
                return Action::Abort;
            }
        }
        Action::Continue
    };

    let err = copy_file(&src, &dst, None, &options, Some(&mut callback)).unwrap_err();

    assert_eq!(err.code(), ErrorCode::Aborted);
    // The first checkpoint is the start, the second follows three reads.
    assert_eq!(fs::read(&dst).unwrap(), &data[..3 * 4096]);
}

fn failures(dir: &Path) {
    // Source missing
    let err = copy_file(
        &dir.join("missing"),
        &dir.join("out"),
        None,
        &CopyOptions::default(),
        None,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::Stat);

    // Destination cannot be created; the source was already open
    let src = dir.join("fail.src");
    fs::write(&src, "x").unwrap();
    let err = copy_file(
        &src,
        &dir.join("no/such/dir"),
        None,
        &CopyOptions::default(),
        None,
    )
    .unwrap_err();
    assert_eq!(err.code(), ErrorCode::OpenDest);

    // Socket bind failure closes the socket
    let taken = dir.join("taken");
    fs::write(&taken, "x").unwrap();
    let err = create_special(&taken, SpecialFile::UnixSocket, None).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Bind);
}

fn successes(dir: &Path) {
    let src = dir.join("ok.src");
    fs::write(&src, pattern(100_000)).unwrap();
    copy_file(&src, &dir.join("ok.dst"), None, &CopyOptions::default(), None).unwrap();

    create_special(&dir.join("sock"), SpecialFile::UnixSocket, None).unwrap();
}

#[test]
fn test_no_descriptor_leaks() {
    let dir = tempdir().unwrap();
    let before = open_descriptors();

    abort_at_second_checkpoint(dir.path());
    assert_eq!(open_descriptors(), before, "leak after aborted copy");

    failures(dir.path());
    assert_eq!(open_descriptors(), before, "leak after failed operations");

    successes(dir.path());
    assert_eq!(open_descriptors(), before, "leak after successful operations");
}
