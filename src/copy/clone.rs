//! Copy-on-write cloning.
//!
//! On filesystems with reflink support (Btrfs, XFS, APFS) a clone shares the
//! data blocks of the source until either file is modified.

use crate::error::{Error, ErrorCode, Result};
use std::fs::{self, File};
use std::path::Path;

/// Clone the contents of `input` onto `output` without copying data.
///
/// Neither file is closed. After a failure the offsets of both files are
/// unspecified.
///
/// # Errors
///
/// - [`ErrorCode::IoctlClone`] when the filesystem refuses the clone, e.g.
///   across devices or without reflink support
/// - [`ErrorCode::Unsupported`] on platforms without a descriptor-level
///   clone call, or when the crate was built without the `reflink` feature
pub fn clone_stream(input: &File, output: &File) -> Result<()> {
    ficlone(input, output)
}

/// Clone a regular file to a new location without copying its data.
///
/// `metadata` is the `symlink_metadata` of `source` if already known.
/// `dest` must not exist. A destination created for a clone that then
/// fails is removed again.
///
/// There is no fallback: when cloning is impossible the caller decides
/// whether to copy instead (e.g. with [`copy_file`](crate::copy_file)).
///
/// # Errors
///
/// - [`ErrorCode::Stat`] when `metadata` is `None` and `source` cannot be
///   inspected
/// - [`ErrorCode::Unsupported`] when `source` is not a regular file, or the
///   crate was built without the `reflink` feature
/// - [`ErrorCode::OpenSource`] or [`ErrorCode::OpenDest`] when either file
///   cannot be opened
/// - [`ErrorCode::IoctlClone`] when the filesystem refuses the clone
pub fn clone_file(source: &Path, dest: &Path, metadata: Option<&fs::Metadata>) -> Result<()> {
    let is_file = match metadata {
        Some(metadata) => metadata.is_file(),
        None => fs::symlink_metadata(source)
            .map_err(|e| Error::os(ErrorCode::Stat, e))?
            .is_file(),
    };
    if !is_file {
        return Err(Error::control(ErrorCode::Unsupported));
    }

    clone_path(source, dest)
}

// APFS clones by path; there is no descriptor-to-descriptor call.
#[cfg(all(feature = "reflink", target_os = "macos"))]
fn clone_path(source: &Path, dest: &Path) -> Result<()> {
    reflink_copy::reflink(source, dest).map_err(|e| Error::os(ErrorCode::IoctlClone, e))
}

#[cfg(not(all(feature = "reflink", target_os = "macos")))]
fn clone_path(source: &Path, dest: &Path) -> Result<()> {
    if !cfg!(all(feature = "reflink", target_os = "linux")) {
        return Err(Error::control(ErrorCode::Unsupported));
    }

    let input = File::open(source).map_err(|e| Error::os(ErrorCode::OpenSource, e))?;
    let output = create_new(dest).map_err(|e| Error::os(ErrorCode::OpenDest, e))?;

    let result = clone_stream(&input, &output);
    drop(output);
    if result.is_err() {
        // The empty file is ours; a failed removal leaves it behind.
        let _ = fs::remove_file(dest);
    }
    result
}

#[cfg(not(all(feature = "reflink", target_os = "macos")))]
fn create_new(dest: &Path) -> std::io::Result<File> {
    let mut open = fs::OpenOptions::new();
    open.write(true).create_new(true);

    #[cfg(unix)]
    {
        use super::regular::FILE_MODE;
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(FILE_MODE);
    }

    open.open(dest)
}

#[cfg(all(feature = "reflink", target_os = "linux"))]
fn ficlone(input: &File, output: &File) -> Result<()> {
    use std::os::fd::AsRawFd;

    // _IOW(0x94, 9, int); the direction bits sit higher on these targets.
    #[cfg(any(
        target_arch = "powerpc",
        target_arch = "powerpc64",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "sparc",
        target_arch = "sparc64"
    ))]
    const FICLONE: u32 = 0x8004_9409;
    #[cfg(not(any(
        target_arch = "powerpc",
        target_arch = "powerpc64",
        target_arch = "mips",
        target_arch = "mips64",
        target_arch = "sparc",
        target_arch = "sparc64"
    )))]
    const FICLONE: u32 = 0x4004_9409;

    // SAFETY: both descriptors are open for the duration of the borrow;
    // FICLONE takes the source descriptor by value.
    let ret = unsafe { libc::ioctl(output.as_raw_fd(), FICLONE as _, input.as_raw_fd()) };
    if ret == -1 {
        return Err(Error::os(
            ErrorCode::IoctlClone,
            std::io::Error::last_os_error(),
        ));
    }
    Ok(())
}

#[cfg(not(all(feature = "reflink", target_os = "linux")))]
fn ficlone(_input: &File, _output: &File) -> Result<()> {
    Err(Error::control(ErrorCode::Unsupported))
}
