//! Symbolic link copying.
//!
//! Link targets are read with `readlink(2)`, which silently truncates when
//! the buffer is too small. A short read is the only proof that the target
//! was read completely, so a read that fills the buffer is retried with a
//! larger one.

use crate::callback::{Callback, Notifier, Progress, Status};
use crate::error::{Error, ErrorCode, Result};
use std::io;
use std::path::Path;

/// Capacity of the on-stack buffer used for the first read attempt.
pub(crate) const STACK_BUFFER_SIZE: usize = 256;

/// Largest buffer `readlink` can report on: its return type is `ssize_t`.
const MAX_READ_SIZE: usize = isize::MAX as usize;

/// Copy a symbolic link to a new location.
///
/// The target is copied byte-for-byte; relative targets now resolve
/// relative to `dest`. `dest` must not exist.
///
/// `expected_length` is the target length if known (e.g. `st_size` from
/// `lstat`), otherwise 0. A length beyond the stack buffer skips straight
/// to a heap buffer of the right size.
///
/// # Callback protocol
///
/// - [`Status::Running`] with [`Progress::SymlinkLength`] before anything
///   is read; aborting returns [`ErrorCode::Aborted`].
/// - [`Status::Eof`] with [`Progress::SymlinkTarget`] once the link exists;
///   aborting returns [`ErrorCode::Aborted`] and leaves the link in place.
///
/// Failures are not retried.
///
/// # Errors
///
/// - [`ErrorCode::Readlink`] when reading the target fails
/// - [`ErrorCode::Alloc`] when a target buffer cannot be allocated
/// - [`ErrorCode::SymlinkTargetTooLong`] when the target does not fit even
///   the largest possible buffer
/// - [`ErrorCode::Symlink`] when creating the link fails
pub fn copy_symlink(
    source: &Path,
    dest: &Path,
    expected_length: u64,
    callback: Option<&mut dyn Callback>,
) -> Result<()> {
    let mut notifier = Notifier::new(callback);

    if notifier.progress(Status::Running, Progress::SymlinkLength(expected_length)) {
        return Err(Error::aborted());
    }

    let expected = usize::try_from(expected_length).unwrap_or(MAX_READ_SIZE);

    if expected < STACK_BUFFER_SIZE {
        let mut stack = [0u8; STACK_BUFFER_SIZE];
        let read = platform::read_link(source, &mut stack)
            .map_err(|e| Error::os(ErrorCode::Readlink, e))?;
        if read < stack.len() {
            return create_link(&stack[..read], dest, &mut notifier);
        }
    }

    // Either the expected length was too large or the stack buffer was
    // filled and the target may have been truncated.
    let initial = if expected >= STACK_BUFFER_SIZE {
        expected.saturating_add(1)
    } else {
        STACK_BUFFER_SIZE * 2
    };
    let mut buffer = LinkBuffer::new(initial, MAX_READ_SIZE)?;
    let target = read_into(source, &mut buffer)?;
    create_link(target, dest, &mut notifier)
}

fn create_link(target: &[u8], dest: &Path, notifier: &mut Notifier<'_>) -> Result<()> {
    let target = bytes_to_path(target);
    platform::symlink(target, dest).map_err(|e| Error::os(ErrorCode::Symlink, e))?;
    if notifier.progress(Status::Eof, Progress::SymlinkTarget(target)) {
        return Err(Error::aborted());
    }
    Ok(())
}

/// Read the target of `source` into `buffer`, growing it until the read
/// comes back short.
fn read_into<'b>(source: &Path, buffer: &'b mut LinkBuffer) -> Result<&'b [u8]> {
    loop {
        let read = platform::read_link(source, buffer.as_mut_slice())
            .map_err(|e| Error::os(ErrorCode::Readlink, e))?;
        if read < buffer.capacity() {
            return Ok(&buffer.as_slice()[..read]);
        }
        buffer.grow()?;
    }
}

/// Owned, growable buffer for link targets.
///
/// Growth doubles the capacity up to `limit`. When doubling would overshoot
/// the limit the capacity is clamped to it exactly once; growing a buffer
/// already at the limit fails with [`ErrorCode::SymlinkTargetTooLong`].
#[derive(Debug)]
pub(crate) struct LinkBuffer {
    data: Vec<u8>,
    limit: usize,
}

impl LinkBuffer {
    pub(crate) fn new(capacity: usize, limit: usize) -> Result<Self> {
        let mut buffer = Self {
            data: Vec::new(),
            limit,
        };
        buffer.resize(capacity.min(limit))?;
        Ok(buffer)
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn grow(&mut self) -> Result<()> {
        let current = self.capacity();
        if current >= self.limit {
            return Err(Error::control(ErrorCode::SymlinkTargetTooLong));
        }
        let next = current.saturating_mul(2).min(self.limit);
        self.resize(next)
    }

    fn resize(&mut self, capacity: usize) -> Result<()> {
        // Drop the old contents first; they are re-read anyway.
        self.data = Vec::new();
        self.data.try_reserve_exact(capacity).map_err(|e| {
            Error::os(
                ErrorCode::Alloc,
                io::Error::new(io::ErrorKind::OutOfMemory, e),
            )
        })?;
        self.data.resize(capacity, 0);
        Ok(())
    }

    fn as_slice(&self) -> &[u8] {
        &self.data
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> &Path {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    Path::new(OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> &Path {
    Path::new(std::str::from_utf8(bytes).unwrap_or_default())
}

#[cfg(unix)]
mod platform {
    use crate::utils::path::to_cstring;
    use std::io;
    use std::path::Path;

    pub(super) use std::os::unix::fs::symlink;

    /// `readlink(2)` into `buf`; returns the number of bytes stored.
    pub(super) fn read_link(path: &Path, buf: &mut [u8]) -> io::Result<usize> {
        let path = to_cstring(path)?;
        // SAFETY: `path` is NUL-terminated and `buf` is valid for `buf.len()`
        // bytes; readlink never writes more than that.
        let read = unsafe {
            libc::readlink(
                path.as_ptr(),
                buf.as_mut_ptr().cast::<libc::c_char>(),
                buf.len(),
            )
        };
        usize::try_from(read).map_err(|_| io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
mod platform {
    use std::io;
    use std::path::Path;

    pub(super) fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symlinks not supported on this platform",
        ))
    }

    pub(super) fn read_link(_path: &Path, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Symlinks not supported on this platform",
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================
