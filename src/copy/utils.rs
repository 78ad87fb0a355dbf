//! Utility functions for copy operations.
//!
//! Descriptor handling that `std` does not expose: closing with an error
//! report and best-effort space preallocation.

use std::fs::File;
use std::io;

// =============================================================================
// Descriptor handling
// =============================================================================

/// Close a file and report the result of the close call.
///
/// Dropping a [`File`] silently discards close errors, which can carry
/// deferred write failures (e.g. on NFS).
#[cfg(unix)]
pub(crate) fn close_file(file: File) -> io::Result<()> {
    use std::os::unix::io::IntoRawFd;

    let fd = file.into_raw_fd();
    // SAFETY: `fd` was just released from an owned `File`, so it is valid and
    // closed exactly once here.
    let result = unsafe { libc::close(fd) };
    if result == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(not(unix))]
pub(crate) fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// Preallocate `len` bytes for `file`.
///
/// Returns `true` when space was actually reserved. Failure is not an
/// error: preallocation is only an optimization.
#[cfg(target_os = "linux")]
pub(crate) fn preallocate(file: &File, len: u64) -> bool {
    use std::os::unix::io::AsRawFd;

    let Ok(len) = libc::off_t::try_from(len) else {
        return false;
    };
    if len == 0 {
        return false;
    }

    // SAFETY: the descriptor is borrowed from a live `File`.
    let result = unsafe { libc::posix_fallocate(file.as_raw_fd(), 0, len) };
    if result != 0 {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            error = %io::Error::from_raw_os_error(result),
            "preallocation failed, continuing without it"
        );
        return false;
    }
    true
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn preallocate(_file: &File, _len: u64) -> bool {
    false
}

// =============================================================================
// Tests
// =============================================================================
