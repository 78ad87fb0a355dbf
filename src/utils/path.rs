//! Path conversions for raw system calls.

use std::ffi::CString;
use std::io;
use std::path::Path;

/// Convert a path to a NUL-terminated string for libc calls.
///
/// Paths containing an interior NUL byte cannot be passed to the kernel
/// and are rejected with [`io::ErrorKind::InvalidInput`].
#[cfg(unix)]
pub(crate) fn to_cstring(path: &Path) -> io::Result<CString> {
    use std::os::unix::ffi::OsStrExt;

    CString::new(path.as_os_str().as_bytes()).map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            "path contains an interior NUL byte",
        )
    })
}
