//! Special file creation.
//!
//! Directories, named pipes, device nodes and UNIX domain sockets carry no
//! content; "copying" one means creating a fresh node of the same type.

use crate::callback::{Action, Callback, Notifier, Progress, Status};
use crate::error::{Error, ErrorCode, Result};
use std::io;
use std::path::Path;

/// Mode for newly created directories, before the umask.
pub(crate) const DIR_MODE: u32 = 0o777;

/// A special file to create, with the data its creation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialFile {
    /// Directory
    Directory,
    /// Named pipe
    Fifo,
    /// Character device with the given device id
    CharDevice(u64),
    /// Block device with the given device id
    BlockDevice(u64),
    /// UNIX domain socket
    UnixSocket,
}

impl SpecialFile {
    /// Progress information reported to callbacks for this file.
    #[must_use]
    pub fn progress(self) -> Progress<'static> {
        match self {
            Self::Directory => Progress::Directory,
            Self::Fifo => Progress::Fifo,
            Self::CharDevice(dev) => Progress::CharDevice(dev),
            Self::BlockDevice(dev) => Progress::BlockDevice(dev),
            Self::UnixSocket => Progress::UnixSocket,
        }
    }
}

/// Create a special file at `path`.
///
/// The new node gets default permissions (`0o777` for directories, `0o666`
/// otherwise) filtered by the umask. Sockets are bound and closed
/// immediately; nothing listens on them. `path` must not exist.
///
/// # Callback protocol
///
/// - [`Status::Running`] before creation; aborting returns
///   [`ErrorCode::Aborted`].
/// - [`Status::Failed`] when creation fails; aborting (the default) returns
///   that error, anything else retries.
/// - [`Status::Eof`] after creation; aborting returns
///   [`ErrorCode::Aborted`] and leaves the node in place.
///
/// # Errors
///
/// - [`ErrorCode::Mkdir`], [`ErrorCode::Mkfifo`], [`ErrorCode::Mknod`],
///   [`ErrorCode::Socket`] or [`ErrorCode::Bind`] when the system call fails
/// - [`ErrorCode::SocketDestTooLong`] when `path` does not fit in a socket
///   address; this is never retried
/// - [`ErrorCode::Unsupported`] when the platform cannot create the type
pub fn create_special(
    path: &Path,
    kind: SpecialFile,
    callback: Option<&mut dyn Callback>,
) -> Result<()> {
    let mut notifier = Notifier::new(callback);
    let progress = kind.progress();

    if notifier.progress(Status::Running, progress) {
        return Err(Error::aborted());
    }

    loop {
        let (code, error) = match create_once(path, kind) {
            Ok(()) => break,
            Err(Attempt::Fatal(error)) => return Err(error),
            Err(Attempt::Failed(code, error)) => (code, error),
        };
        if !notifier.should_retry(code, &error, progress, Action::Abort) {
            return Err(Error::os(code, error));
        }
    }

    if notifier.progress(Status::Eof, progress) {
        return Err(Error::aborted());
    }
    Ok(())
}

/// Outcome of a failed creation attempt.
enum Attempt {
    /// A system call failed; the callback may retry.
    Failed(ErrorCode, io::Error),
    /// Retrying cannot help.
    Fatal(Error),
}

#[cfg(unix)]
fn create_once(path: &Path, kind: SpecialFile) -> std::result::Result<(), Attempt> {
    use super::regular::FILE_MODE;
    use std::fs::DirBuilder;
    use std::os::unix::fs::DirBuilderExt;

    match kind {
        SpecialFile::Directory => DirBuilder::new()
            .mode(DIR_MODE)
            .create(path)
            .map_err(|e| Attempt::Failed(ErrorCode::Mkdir, e)),
        SpecialFile::Fifo => unix::mkfifo(path, FILE_MODE as libc::mode_t)
            .map_err(|e| Attempt::Failed(ErrorCode::Mkfifo, e)),
        SpecialFile::CharDevice(dev) => {
            unix::mknod(path, libc::S_IFCHR | FILE_MODE as libc::mode_t, dev)
                .map_err(|e| Attempt::Failed(ErrorCode::Mknod, e))
        }
        SpecialFile::BlockDevice(dev) => {
            unix::mknod(path, libc::S_IFBLK | FILE_MODE as libc::mode_t, dev)
                .map_err(|e| Attempt::Failed(ErrorCode::Mknod, e))
        }
        SpecialFile::UnixSocket => unix::bind_socket(path),
    }
}

#[cfg(not(unix))]
fn create_once(path: &Path, kind: SpecialFile) -> std::result::Result<(), Attempt> {
    match kind {
        SpecialFile::Directory => {
            std::fs::create_dir(path).map_err(|e| Attempt::Failed(ErrorCode::Mkdir, e))
        }
        _ => Err(Attempt::Fatal(Error::control(ErrorCode::Unsupported))),
    }
}

#[cfg(unix)]
mod unix {
    use super::Attempt;
    use crate::error::{Error, ErrorCode};
    use crate::utils::path::to_cstring;
    use std::io;
    use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};
    use std::path::Path;

    fn check(ret: libc::c_int) -> io::Result<()> {
        if ret == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    pub(super) fn mkfifo(path: &Path, mode: libc::mode_t) -> io::Result<()> {
        let path = to_cstring(path)?;
        // SAFETY: `path` is a valid NUL-terminated string.
        check(unsafe { libc::mkfifo(path.as_ptr(), mode) })
    }

    pub(super) fn mknod(path: &Path, mode: libc::mode_t, dev: u64) -> io::Result<()> {
        let dev = device_id(dev)?;
        let path = to_cstring(path)?;
        // SAFETY: `path` is a valid NUL-terminated string.
        check(unsafe { libc::mknod(path.as_ptr(), mode, dev) })
    }

    /// Narrow a device id to the platform's `dev_t`.
    pub(super) fn device_id(dev: u64) -> io::Result<libc::dev_t> {
        libc::dev_t::try_from(dev).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "device id does not fit in dev_t",
            )
        })
    }

    /// Largest path, in bytes, that fits a socket address with its NUL.
    pub(super) fn max_socket_path() -> usize {
        // SAFETY: `sockaddr_un` is plain old data; all-zero is valid.
        let addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
        addr.sun_path.len() - 1
    }

    pub(super) fn bind_socket(path: &Path) -> Result<(), Attempt> {
        let c_path = to_cstring(path).map_err(|e| Attempt::Failed(ErrorCode::Bind, e))?;
        let bytes = c_path.as_bytes();
        if bytes.len() > max_socket_path() {
            return Err(Attempt::Fatal(Error::control(ErrorCode::SocketDestTooLong)));
        }

        // SAFETY: plain socket(2) call; the result is checked below.
        let fd = unsafe { libc::socket(libc::AF_UNIX, libc::SOCK_STREAM, 0) };
        if fd == -1 {
            return Err(Attempt::Failed(
                ErrorCode::Socket,
                io::Error::last_os_error(),
            ));
        }
        // SAFETY: `fd` is a freshly created descriptor owned by nobody else.
        let socket = unsafe { OwnedFd::from_raw_fd(fd) };

        // SAFETY: as above, all-zero is a valid `sockaddr_un`.
        let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
        addr.sun_family = libc::AF_UNIX as libc::sa_family_t;
        for (dst, src) in addr.sun_path.iter_mut().zip(bytes) {
            *dst = *src as libc::c_char;
        }

        // SAFETY: `addr` is initialized and outlives the call; the length
        // matches its type.
        let ret = unsafe {
            libc::bind(
                socket.as_raw_fd(),
                (&raw const addr).cast::<libc::sockaddr>(),
                std::mem::size_of::<libc::sockaddr_un>() as libc::socklen_t,
            )
        };
        // Capture errno before the descriptor is closed.
        let result = check(ret).map_err(|e| Attempt::Failed(ErrorCode::Bind, e));
        drop(socket);
        result
    }
}

// =============================================================================
// Tests
// =============================================================================
