//! Error types for copyfile.
//!
//! Every fallible operation returns an [`Error`] naming the primitive that
//! failed (an [`ErrorCode`] from the *domain* band) together with the
//! operating system error that caused it, or a protocol-level outcome (an
//! [`ErrorCode`] from the *control* band) such as [`ErrorCode::Aborted`].
//!
//! # Error Codes
//!
//! | Band | Range | Codes |
//! |------|-------|-------|
//! | Success | `0` | [`ErrorCode::NoError`] |
//! | Domain | `1..100` | [`ErrorCode::OpenSource`] … [`ErrorCode::IoctlClone`] |
//! | Control | `100..200` | [`ErrorCode::Internal`], [`ErrorCode::SymlinkTargetTooLong`], [`ErrorCode::SocketDestTooLong`], [`ErrorCode::Unsupported`] |
//! | Protocol | `200..` | [`ErrorCode::Aborted`], [`ErrorCode::Eof`] |

use std::fmt;
use std::io;
use thiserror::Error;

/// Result type for copyfile operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// # Example
///
/// ```
/// use std::io;
/// use copyfile::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENOSPC;
        }
    }

    false
}

/// Stable identifier of an operation outcome.
///
/// The numeric values are part of the public contract and are grouped in
/// bands; see the [module documentation](self).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[repr(u32)]
pub enum ErrorCode {
    /// Complete success.
    NoError = 0,

    /// Opening the source file failed.
    OpenSource = 1,
    /// Opening or creating the destination file failed.
    OpenDest,
    /// Reading from the source failed.
    Read,
    /// Writing to (or flushing) the destination failed.
    Write,
    /// Truncating the destination to its final size failed.
    Truncate,
    /// Reading a symbolic link target failed.
    Readlink,
    /// Creating a symbolic link failed.
    Symlink,
    /// A buffer allocation failed.
    Alloc,
    /// Querying file status failed.
    Stat,
    /// Creating a directory failed.
    Mkdir,
    /// Creating a named pipe failed.
    Mkfifo,
    /// Creating a device node failed.
    Mknod,
    /// Creating a UNIX domain socket failed.
    Socket,
    /// Binding a UNIX domain socket to its path failed.
    Bind,
    /// Listing extended attributes failed.
    XattrList,
    /// Reading an extended attribute failed.
    XattrGet,
    /// Setting an extended attribute failed.
    XattrSet,
    /// Reading an access control list failed.
    AclGet,
    /// Setting an access control list failed.
    AclSet,
    /// Reading file capabilities failed.
    CapGet,
    /// Setting file capabilities failed.
    CapSet,
    /// Creating a hard link failed.
    Link,
    /// Renaming failed.
    Rename,
    /// Removing the source after a copy-based move failed.
    UnlinkSource,
    /// Removing an existing destination failed.
    UnlinkDest,
    /// A copy-on-write clone failed.
    IoctlClone,

    /// An internal error; this should never happen.
    Internal = 100,
    /// A symbolic link target is longer than can be read.
    SymlinkTargetTooLong,
    /// The socket destination does not fit in a socket address.
    SocketDestTooLong,
    /// The feature is unsupported or disabled.
    Unsupported,

    /// The operation was aborted by a callback.
    Aborted = 200,
    /// End-of-file status reported to callbacks on completion.
    Eof,
}

const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

impl ErrorCode {
    const ALL: [ErrorCode; 33] = [
        Self::NoError,
        Self::OpenSource,
        Self::OpenDest,
        Self::Read,
        Self::Write,
        Self::Truncate,
        Self::Readlink,
        Self::Symlink,
        Self::Alloc,
        Self::Stat,
        Self::Mkdir,
        Self::Mkfifo,
        Self::Mknod,
        Self::Socket,
        Self::Bind,
        Self::XattrList,
        Self::XattrGet,
        Self::XattrSet,
        Self::AclGet,
        Self::AclSet,
        Self::CapGet,
        Self::CapSet,
        Self::Link,
        Self::Rename,
        Self::UnlinkSource,
        Self::UnlinkDest,
        Self::IoctlClone,
        Self::Internal,
        Self::SymlinkTargetTooLong,
        Self::SocketDestTooLong,
        Self::Unsupported,
        Self::Aborted,
        Self::Eof,
    ];

    /// Look up the code for a raw numeric value.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_raw() == raw)
    }

    /// The stable numeric value of this code.
    #[must_use]
    pub const fn as_raw(self) -> u32 {
        self as u32
    }

    /// Whether this code names a failing primitive operation.
    #[must_use]
    pub const fn is_domain(self) -> bool {
        let raw = self.as_raw();
        raw > 0 && raw < Self::Internal.as_raw()
    }

    /// Whether this code is a protocol-level outcome rather than a
    /// primitive failure.
    #[must_use]
    pub const fn is_control(self) -> bool {
        self.as_raw() >= Self::Internal.as_raw()
    }

    /// Machine-readable identifier, e.g. `"open_dest"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoError => "no_error",
            Self::OpenSource => "open_source",
            Self::OpenDest => "open_dest",
            Self::Read => "read",
            Self::Write => "write",
            Self::Truncate => "truncate",
            Self::Readlink => "readlink",
            Self::Symlink => "symlink",
            Self::Alloc => "alloc",
            Self::Stat => "stat",
            Self::Mkdir => "mkdir",
            Self::Mkfifo => "mkfifo",
            Self::Mknod => "mknod",
            Self::Socket => "socket",
            Self::Bind => "bind",
            Self::XattrList => "xattr_list",
            Self::XattrGet => "xattr_get",
            Self::XattrSet => "xattr_set",
            Self::AclGet => "acl_get",
            Self::AclSet => "acl_set",
            Self::CapGet => "cap_get",
            Self::CapSet => "cap_set",
            Self::Link => "link",
            Self::Rename => "rename",
            Self::UnlinkSource => "unlink_source",
            Self::UnlinkDest => "unlink_dest",
            Self::IoctlClone => "ioctl_clone",
            Self::Internal => "internal",
            Self::SymlinkTargetTooLong => "symlink_target_too_long",
            Self::SocketDestTooLong => "socket_dest_too_long",
            Self::Unsupported => "unsupported",
            Self::Aborted => "aborted",
            Self::Eof => "eof",
        }
    }

    /// Human-readable description of this code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::NoError => "Success",
            Self::OpenSource => "Opening the source file failed",
            Self::OpenDest => "Opening the destination file failed",
            Self::Read => "Reading the source file failed",
            Self::Write => "Writing the destination file failed",
            Self::Truncate => "Truncating the destination file failed",
            Self::Readlink => "Reading the symbolic link target failed",
            Self::Symlink => "Creating the symbolic link failed",
            Self::Alloc => "Memory allocation failed",
            Self::Stat => "Getting file information failed",
            Self::Mkdir => "Creating the directory failed",
            Self::Mkfifo => "Creating the named pipe failed",
            Self::Mknod => "Creating the device node failed",
            Self::Socket => "Creating the unix socket failed",
            Self::Bind => "Binding the unix socket failed",
            Self::XattrList => "Listing extended attributes failed",
            Self::XattrGet => "Getting an extended attribute failed",
            Self::XattrSet => "Setting an extended attribute failed",
            Self::AclGet => "Getting the access control list failed",
            Self::AclSet => "Setting the access control list failed",
            Self::CapGet => "Getting file capabilities failed",
            Self::CapSet => "Setting file capabilities failed",
            Self::Link => "Creating the hard link failed",
            Self::Rename => "Renaming the file failed",
            Self::UnlinkSource => "Removing the source file failed",
            Self::UnlinkDest => "Removing the destination file failed",
            Self::IoctlClone => "Cloning the file contents failed",
            Self::Internal => "Internal error (this should never happen)",
            Self::SymlinkTargetTooLong => "Symbolic link target is too long",
            Self::SocketDestTooLong => "Socket destination path is too long",
            Self::Unsupported => "Operation unsupported or disabled",
            Self::Aborted => "Operation aborted by callback",
            Self::Eof => "End of file",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Get the message for a raw error code.
///
/// Unknown codes map to a generic message; this never fails.
///
/// # Example
///
/// ```
/// use copyfile::{error_message, ErrorCode};
///
/// assert_eq!(error_message(ErrorCode::Aborted.as_raw()), ErrorCode::Aborted.message());
/// assert_eq!(error_message(9999), "Unknown error");
/// ```
#[must_use]
pub fn error_message(raw: u32) -> &'static str {
    ErrorCode::from_raw(raw).map_or(UNKNOWN_ERROR_MESSAGE, ErrorCode::message)
}

/// Errors that can occur during copy operations.
///
/// Domain errors carry the underlying OS error, which can be inspected
/// with [`Error::os_error`] or [`Error::raw_os_error`].
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A primitive operation failed with an OS error.
    #[error("{code}: {source}")]
    Os {
        /// The failing primitive
        code: ErrorCode,
        /// Underlying error
        source: io::Error,
    },

    /// A protocol-level outcome with no OS cause.
    #[error("{0}")]
    Control(ErrorCode),
}

impl Error {
    pub(crate) fn os(code: ErrorCode, source: io::Error) -> Self {
        Self::Os { code, source }
    }

    pub(crate) fn control(code: ErrorCode) -> Self {
        Self::Control(code)
    }

    pub(crate) fn aborted() -> Self {
        Self::Control(ErrorCode::Aborted)
    }

    /// The code identifying this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Os { code, .. } | Self::Control(code) => *code,
        }
    }

    /// The OS error behind a domain error.
    #[must_use]
    pub fn os_error(&self) -> Option<&io::Error> {
        match self {
            Self::Os { source, .. } => Some(source),
            Self::Control(_) => None,
        }
    }

    /// The raw OS error number behind a domain error, if any.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.os_error().and_then(io::Error::raw_os_error)
    }

    /// Whether a callback aborted the operation.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.code() == ErrorCode::Aborted
    }

    /// Whether the destination ran out of space.
    #[must_use]
    pub fn is_no_space(&self) -> bool {
        self.os_error().is_some_and(is_no_space_error)
    }
}
