//! Progress and error reporting protocol.
//!
//! Every copy operation reports to an optional [`Callback`]:
//!
//! - once at the start, with [`Status::Running`],
//! - periodically during long transfers, with [`Status::Running`],
//! - on every error (including retryable ones), with [`Status::Failed`],
//! - once at normal completion, with [`Status::Eof`].
//!
//! The callback answers with an [`Action`]. For progress and completion
//! notifications, [`Action::Abort`] stops the operation with
//! [`ErrorCode::Aborted`](crate::ErrorCode::Aborted). For error
//! notifications, [`Action::Abort`] fails with the reported error and any
//! other answer retries the failed primitive.
//!
//! Each [`Event`] carries the [`Action`] the operation would take if no
//! callback were installed, so a callback can defer to the default policy
//! by returning [`Event::default_action`].
//!
//! # Example
//!
//! ```no_run
//! use copyfile::{copy_file, Action, CopyOptions, Event, Progress, Status};
//! use std::path::Path;
//!
//! let mut report = |event: &Event<'_>| {
//!     if let (Status::Running, Progress::Data { offset, size }) = (&event.status, &event.progress) {
//!         eprintln!("{offset}/{size}");
//!     }
//!     event.default_action
//! };
//!
//! copy_file(
//!     Path::new("in.bin"),
//!     Path::new("out.bin"),
//!     None,
//!     &CopyOptions::default(),
//!     Some(&mut report),
//! )?;
//! # Ok::<(), copyfile::Error>(())
//! ```

use crate::error::ErrorCode;
use std::fs;
use std::io;
use std::path::Path;

/// Kind of filesystem entry an operation is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum FileType {
    /// Regular file
    Regular,
    /// Symbolic link
    Symlink,
    /// Named pipe
    Fifo,
    /// Character device
    CharDevice,
    /// Block device
    BlockDevice,
    /// UNIX domain socket
    UnixSocket,
    /// Directory
    Directory,
    /// A hard link is being created; the real type was not inspected.
    Hardlink,
    /// A rename is being performed; the real type was not inspected.
    Move,
}

impl FileType {
    /// Classify a file type as reported by `symlink_metadata`.
    ///
    /// Returns `None` for types this platform cannot name.
    #[must_use]
    pub fn from_std(file_type: fs::FileType) -> Option<Self> {
        if file_type.is_file() {
            return Some(Self::Regular);
        }
        if file_type.is_symlink() {
            return Some(Self::Symlink);
        }
        if file_type.is_dir() {
            return Some(Self::Directory);
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::FileTypeExt;
            if file_type.is_fifo() {
                return Some(Self::Fifo);
            }
            if file_type.is_char_device() {
                return Some(Self::CharDevice);
            }
            if file_type.is_block_device() {
                return Some(Self::BlockDevice);
            }
            if file_type.is_socket() {
                return Some(Self::UnixSocket);
            }
        }

        None
    }

    /// Short lowercase name, e.g. `"regular"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Symlink => "symlink",
            Self::Fifo => "fifo",
            Self::CharDevice => "char_device",
            Self::BlockDevice => "block_device",
            Self::UnixSocket => "unix_socket",
            Self::Directory => "directory",
            Self::Hardlink => "hardlink",
            Self::Move => "move",
        }
    }
}

/// Detailed progress information.
///
/// The variant identifies both the file type and, for symbolic links, the
/// phase: the target length is known before completion, the target itself
/// only at [`Status::Eof`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress<'a> {
    /// Regular file or stream content.
    Data {
        /// Bytes written so far, counted from the caller's starting offset.
        offset: u64,
        /// Expected size hint; 0 when unknown. Not updated at EOF, so it
        /// may be smaller than `offset`.
        size: u64,
    },
    /// Symbolic link before completion: the expected target length (0 when unknown).
    SymlinkLength(u64),
    /// Symbolic link at completion: the copied target.
    SymlinkTarget(&'a Path),
    /// Named pipe.
    Fifo,
    /// Character device with its device id.
    CharDevice(u64),
    /// Block device with its device id.
    BlockDevice(u64),
    /// UNIX domain socket.
    UnixSocket,
    /// Directory.
    Directory,
    /// Hard link to the given target.
    Hardlink(&'a Path),
    /// Move from the given source.
    Move(&'a Path),
}

impl Progress<'_> {
    /// The file type this progress information describes.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        match self {
            Self::Data { .. } => FileType::Regular,
            Self::SymlinkLength(_) | Self::SymlinkTarget(_) => FileType::Symlink,
            Self::Fifo => FileType::Fifo,
            Self::CharDevice(_) => FileType::CharDevice,
            Self::BlockDevice(_) => FileType::BlockDevice,
            Self::UnixSocket => FileType::UnixSocket,
            Self::Directory => FileType::Directory,
            Self::Hardlink(_) => FileType::Hardlink,
            Self::Move(_) => FileType::Move,
        }
    }
}

/// State of the operation when the callback is invoked.
#[derive(Debug, Clone, Copy)]
pub enum Status<'a> {
    /// Start of the operation or periodic progress.
    Running,
    /// The operation completed.
    Eof,
    /// A primitive failed.
    Failed {
        /// The failing primitive
        code: ErrorCode,
        /// The OS error it failed with
        error: &'a io::Error,
    },
}

impl Status<'_> {
    /// The [`ErrorCode`] equivalent of this status.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Running => ErrorCode::NoError,
            Self::Eof => ErrorCode::Eof,
            Self::Failed { code, .. } => *code,
        }
    }
}

/// What the callback wants the operation to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Carry on. After an error this retries the failed primitive.
    Continue,
    /// Retry the failed primitive. Same as `Continue` for progress.
    Retry,
    /// Stop the operation.
    Abort,
}

/// A single callback notification.
#[derive(Debug, Clone, Copy)]
pub struct Event<'a> {
    /// Current state
    pub status: Status<'a>,
    /// Type-specific progress information
    pub progress: Progress<'a>,
    /// What would happen if no callback were installed
    pub default_action: Action,
}

impl Event<'_> {
    /// The file type being processed.
    #[must_use]
    pub fn file_type(&self) -> FileType {
        self.progress.file_type()
    }
}

/// Receiver of progress and error notifications.
///
/// Implemented for every `FnMut(&Event<'_>) -> Action` closure.
pub trait Callback {
    /// Handle a notification and decide how to proceed.
    fn call(&mut self, event: &Event<'_>) -> Action;
}

impl<F> Callback for F
where
    F: FnMut(&Event<'_>) -> Action,
{
    fn call(&mut self, event: &Event<'_>) -> Action {
        self(event)
    }
}

/// Wraps the optional callback of a single operation.
pub(crate) struct Notifier<'a> {
    callback: Option<&'a mut dyn Callback>,
}

impl<'a> Notifier<'a> {
    pub(crate) fn new(callback: Option<&'a mut dyn Callback>) -> Self {
        Self { callback }
    }

    /// Hand the callback to a nested operation for the duration of the borrow.
    pub(crate) fn reborrow(&mut self) -> Option<&mut dyn Callback> {
        let callback: &mut dyn Callback = self.callback.as_deref_mut()?;
        Some(callback)
    }

    /// Report progress or completion; `true` means the callback asked to abort.
    pub(crate) fn progress(&mut self, status: Status<'_>, progress: Progress<'_>) -> bool {
        let Some(callback) = &mut self.callback else {
            return false;
        };
        let event = Event {
            status,
            progress,
            default_action: Action::Continue,
        };
        callback.call(&event) == Action::Abort
    }

    /// Report a failure and decide whether to retry.
    ///
    /// Without a callback, `default_action` decides.
    pub(crate) fn should_retry(
        &mut self,
        code: ErrorCode,
        error: &io::Error,
        progress: Progress<'_>,
        default_action: Action,
    ) -> bool {
        let action = match &mut self.callback {
            Some(callback) => callback.call(&Event {
                status: Status::Failed { code, error },
                progress,
                default_action,
            }),
            None => default_action,
        };
        action != Action::Abort
    }
}

/// Default action for an I/O failure in the stream copier: retry only
/// interrupted calls.
pub(crate) fn retry_if_interrupted(error: &io::Error) -> Action {
    if error.kind() == io::ErrorKind::Interrupted {
        Action::Retry
    } else {
        Action::Abort
    }
}
