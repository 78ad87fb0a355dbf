//! # copyfile
//!
//! Primitive, composable operations for copying a single filesystem entry.
//!
//! ## Core Features
//!
//! - **Every file type**: regular files, symbolic links, directories, named
//!   pipes, device nodes and UNIX domain sockets
//! - **Byte-exact transfer**: partial writes are completed, interrupted calls
//!   retried, preallocated space trimmed
//! - **One callback protocol**: progress, errors and completion are reported
//!   to a single [`Callback`] that can retry or abort
//! - **Exact symlinks**: link targets of any length are copied verbatim
//! - **Metadata**: ownership, permissions, timestamps and extended attributes
//! - **Fallbacks**: hard-link or rename where possible, copy otherwise
//! - **Reflink support**: copy-on-write clones on btrfs/XFS/APFS
//!
//! This crate copies one entry at a time. Walking directory trees is left to
//! the caller, together with any policy about existing destinations.
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use copyfile::CopyBuilder;
//!
//! // Like `cp -a` for a single entry
//! let preserved = CopyBuilder::new("src.txt", "dst.txt").archive().run()?;
//! println!("preserved {preserved}");
//! # Ok::<(), copyfile::Error>(())
//! ```
//!
//! ## Function API
//!
//! ```no_run
//! use copyfile::{copy_file, Action, CopyOptions, ErrorCode, Event, Status};
//! use std::path::Path;
//!
//! let options = CopyOptions::default()
//!     .with_buffer_size(128 * 1024)
//!     .with_fsync();
//!
//! let mut callback = |event: &Event<'_>| match event.status {
//!     // Give up on read errors, otherwise do what would happen anyway
//!     Status::Failed { code: ErrorCode::Read, .. } => Action::Abort,
//!     _ => event.default_action,
//! };
//!
//! copy_file(Path::new("in"), Path::new("out"), None, &options, Some(&mut callback))?;
//! # Ok::<(), copyfile::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Every error carries an [`ErrorCode`] naming the primitive that failed and,
//! for system call failures, the [`std::io::Error`] behind it:
//!
//! ```no_run
//! use copyfile::{copy_file, CopyOptions, ErrorCode};
//! use std::path::Path;
//!
//! match copy_file(Path::new("in"), Path::new("out"), None, &CopyOptions::default(), None) {
//!     Ok(()) => {}
//!     Err(e) if e.code() == ErrorCode::OpenDest => eprintln!("cannot create output: {e}"),
//!     Err(e) => eprintln!("copy failed: {e}"),
//! }
//! ```
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | [`ProgressBarCallback`] driving an indicatif progress bar |
//! | `tracing` | Debug-level events for ignored failures and fallbacks |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] and the type vocabulary |
//! | `reflink` | Copy-on-write cloning with [`clone_file`] and [`clone_stream`] |
//! | `xattr` | Extended attribute copying with [`copy_xattr`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod callback;
mod copy;
mod error;
mod metadata;
mod options;
mod utils;

#[cfg(feature = "progress")]
mod progress;

pub use builder::{CopyBuilder, Operation};
pub use callback::{Action, Callback, Event, FileType, Progress, Status};
pub use copy::{
    SpecialFile, archive_file, clone_file, clone_stream, copy_file, copy_regular, copy_stream,
    copy_symlink, create_special, link_file, move_file,
};
pub use error::{Error, ErrorCode, Result, error_message, is_no_space_error};
pub use metadata::{
    MetadataFlags, MetadataReport, copy_acl, copy_cap, copy_metadata, copy_xattr, set_stat,
};
pub use options::{CopyOptions, DEFAULT_BUFFER_SIZE, DEFAULT_CALLBACK_INTERVAL};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{ProgressBarCallback, create_progress_bar};
