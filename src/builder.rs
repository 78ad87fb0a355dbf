//! Builder API for ergonomic copying operations.
//!
//! The builder pattern provides a fluent interface for choosing an operation
//! and configuring it. This is often more convenient than calling the
//! function API with a hand-built [`CopyOptions`].
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use copyfile::CopyBuilder;
//!
//! // Plain content copy
//! CopyBuilder::new("notes.txt", "notes.bak").run()?;
//! # Ok::<(), copyfile::Error>(())
//! ```
//!
//! ## Preserving Metadata
//!
//! ```no_run
//! use copyfile::{CopyBuilder, MetadataFlags};
//!
//! let applied = CopyBuilder::new("data.bin", "backup/data.bin")
//!     .preserve(MetadataFlags::MODE | MetadataFlags::TIMES)
//!     .fsync()
//!     .run()?;
//!
//! if !applied.contains(MetadataFlags::TIMES) {
//!     eprintln!("timestamps were not preserved");
//! }
//! # Ok::<(), copyfile::Error>(())
//! ```
//!
//! ## Moving Across Filesystems
//!
//! ```no_run
//! use copyfile::CopyBuilder;
//!
//! // Renames when possible, copies and removes the source otherwise
//! CopyBuilder::new("/tmp/upload", "/srv/data/upload").rename().run()?;
//! # Ok::<(), copyfile::Error>(())
//! ```

use crate::callback::{Action, Callback, Event, Status};
use crate::copy::{archive_file, copy_file, link_file, move_file};
use crate::error::{Error, Result};
use crate::metadata::MetadataFlags;
use crate::options::CopyOptions;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Operation performed by [`CopyBuilder::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Operation {
    /// Copy the entry without metadata ([`copy_file`])
    #[default]
    Copy,
    /// Copy the entry and its metadata ([`archive_file`])
    Archive,
    /// Hard-link, archiving where that fails ([`link_file`])
    Link,
    /// Rename, archiving and removing the source where that fails ([`move_file`])
    Move,
}

impl Operation {
    /// Lowercase name, e.g. `"archive"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Copy => "copy",
            Self::Archive => "archive",
            Self::Link => "link",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A builder for configuring and executing a single-entry operation.
///
/// # Example
///
/// ```no_run
/// use copyfile::CopyBuilder;
///
/// let applied = CopyBuilder::new("/data/report.pdf", "/backup/report.pdf")
///     .archive()
///     .buffer_size(64 * 1024)
///     .run()?;
/// println!("preserved: {applied}");
/// # Ok::<(), copyfile::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct CopyBuilder {
    src: PathBuf,
    dst: PathBuf,
    operation: Operation,
    flags: MetadataFlags,
    options: CopyOptions,
    cancel_token: Option<Arc<AtomicBool>>,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` with the given source and destination paths.
    ///
    /// Defaults to a plain [`Operation::Copy`] with default options.
    /// `dst` is the full path of the new entry, not a directory to put it in.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(src: P, dst: Q) -> Self {
        Self {
            src: src.as_ref().to_path_buf(),
            dst: dst.as_ref().to_path_buf(),
            operation: Operation::Copy,
            flags: MetadataFlags::ALL,
            options: CopyOptions::default(),
            cancel_token: None,
        }
    }

    /// Select the operation explicitly.
    #[must_use]
    pub fn operation(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    /// Copy the entry together with all of its metadata.
    #[must_use]
    pub fn archive(self) -> Self {
        self.operation(Operation::Archive)
    }

    /// Copy the entry together with the selected metadata.
    ///
    /// An empty set means all metadata.
    #[must_use]
    pub fn preserve(mut self, flags: MetadataFlags) -> Self {
        self.flags = flags;
        self.operation(Operation::Archive)
    }

    /// Hard-link instead of copying where possible.
    #[must_use]
    pub fn hard_link(self) -> Self {
        self.operation(Operation::Link)
    }

    /// Move the entry: rename where possible, copy and remove otherwise.
    #[must_use]
    pub fn rename(self) -> Self {
        self.operation(Operation::Move)
    }

    /// Set the size of each read.
    #[must_use]
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.options = self.options.with_buffer_size(size);
        self
    }

    /// Set the number of reads between progress notifications.
    #[must_use]
    pub fn callback_interval(mut self, reads: u32) -> Self {
        self.options = self.options.with_callback_interval(reads);
        self
    }

    /// Do not preallocate destination space.
    #[must_use]
    pub fn no_preallocate(mut self) -> Self {
        self.options = self.options.without_preallocate();
        self
    }

    /// Sync copied file contents to disk before closing.
    #[must_use]
    pub fn fsync(mut self) -> Self {
        self.options = self.options.with_fsync();
        self
    }

    /// Set a cancellation token.
    ///
    /// Once the token is set, the next progress notification aborts the
    /// operation with [`ErrorCode::Aborted`](crate::ErrorCode::Aborted).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use copyfile::CopyBuilder;
    /// use std::sync::Arc;
    /// use std::sync::atomic::AtomicBool;
    ///
    /// let cancel = Arc::new(AtomicBool::new(false));
    /// // Pass a clone to a signal handler or another thread
    /// let result = CopyBuilder::new("big.iso", "copy.iso")
    ///     .cancel_token(cancel)
    ///     .run();
    /// ```
    #[must_use]
    pub fn cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// The operation [`run`](Self::run) will perform.
    pub fn selected_operation(&self) -> Operation {
        self.operation
    }

    /// Execute the operation without a callback.
    ///
    /// Returns the metadata flags that were preserved; always empty for
    /// [`Operation::Copy`].
    ///
    /// # Errors
    ///
    /// Any error of the selected operation.
    pub fn run(self) -> Result<MetadataFlags> {
        self.execute(None)
    }

    /// Execute the operation, reporting to `callback`.
    ///
    /// # Errors
    ///
    /// Any error of the selected operation.
    pub fn run_with(self, callback: &mut dyn Callback) -> Result<MetadataFlags> {
        self.execute(Some(callback))
    }

    fn execute(self, callback: Option<&mut dyn Callback>) -> Result<MetadataFlags> {
        match self.cancel_token.as_deref() {
            Some(token) => {
                let mut guarded = Cancellable {
                    token,
                    callback,
                    tripped: false,
                };
                let result = self.dispatch(Some(&mut guarded));
                match result {
                    // The failure is what cancellation left behind.
                    Err(_) if guarded.tripped => Err(Error::aborted()),
                    result => result,
                }
            }
            None => self.dispatch(callback),
        }
    }

    fn dispatch(&self, callback: Option<&mut dyn Callback>) -> Result<MetadataFlags> {
        let (src, dst, options) = (&self.src, &self.dst, &self.options);
        match self.operation {
            Operation::Copy => {
                copy_file(src, dst, None, options, callback)?;
                Ok(MetadataFlags::EMPTY)
            }
            Operation::Archive => archive_file(src, dst, None, self.flags, options, callback),
            Operation::Link => link_file(src, dst, options, callback),
            Operation::Move => move_file(src, dst, options, callback),
        }
    }
}

/// Aborts at the first notification after the token is set.
///
/// Aborting an error notification makes the operation return that error;
/// `tripped` remembers it so the caller can report the cancellation instead.
struct Cancellable<'t, 'c> {
    token: &'t AtomicBool,
    callback: Option<&'c mut dyn Callback>,
    tripped: bool,
}

impl Callback for Cancellable<'_, '_> {
    fn call(&mut self, event: &Event<'_>) -> Action {
        if self.token.load(Ordering::Relaxed) {
            if matches!(event.status, Status::Failed { .. }) {
                self.tripped = true;
            }
            return Action::Abort;
        }
        match &mut self.callback {
            Some(callback) => callback.call(event),
            None if matches!(event.status, Status::Failed { .. }) => event.default_action,
            None => Action::Continue,
        }
    }
}
