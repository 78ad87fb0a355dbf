//! Configuration options for copy operations.
//!
//! # Example
//!
//! ```
//! use copyfile::CopyOptions;
//!
//! let options = CopyOptions::default()
//!     .with_buffer_size(64 * 1024)
//!     .with_callback_interval(16)
//!     .with_fsync();
//! assert_eq!(options.buffer_size, 64 * 1024);
//! ```

/// Default size of the chunks read by the stream copier.
pub const DEFAULT_BUFFER_SIZE: usize = 4096;

/// Default number of reads between two progress notifications.
pub const DEFAULT_CALLBACK_INTERVAL: u32 = 64;

/// Options for copy operations.
///
/// Use [`Default::default()`] to get sensible defaults, then customize
/// using the builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `buffer_size` | 4096 | Bytes per read |
/// | `callback_interval` | 64 | Reads between progress callbacks |
/// | `preallocate` | `true` | Reserve space for regular files of known size |
/// | `fsync` | `false` | Sync regular files to disk before closing |
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Size of each read from the source (default: 4096)
    pub buffer_size: usize,

    /// Number of reads between progress notifications (default: 64)
    ///
    /// Lower values let a callback cancel a long copy sooner at the cost
    /// of more callback invocations.
    pub callback_interval: u32,

    /// Whether to preallocate destination space when the size is known
    /// (default: true)
    ///
    /// Only has an effect where the platform supports it. Failures are
    /// ignored, and the file is truncated to the copied length afterwards.
    pub preallocate: bool,

    /// Whether to sync regular files to disk before closing (default: false)
    pub fsync: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            callback_interval: DEFAULT_CALLBACK_INTERVAL,
            preallocate: true,
            fsync: false,
        }
    }
}

impl CopyOptions {
    /// Set the read chunk size
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the number of reads between progress notifications
    ///
    /// Value is clamped to at least 1.
    #[must_use]
    pub fn with_callback_interval(mut self, reads: u32) -> Self {
        self.callback_interval = reads.max(1);
        self
    }

    /// Disable destination preallocation
    #[must_use]
    pub fn without_preallocate(mut self) -> Self {
        self.preallocate = false;
        self
    }

    /// Sync regular files to disk before closing them
    #[must_use]
    pub fn with_fsync(mut self) -> Self {
        self.fsync = true;
        self
    }
}
