//! Regular file copying.

use crate::callback::Callback;
use crate::error::{Error, ErrorCode, Result};
use crate::options::CopyOptions;
use std::fs::{File, OpenOptions};
use std::path::Path;

use super::stream::copy_stream;
use super::utils::{close_file, preallocate};

/// Mode for newly created regular files, before the umask.
pub(crate) const FILE_MODE: u32 = 0o666;

/// Copy the contents of a regular file to a new file.
///
/// Like `cp`, this reads `source` until end-of-file and writes the data to
/// `dest`. An existing regular file at `dest` is truncated and overwritten;
/// a symlink at `dest` is followed. `dest` must be a full file path, not a
/// directory.
///
/// `expected_size` is the expected length of the source, or 0. When it is
/// non-zero and [`CopyOptions::preallocate`] is set, space is reserved up
/// front and the file is truncated to the copied length afterwards.
///
/// See [`copy_stream`] for the callback protocol.
///
/// # Errors
///
/// - [`ErrorCode::OpenSource`] / [`ErrorCode::OpenDest`] when opening fails
/// - [`ErrorCode::Read`] / [`ErrorCode::Write`] during the transfer
/// - [`ErrorCode::Truncate`] when trimming preallocated space fails
/// - [`ErrorCode::Write`] when syncing or closing the destination fails
/// - [`ErrorCode::Aborted`] when the callback aborts
///
/// The first error wins: a cleanup failure never replaces an earlier one.
/// Both files are closed on every path.
pub fn copy_regular(
    source: &Path,
    dest: &Path,
    expected_size: u64,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<()> {
    let src_file = File::open(source).map_err(|e| Error::os(ErrorCode::OpenSource, e))?;

    // The source is dropped (closed) on this path; the open error is kept.
    let dst_file = create_dest(dest).map_err(|e| Error::os(ErrorCode::OpenDest, e))?;

    let preallocated =
        expected_size > 0 && options.preallocate && preallocate(&dst_file, expected_size);

    let mut offset = 0;
    let mut result = copy_stream(
        &mut &src_file,
        &mut &dst_file,
        Some(&mut offset),
        expected_size,
        options,
        callback,
    );

    // Trim preallocated space beyond what was actually copied
    if preallocated {
        if let Err(e) = dst_file.set_len(offset) {
            if result.is_ok() {
                result = Err(Error::os(ErrorCode::Truncate, e));
            }
        }
    }

    if options.fsync && result.is_ok() {
        if let Err(e) = dst_file.sync_all() {
            result = Err(Error::os(ErrorCode::Write, e));
        }
    }

    let _ = close_file(src_file);
    if let Err(e) = close_file(dst_file) {
        if result.is_ok() {
            result = Err(Error::os(ErrorCode::Write, e));
        }
    }

    result
}

fn create_dest(dest: &Path) -> std::io::Result<File> {
    let mut open = OpenOptions::new();
    open.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        open.mode(FILE_MODE);
    }

    open.open(dest)
}

// =============================================================================
// Tests
// =============================================================================
