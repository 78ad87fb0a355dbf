//! File-type dispatch and the archive composite.

use crate::callback::{Callback, FileType};
use crate::error::{Error, ErrorCode, Result};
use crate::metadata::{MetadataFlags, copy_metadata};
use crate::options::CopyOptions;
use std::fs;
use std::path::Path;

use super::regular::copy_regular;
use super::special::{SpecialFile, create_special};
use super::symlink::copy_symlink;

/// Copy a single filesystem entry to a new location.
///
/// Regular files are copied with their contents, symbolic links are
/// recreated with the same target, and directories, named pipes, device
/// nodes and sockets are created fresh as empty entries of the same type.
/// Metadata is not copied; see [`archive_file`].
///
/// `metadata` is the `symlink_metadata` of `source` if already known. If it
/// came from a link-following `metadata` call instead, the entry a symbolic
/// link points to is copied rather than the link.
///
/// `dest` must be the full path of the new entry, not the directory to put
/// it in.
///
/// # Callback protocol
///
/// Regular files report as described in [`copy_stream`](crate::copy_stream)
/// and symbolic links as described in [`copy_symlink`]. Other entries are
/// created without notifications, failing on the first error.
///
/// # Errors
///
/// - [`ErrorCode::Stat`] when `metadata` is `None` and `source` cannot be
///   inspected
/// - [`ErrorCode::Internal`] for a file type this platform cannot name
/// - any error of the operation the entry is dispatched to
pub fn copy_file(
    source: &Path,
    dest: &Path,
    metadata: Option<&fs::Metadata>,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<()> {
    let owned;
    let metadata = match metadata {
        Some(metadata) => metadata,
        None => {
            owned = fs::symlink_metadata(source).map_err(|e| Error::os(ErrorCode::Stat, e))?;
            &owned
        }
    };

    let Some(file_type) = FileType::from_std(metadata.file_type()) else {
        debug_assert!(false, "unclassified file type for {}", source.display());
        return Err(Error::control(ErrorCode::Internal));
    };

    let special = match file_type {
        FileType::Regular => {
            return copy_regular(source, dest, metadata.len(), options, callback);
        }
        FileType::Symlink => return copy_symlink(source, dest, metadata.len(), callback),
        FileType::Directory => SpecialFile::Directory,
        FileType::Fifo => SpecialFile::Fifo,
        FileType::CharDevice => SpecialFile::CharDevice(device_id(metadata)),
        FileType::BlockDevice => SpecialFile::BlockDevice(device_id(metadata)),
        FileType::UnixSocket => SpecialFile::UnixSocket,
        FileType::Hardlink | FileType::Move => {
            debug_assert!(false, "marker type returned by from_std");
            return Err(Error::control(ErrorCode::Internal));
        }
    };

    create_special(dest, special, None)
}

/// Copy an entry and then its metadata, like `cp -a` without recursion.
///
/// Runs [`copy_file`] and then [`copy_metadata`] with `flags` (empty means
/// [`MetadataFlags::ALL`]). Returns the metadata flags that were applied.
///
/// # Errors
///
/// Any error of [`copy_file`], or the first read-side error recorded by
/// [`copy_metadata`]. Metadata that could not be set is not an error; check
/// the returned flags.
pub fn archive_file(
    source: &Path,
    dest: &Path,
    metadata: Option<&fs::Metadata>,
    flags: MetadataFlags,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<MetadataFlags> {
    let owned;
    let metadata = match metadata {
        Some(metadata) => metadata,
        None => {
            owned = fs::symlink_metadata(source).map_err(|e| Error::os(ErrorCode::Stat, e))?;
            &owned
        }
    };

    copy_file(source, dest, Some(metadata), options, callback)?;
    copy_metadata(source, dest, Some(metadata), flags).into_result()
}

#[cfg(unix)]
fn device_id(metadata: &fs::Metadata) -> u64 {
    use std::os::unix::fs::MetadataExt;
    metadata.rdev()
}

#[cfg(not(unix))]
fn device_id(_metadata: &fs::Metadata) -> u64 {
    0
}

// =============================================================================
// Tests
// =============================================================================
