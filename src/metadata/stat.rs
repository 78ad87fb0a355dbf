//! Inode metadata: ownership, permissions and timestamps.

use super::MetadataFlags;
use filetime::{FileTime, set_symlink_file_times};
use std::fs;
use std::io;
use std::path::Path;

/// Apply inode metadata from `metadata` to `path`.
///
/// `metadata` must describe a file of the same type as `path`, usually the
/// `symlink_metadata` of the entry `path` was copied from. Symbolic links
/// are never followed: ownership and timestamps apply to the link itself and
/// the mode of a link is left alone.
///
/// `flags` selects what to apply; only [`MetadataFlags::STAT`] bits are
/// considered and an empty set means all of them. A timestamp that is not
/// requested keeps the current value of `path`.
///
/// Returns the flags that were applied successfully. Failures are not
/// reported otherwise: changing ownership usually requires privileges, and
/// callers decide which missing flags matter.
pub fn set_stat(path: &Path, metadata: &fs::Metadata, flags: MetadataFlags) -> MetadataFlags {
    let flags = flags.or_default(MetadataFlags::STAT) & MetadataFlags::STAT;
    let mut applied = MetadataFlags::EMPTY;

    // Ownership first: chown may clear set-id bits that the mode restores.
    if flags.intersects(MetadataFlags::OWNER) {
        applied |= set_owner(path, metadata, flags & MetadataFlags::OWNER);
    }

    if flags.contains(MetadataFlags::MODE) && !metadata.file_type().is_symlink() {
        match set_mode(path, metadata) {
            Ok(()) => applied |= MetadataFlags::MODE,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path.display(), error = %_e, "setting mode failed");
            }
        }
    }

    if flags.intersects(MetadataFlags::TIMES) {
        let times = flags & MetadataFlags::TIMES;
        match set_times(path, metadata, times) {
            Ok(()) => applied |= times,
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(path = %path.display(), error = %_e, "setting timestamps failed");
            }
        }
    }

    applied
}

#[cfg(unix)]
fn set_owner(path: &Path, metadata: &fs::Metadata, flags: MetadataFlags) -> MetadataFlags {
    use std::os::unix::fs::{MetadataExt, lchown};

    let uid = flags.contains(MetadataFlags::USER).then(|| metadata.uid());
    let gid = flags.contains(MetadataFlags::GROUP).then(|| metadata.gid());

    if lchown(path, uid, gid).is_ok() {
        return flags;
    }
    if uid.is_none() || gid.is_none() {
        return MetadataFlags::EMPTY;
    }

    // Unprivileged users may still change the group to one they belong to.
    let mut applied = MetadataFlags::EMPTY;
    if lchown(path, uid, None).is_ok() {
        applied |= MetadataFlags::USER;
    }
    if lchown(path, None, gid).is_ok() {
        applied |= MetadataFlags::GROUP;
    }
    applied
}

#[cfg(not(unix))]
fn set_owner(_path: &Path, _metadata: &fs::Metadata, _flags: MetadataFlags) -> MetadataFlags {
    MetadataFlags::EMPTY
}

#[cfg(unix)]
fn set_mode(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode() & 0o7777;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    fs::set_permissions(path, metadata.permissions())
}

fn set_times(path: &Path, metadata: &fs::Metadata, times: MetadataFlags) -> io::Result<()> {
    let mut atime = FileTime::from_last_access_time(metadata);
    let mut mtime = FileTime::from_last_modification_time(metadata);

    if !times.contains(MetadataFlags::TIMES) {
        let current = fs::symlink_metadata(path)?;
        if !times.contains(MetadataFlags::ATIME) {
            atime = FileTime::from_last_access_time(&current);
        }
        if !times.contains(MetadataFlags::MTIME) {
            mtime = FileTime::from_last_modification_time(&current);
        }
    }

    set_symlink_file_times(path, atime, mtime)
}
