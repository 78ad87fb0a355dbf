//! Hard-link and rename with a copying fallback.
//!
//! Linking and renaming are cheap but only work within one filesystem.
//! When the kernel refuses, the entry is archived instead so the caller
//! always ends up with an equivalent file at the destination.

use crate::callback::{Action, Callback, Notifier, Progress, Status};
use crate::error::{Error, ErrorCode, Result};
use crate::metadata::MetadataFlags;
use crate::options::CopyOptions;
use std::fs;
use std::io;
use std::path::Path;

use super::file::archive_file;

/// Hard-link `source` to `dest`, archiving it instead where linking fails.
///
/// Use this when a copy is needed at `dest` that will not be written to.
/// `source` should not be a directory and `dest` must not exist.
///
/// Returns the metadata flags that were preserved: all of them for a hard
/// link, or what [`archive_file`] managed after a fallback.
///
/// # Callback protocol
///
/// - [`Status::Running`] with [`Progress::Hardlink`] before linking.
/// - [`Status::Failed`] with [`ErrorCode::Link`] when linking fails. The
///   default action retries interrupted calls and cross-device or permission
///   errors, and aborts otherwise. Retrying after a cross-device or
///   permission error falls back to [`archive_file`], which reports through
///   the same callback with its own file type.
/// - [`Status::Eof`] with [`Progress::Hardlink`] after a successful link.
///   A fallback reports its own completion instead, so `Eof` arrives once.
///
/// # Errors
///
/// - [`ErrorCode::Link`] when linking fails and no fallback is taken
/// - any error of [`archive_file`] after a fallback
/// - [`ErrorCode::Aborted`] when the callback aborts a progress notification
pub fn link_file(
    source: &Path,
    dest: &Path,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<MetadataFlags> {
    let mut notifier = Notifier::new(callback);
    let progress = Progress::Hardlink(source);

    if notifier.progress(Status::Running, progress) {
        return Err(Error::aborted());
    }

    loop {
        let Err(e) = fs::hard_link(source, dest) else {
            break;
        };

        let fallback = is_cross_device(&e) || is_not_permitted(&e);
        let default_action = if fallback || e.kind() == io::ErrorKind::Interrupted {
            Action::Retry
        } else {
            Action::Abort
        };
        if !notifier.should_retry(ErrorCode::Link, &e, progress, default_action) {
            return Err(Error::os(ErrorCode::Link, e));
        }

        if fallback {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                source = %source.display(),
                dest = %dest.display(),
                error = %e,
                "hard link failed, copying instead"
            );
            return archive_file(
                source,
                dest,
                None,
                MetadataFlags::ALL,
                options,
                notifier.reborrow(),
            );
        }
    }

    if notifier.progress(Status::Eof, progress) {
        return Err(Error::aborted());
    }
    Ok(MetadataFlags::ALL)
}

/// Rename `source` to `dest`, archiving and removing it where renaming fails.
///
/// `source` should not be a directory. An existing `dest` is replaced.
///
/// Returns the metadata flags that were preserved: all of them for a
/// rename, or what [`archive_file`] managed after a fallback.
///
/// # Callback protocol
///
/// Same as [`link_file`], with [`Progress::Move`] and
/// [`ErrorCode::Rename`]. Only a cross-device error falls back to copying;
/// before copying, an existing `dest` is removed. `source` is removed only
/// once the copy succeeded.
///
/// # Errors
///
/// - [`ErrorCode::Rename`] when renaming fails and no fallback is taken
/// - [`ErrorCode::UnlinkDest`] when an existing destination cannot be removed
/// - any error of [`archive_file`] after a fallback
/// - [`ErrorCode::UnlinkSource`] when the source cannot be removed after the
///   copy; the copy is left in place
/// - [`ErrorCode::Aborted`] when the callback aborts a progress notification
pub fn move_file(
    source: &Path,
    dest: &Path,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<MetadataFlags> {
    let mut notifier = Notifier::new(callback);
    let progress = Progress::Move(source);

    if notifier.progress(Status::Running, progress) {
        return Err(Error::aborted());
    }

    loop {
        let Err(e) = fs::rename(source, dest) else {
            break;
        };

        let fallback = is_cross_device(&e);
        let default_action = if fallback || e.kind() == io::ErrorKind::Interrupted {
            Action::Retry
        } else {
            Action::Abort
        };
        if !notifier.should_retry(ErrorCode::Rename, &e, progress, default_action) {
            return Err(Error::os(ErrorCode::Rename, e));
        }

        if fallback {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                source = %source.display(),
                dest = %dest.display(),
                error = %e,
                "rename failed, copying instead"
            );
            return move_by_copy(source, dest, options, notifier.reborrow());
        }
    }

    if notifier.progress(Status::Eof, progress) {
        return Err(Error::aborted());
    }
    Ok(MetadataFlags::ALL)
}

fn move_by_copy(
    source: &Path,
    dest: &Path,
    options: &CopyOptions,
    callback: Option<&mut dyn Callback>,
) -> Result<MetadataFlags> {
    match fs::symlink_metadata(dest) {
        Ok(existing) => {
            remove_entry(dest, &existing).map_err(|e| Error::os(ErrorCode::UnlinkDest, e))?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(Error::os(ErrorCode::UnlinkDest, e)),
    }

    let metadata = fs::symlink_metadata(source).map_err(|e| Error::os(ErrorCode::Stat, e))?;
    let applied = archive_file(
        source,
        dest,
        Some(&metadata),
        MetadataFlags::ALL,
        options,
        callback,
    )?;

    remove_entry(source, &metadata).map_err(|e| Error::os(ErrorCode::UnlinkSource, e))?;
    Ok(applied)
}

/// Remove a non-directory, or an empty directory.
fn remove_entry(path: &Path, metadata: &fs::Metadata) -> io::Result<()> {
    if metadata.is_dir() {
        fs::remove_dir(path)
    } else {
        fs::remove_file(path)
    }
}

fn is_cross_device(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::CrossesDevices
}

#[cfg(unix)]
fn is_not_permitted(error: &io::Error) -> bool {
    error.raw_os_error() == Some(libc::EPERM)
}

#[cfg(not(unix))]
fn is_not_permitted(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::PermissionDenied
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{Event, FileType};
    use tempfile::tempdir;

    #[test]
    fn test_link_file_same_filesystem() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "shared").unwrap();

        let applied = link_file(&src, &dst, &CopyOptions::default(), None).unwrap();

        assert_eq!(applied, MetadataFlags::ALL);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "shared");

        #[cfg(unix)]
        {
            use std::os::unix::fs::MetadataExt;
            assert_eq!(fs::metadata(&src).unwrap().nlink(), 2);
        }
    }

    #[test]
    fn test_link_file_reports_hardlink_events() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "shared").unwrap();

        let mut seen = Vec::new();
        let mut callback = |event: &Event<'_>| {
            seen.push((event.status.code(), event.file_type()));
            Action::Continue
        };
        link_file(&src, &dst, &CopyOptions::default(), Some(&mut callback)).unwrap();

        assert_eq!(
            seen,
            vec![
                (ErrorCode::NoError, FileType::Hardlink),
                (ErrorCode::Eof, FileType::Hardlink),
            ]
        );
    }

    #[test]
    fn test_link_file_existing_dest_fails() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();

        let mut defaults = Vec::new();
        let mut callback = |event: &Event<'_>| {
            if let Status::Failed { code, .. } = event.status {
                defaults.push((code, event.default_action));
            }
            event.default_action
        };
        let err = link_file(&src, &dst, &CopyOptions::default(), Some(&mut callback))
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Link);
        assert_eq!(defaults, vec![(ErrorCode::Link, Action::Abort)]);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "old");
    }

    #[test]
    fn test_link_file_abort_at_start() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "x").unwrap();

        let mut callback = |_: &Event<'_>| Action::Abort;
        let err = link_file(&src, &dst, &CopyOptions::default(), Some(&mut callback))
            .unwrap_err();

        assert!(err.is_aborted());
        assert!(!dst.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_link_file_falls_back_across_devices() {
        // /dev/shm is a separate tmpfs on most Linux systems.
        let Ok(other) = tempfile::tempdir_in("/dev/shm") else {
            return;
        };
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = other.path().join("dst.txt");
        fs::write(&src, "across").unwrap();

        use std::os::unix::fs::MetadataExt;
        if fs::metadata(dir.path()).unwrap().dev() == fs::metadata(other.path()).unwrap().dev() {
            return;
        }

        let mut seen = Vec::new();
        let mut callback = |event: &Event<'_>| {
            seen.push((event.status.code(), event.file_type()));
            event.default_action
        };
        let applied = link_file(&src, &dst, &CopyOptions::default(), Some(&mut callback)).unwrap();

        assert!(applied.contains(MetadataFlags::MODE | MetadataFlags::TIMES));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "across");
        assert_eq!(seen.first(), Some(&(ErrorCode::NoError, FileType::Hardlink)));
        assert_eq!(seen.get(1), Some(&(ErrorCode::Link, FileType::Hardlink)));
        assert_eq!(seen.last(), Some(&(ErrorCode::Eof, FileType::Regular)));
        assert_eq!(
            seen.iter().filter(|(code, _)| *code == ErrorCode::Eof).count(),
            1
        );
    }

    #[test]
    fn test_move_file_same_filesystem() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "moving").unwrap();
        fs::write(&dst, "replaced").unwrap();

        let applied = move_file(&src, &dst, &CopyOptions::default(), None).unwrap();

        assert_eq!(applied, MetadataFlags::ALL);
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "moving");
    }

    #[test]
    fn test_move_file_missing_source() {
        let dir = tempdir().unwrap();
        let err = move_file(
            &dir.path().join("missing"),
            &dir.path().join("dst"),
            &CopyOptions::default(),
            None,
        )
        .unwrap_err();

        assert_eq!(err.code(), ErrorCode::Rename);
        assert_eq!(
            err.os_error().map(io::Error::kind),
            Some(io::ErrorKind::NotFound)
        );
    }

    #[test]
    fn test_move_file_reports_move_events() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = dir.path().join("dst.txt");
        fs::write(&src, "x").unwrap();

        let mut seen = Vec::new();
        let mut callback = |event: &Event<'_>| {
            if let Progress::Move(from) = event.progress {
                seen.push((event.status.code(), from.to_path_buf()));
            }
            Action::Continue
        };
        move_file(&src, &dst, &CopyOptions::default(), Some(&mut callback)).unwrap();

        assert_eq!(
            seen,
            vec![(ErrorCode::NoError, src.clone()), (ErrorCode::Eof, src.clone())]
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_move_file_falls_back_across_devices() {
        let Ok(other) = tempfile::tempdir_in("/dev/shm") else {
            return;
        };
        let dir = tempdir().unwrap();
        let src = dir.path().join("src.txt");
        let dst = other.path().join("dst.txt");
        fs::write(&src, "across").unwrap();
        fs::write(&dst, "old").unwrap();

        use std::os::unix::fs::MetadataExt;
        if fs::metadata(dir.path()).unwrap().dev() == fs::metadata(other.path()).unwrap().dev() {
            return;
        }

        move_file(&src, &dst, &CopyOptions::default(), None).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dst).unwrap(), "across");
    }

    #[test]
    fn test_remove_entry_handles_dirs_and_files() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        let file = dir.path().join("file");
        fs::create_dir(&sub).unwrap();
        fs::write(&file, "x").unwrap();

        remove_entry(&sub, &fs::symlink_metadata(&sub).unwrap()).unwrap();
        remove_entry(&file, &fs::symlink_metadata(&file).unwrap()).unwrap();

        assert!(!sub.exists());
        assert!(!file.exists());
    }
}
