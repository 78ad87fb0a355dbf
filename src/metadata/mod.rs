//! Metadata copying.
//!
//! Content copies produced by [`copy_file`](crate::copy_file) carry default
//! ownership, permissions and timestamps. This module transfers the rest:
//! inode metadata via [`set_stat`], extended attributes via [`copy_xattr`],
//! or everything at once via [`copy_metadata`].
//!
//! Access control lists and file capabilities are not supported by this
//! build: [`copy_acl`] and [`copy_cap`] report
//! [`ErrorCode::Unsupported`], so [`MetadataFlags::ACL`] and
//! [`MetadataFlags::CAP`] are accepted but never reported as applied.

mod acl;
mod flags;
mod stat;
mod xattr;

pub use acl::{copy_acl, copy_cap};
pub use flags::MetadataFlags;
pub use stat::set_stat;
pub use xattr::copy_xattr;

use crate::error::{Error, ErrorCode, Result};
use std::fs;
use std::path::Path;

/// Outcome of [`copy_metadata`].
///
/// Metadata copying is best-effort: every requested part is attempted even
/// after a failure. `applied` tells which parts made it, `error` holds the
/// first failure to *read* metadata from the source. Failures to set
/// metadata on the destination only show up as missing flags.
#[derive(Debug, Default)]
#[must_use]
pub struct MetadataReport {
    /// Flags applied successfully
    pub applied: MetadataFlags,
    /// First read-side error, if any
    pub error: Option<Error>,
}

impl MetadataReport {
    /// `applied`, or the recorded error.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataReport::error`] when one was recorded.
    pub fn into_result(self) -> Result<MetadataFlags> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.applied),
        }
    }

    fn record(&mut self, error: Error) {
        self.error.get_or_insert(error);
    }
}

/// Copy metadata of `source` onto `dest`.
///
/// `metadata` is the `symlink_metadata` of `source` if already known. An
/// empty `flags` set means [`MetadataFlags::ALL`].
///
/// If `source` cannot be inspected the report holds an
/// [`ErrorCode::Stat`] error and nothing is applied.
///
/// # Example
///
/// ```no_run
/// use copyfile::{copy_metadata, MetadataFlags};
/// use std::path::Path;
///
/// let report = copy_metadata(Path::new("a"), Path::new("b"), None, MetadataFlags::TIMES);
/// if !report.applied.contains(MetadataFlags::TIMES) {
///     eprintln!("timestamps were not preserved");
/// }
/// ```
pub fn copy_metadata(
    source: &Path,
    dest: &Path,
    metadata: Option<&fs::Metadata>,
    flags: MetadataFlags,
) -> MetadataReport {
    let flags = flags.or_default(MetadataFlags::ALL);
    let mut report = MetadataReport::default();

    let owned;
    let metadata = match metadata {
        Some(metadata) => metadata,
        None => match fs::symlink_metadata(source) {
            Ok(metadata) => {
                owned = metadata;
                &owned
            }
            Err(e) => {
                report.record(Error::os(ErrorCode::Stat, e));
                return report;
            }
        },
    };

    // Extended attributes first: some filesystems refuse changes once the
    // mode makes the file read-only.
    if flags.contains(MetadataFlags::XATTR) {
        match copy_xattr(source, dest) {
            Ok(()) => report.applied |= MetadataFlags::XATTR,
            Err(e) if matches!(e.code(), ErrorCode::XattrList | ErrorCode::XattrGet) => {
                report.record(e);
            }
            Err(_) => {}
        }
    }

    if flags.contains(MetadataFlags::ACL) {
        let result = copy_acl(source, dest);
        apply(&mut report, MetadataFlags::ACL, ErrorCode::AclGet, result);
    }
    if flags.contains(MetadataFlags::CAP) {
        let result = copy_cap(source, dest);
        apply(&mut report, MetadataFlags::CAP, ErrorCode::CapGet, result);
    }

    if flags.intersects(MetadataFlags::STAT) {
        report.applied |= set_stat(dest, metadata, flags & MetadataFlags::STAT);
    }

    report
}

/// Fold the result of one ACL or capability copy into `report`.
///
/// Only a failure to read the source (`read_code`) is recorded; unsupported
/// and set-side failures leave the flag unset.
fn apply(
    report: &mut MetadataReport,
    flag: MetadataFlags,
    read_code: ErrorCode,
    result: Result<()>,
) {
    match result {
        Ok(()) => report.applied |= flag,
        Err(e) if e.code() == read_code => report.record(e),
        Err(_) => {}
    }
}
