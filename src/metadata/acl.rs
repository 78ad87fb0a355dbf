//! Access control lists and file capabilities.
//!
//! Neither is available in this build. Both entry points exist so callers
//! can ask, and [`copy_metadata`](super::copy_metadata) routes the
//! [`MetadataFlags::ACL`](super::MetadataFlags::ACL) and
//! [`MetadataFlags::CAP`](super::MetadataFlags::CAP) requests through them.

use crate::error::{Error, ErrorCode, Result};
use std::path::Path;

/// Copy the access control list of `source` onto `dest`.
///
/// A source without ACL support has nothing to copy, which is success.
///
/// # Errors
///
/// - [`ErrorCode::AclGet`] when reading the source ACL fails
/// - [`ErrorCode::AclSet`] when writing the destination ACL fails
/// - [`ErrorCode::Unsupported`] when built without ACL support, which is
///   always the case for now
pub fn copy_acl(_source: &Path, _dest: &Path) -> Result<()> {
    Err(Error::control(ErrorCode::Unsupported))
}

/// Copy the file capabilities of `source` onto `dest`.
///
/// A source without capability support has nothing to copy, which is
/// success.
///
/// # Errors
///
/// - [`ErrorCode::CapGet`] when reading the source capabilities fails
/// - [`ErrorCode::CapSet`] when writing the destination capabilities fails
/// - [`ErrorCode::Unsupported`] when built without capability support,
///   which is always the case for now
pub fn copy_cap(_source: &Path, _dest: &Path) -> Result<()> {
    Err(Error::control(ErrorCode::Unsupported))
}
