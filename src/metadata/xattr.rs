//! Extended attribute copying.

use crate::error::Result;
use std::path::Path;

/// Copy every extended attribute of `source` onto `dest`.
///
/// Symbolic links are not followed on either side. A source filesystem
/// without extended attribute support has nothing to copy, which is
/// success.
///
/// Setting an attribute may fail for a single name (e.g. a namespace that
/// requires privileges); the remaining attributes are still copied and the
/// first such failure is returned. A destination without extended attribute
/// support stops the copy immediately.
///
/// # Errors
///
/// - [`ErrorCode::XattrList`](crate::ErrorCode::XattrList) when listing the
///   source attributes fails
/// - [`ErrorCode::XattrGet`](crate::ErrorCode::XattrGet) when reading one fails
/// - [`ErrorCode::XattrSet`](crate::ErrorCode::XattrSet) when writing one fails
/// - [`ErrorCode::Unsupported`](crate::ErrorCode::Unsupported) when built
///   without the `xattr` feature
pub fn copy_xattr(source: &Path, dest: &Path) -> Result<()> {
    imp::copy_xattr(source, dest)
}

#[cfg(all(unix, feature = "xattr"))]
mod imp {
    use crate::error::{Error, ErrorCode, Result};
    use std::io;
    use std::path::Path;

    fn is_unsupported(error: &io::Error) -> bool {
        error.kind() == io::ErrorKind::Unsupported
            || error.raw_os_error() == Some(libc::ENOTSUP)
            || error.raw_os_error() == Some(libc::EOPNOTSUPP)
    }

    pub(super) fn copy_xattr(source: &Path, dest: &Path) -> Result<()> {
        let names = match xattr::list(source) {
            Ok(names) => names,
            Err(e) if is_unsupported(&e) => return Ok(()),
            Err(e) => return Err(Error::os(ErrorCode::XattrList, e)),
        };

        let mut first_error = None;
        for name in names {
            let value = match xattr::get(source, &name) {
                Ok(Some(value)) => value,
                // Removed since it was listed.
                Ok(None) => continue,
                Err(e) => return Err(Error::os(ErrorCode::XattrGet, e)),
            };

            if let Err(e) = xattr::set(dest, &name, &value) {
                if is_unsupported(&e) {
                    return Err(Error::os(ErrorCode::XattrSet, e));
                }
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    path = %dest.display(),
                    name = %name.to_string_lossy(),
                    error = %e,
                    "setting extended attribute failed"
                );
                first_error.get_or_insert(Error::os(ErrorCode::XattrSet, e));
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(not(all(unix, feature = "xattr")))]
mod imp {
    use crate::error::{Error, ErrorCode, Result};
    use std::path::Path;

    pub(super) fn copy_xattr(_source: &Path, _dest: &Path) -> Result<()> {
        Err(Error::control(ErrorCode::Unsupported))
    }
}
