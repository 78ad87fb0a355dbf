//! Internal helpers shared across modules.

#[cfg(unix)]
pub(crate) mod path;
