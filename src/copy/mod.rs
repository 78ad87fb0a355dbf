//! Core copy operations.
//!
//! This module provides the single-entry copy engine: the stream copier,
//! the per-type copiers it dispatches to, and the composite operations built
//! on top of them.

mod clone;
mod fallback;
mod file;
mod regular;
mod special;
mod stream;
mod symlink;
mod utils;

// Re-export public API
pub use clone::{clone_file, clone_stream};
pub use fallback::{link_file, move_file};
pub use file::{archive_file, copy_file};
pub use regular::copy_regular;
pub use special::{SpecialFile, create_special};
pub use stream::copy_stream;
pub use symlink::copy_symlink;
