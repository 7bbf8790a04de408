//! Resource files.
//!
//! Resources live under a root directory resolved once per process (see
//! [`base_path`]). Loading is soft: a missing file is logged and yields an
//! empty buffer through [`Resources::load_or_empty`]. Saving is strict and
//! always returns an error on failure.

mod file;
mod paths;

pub use file::{load_bytes, save_bytes, ResourceError, Resources};
pub use paths::{base_path, join_resource, prefs_path, RESOURCE_ROOT_ENV};
