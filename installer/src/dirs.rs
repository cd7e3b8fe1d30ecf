//! Directory resolution abstraction for platform-specific paths.
//!
//! The hub install location on Linux lives under the user's home directory.
//! Resolving it through a trait lets tests point the profile at a temporary
//! directory.

use std::path::PathBuf;

/// Provides base directories used by the setup run.
#[cfg_attr(test, mockall::automock)]
pub trait BaseDirs {
    /// The current user's home directory.
    fn home_dir(&self) -> Option<PathBuf>;
}

/// Resolves directories from the host environment via `directories-next`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemBaseDirs;

impl BaseDirs for SystemBaseDirs {
    fn home_dir(&self) -> Option<PathBuf> {
        directories_next::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}
