//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Absolute form of `path`.
///
/// Canonicalizes when the path exists (symlinks resolved, so watcher
/// events and the project root agree); otherwise joins with cwd.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Forward-slash string form of a relative path.
pub fn to_slash(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
