//! Filesystem path normalization.

use std::path::{Path, PathBuf};

/// Normalize a path to an absolute form.
///
/// Canonicalizes when the path exists; otherwise anchors relative paths at
/// the current directory without touching the filesystem.
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}
