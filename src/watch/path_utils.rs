// src/watch/path_utils.rs

//! Path helpers for turning notifier paths into pattern input.

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First a direct `strip_prefix(root)`.
/// - If that fails (symlinked roots, `/private/var` vs `/var` on macOS), both
///   sides are canonicalized and the strip is retried. A removed file can no
///   longer be canonicalized, so its parent directory is canonicalized
///   instead and the file name re-attached.
///
/// Returns `None` if the path cannot be related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}

fn to_slash(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
