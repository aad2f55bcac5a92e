// src/watch/path_utils.rs

//! Turning changed paths into the strings the globs are matched against.

use std::path::{Path, PathBuf};

/// Key used for `match` / `skip` globs and extension checks.
///
/// The path is made relative to the first root in `roots` that contains it,
/// so with roots `["/proj", "/proj/src"]` the file `/proj/src/a.ts` matches as
/// `src/a.ts`. A path under no root is matched as given. Separators are
/// always `/`.
pub fn match_key(roots: &[PathBuf], path: &Path) -> String {
    roots
        .iter()
        .find_map(|root| relative_str(root, path))
        .unwrap_or_else(|| slash_str(path))
}

/// `path` relative to `root`, or `None` when it lies elsewhere. A root
/// reached through a symlink (`/var` vs `/private/var`) is compared by its
/// resolved form.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(slash_str(rel));
    }

    let root = root.canonicalize().ok()?;
    let path = path.canonicalize().ok()?;
    path.strip_prefix(&root).ok().map(slash_str)
}

pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// True when `path` is one of `roots` or lies under one.
pub fn is_under_any(roots: &[PathBuf], path: &Path) -> bool {
    roots.iter().any(|root| path.starts_with(root))
}
