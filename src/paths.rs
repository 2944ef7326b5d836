//! Path helpers shared by the walker, root resolver and in-memory platform.

use std::path::{Component, Path, PathBuf};

/// Lexically normalizes a path: drops `.` components and folds `..` into
/// the preceding component. Never touches the filesystem.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Builds the comparison key for a path under platform equality rules.
///
/// The key keeps the raw bytes of every component, so names that are not
/// valid Unicode stay distinct. Trailing separators are dropped; on
/// case-insensitive platforms the key is lower-cased.
#[must_use]
pub fn path_key(path: &Path, case_sensitive: bool) -> PathBuf {
    let key: PathBuf = path.components().collect();
    if case_sensitive {
        return key;
    }
    match key.to_str() {
        Some(text) => PathBuf::from(text.to_lowercase()),
        None => PathBuf::from(key.as_os_str().to_ascii_lowercase()),
    }
}
