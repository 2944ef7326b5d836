//! Pure predicates deciding whether a path is traversed or emitted.

use std::io;
use std::path::Path;

use super::skip::SkipReason;
use crate::ports::platform::EntryAttributes;

/// Marker file that silently excludes the directory containing it.
pub const IGNORE_MARKER: &str = ".sourcyignore";

/// Directory names never entered, compared case-insensitively.
pub const EXCLUDED_DIRECTORIES: &[&str] = &[
    // version control
    ".git",
    ".hg",
    ".svn",
    ".bzr",
    // build output
    "bin",
    "obj",
    "packages",
    "TestResults",
    // editors
    ".vs",
    ".vscode",
    ".idea",
    // package caches
    "node_modules",
    ".npm",
    ".nuget",
    ".cargo",
    ".rustup",
    // virtual environments
    ".venv",
    "venv",
    "__pycache__",
    // OS trash and indexes
    "$RECYCLE.BIN",
    "System Volume Information",
    ".Trash",
    ".Spotlight-V100",
    ".fseventsd",
];

/// Returns `true` if `name` is on the deny-list.
#[must_use]
pub fn is_excluded_name(name: &str) -> bool {
    EXCLUDED_DIRECTORIES.iter().any(|excluded| excluded.eq_ignore_ascii_case(name))
}

/// Returns `true` if any component of `path` is `node_modules`.
#[must_use]
pub fn within_node_modules(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str().eq_ignore_ascii_case("node_modules"))
}

/// Attribute-level admission for a directory: hidden and system checks.
#[must_use]
pub fn attribute_skip(attrs: &EntryAttributes, honors_hidden: bool) -> Option<SkipReason> {
    if (attrs.hidden && honors_hidden) || attrs.system {
        Some(SkipReason::HiddenOrSystem)
    } else {
        None
    }
}

/// Decides whether a file is a cloud-sync placeholder.
///
/// Detection varies by sync provider, so the walker takes the policy as a
/// parameter.
pub trait PlaceholderPolicy: Send + Sync {
    /// Returns `true` if the file should be skipped as a placeholder.
    fn is_placeholder(&self, path: &Path, attrs: &EntryAttributes) -> bool;
}

/// Flags files that are offline, or that are reparse points stored sparse.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributePlaceholderPolicy;

impl PlaceholderPolicy for AttributePlaceholderPolicy {
    fn is_placeholder(&self, _path: &Path, attrs: &EntryAttributes) -> bool {
        attrs.offline || (attrs.is_link && attrs.sparse)
    }
}

/// Never flags anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlaceholders;

impl PlaceholderPolicy for NoPlaceholders {
    fn is_placeholder(&self, _path: &Path, _attrs: &EntryAttributes) -> bool {
        false
    }
}

/// Windows reports over-long paths with codes std leaves uncategorized.
#[cfg(windows)]
const WINDOWS_PATH_TOO_LONG: &[i32] = &[
    206, // ERROR_FILENAME_EXCED_RANGE
    111, // ERROR_BUFFER_OVERFLOW
];
#[cfg(not(windows))]
const WINDOWS_PATH_TOO_LONG: &[i32] = &[];

#[cfg(unix)]
const SECURITY_DENIED: i32 = 1; // EPERM
#[cfg(windows)]
const SECURITY_DENIED: i32 = 1314; // ERROR_PRIVILEGE_NOT_HELD
#[cfg(not(any(unix, windows)))]
const SECURITY_DENIED: i32 = -1;

/// Maps an I/O failure at one node to its skip reason.
#[must_use]
pub fn classify_io_error(err: &io::Error) -> SkipReason {
    if err.kind() == io::ErrorKind::InvalidFilename {
        return SkipReason::PathTooLong;
    }
    match err.raw_os_error() {
        Some(code) if code == SECURITY_DENIED => return SkipReason::SecurityException,
        Some(code) if WINDOWS_PATH_TOO_LONG.contains(&code) => return SkipReason::PathTooLong,
        _ => {}
    }
    match err.kind() {
        io::ErrorKind::PermissionDenied => SkipReason::UnauthorizedAccess,
        io::ErrorKind::NotFound => SkipReason::DirectoryNotFound,
        _ => SkipReason::IoError,
    }
}
