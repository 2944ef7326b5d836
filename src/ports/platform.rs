//! Platform port for the filesystem queries the crawler depends on.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Attribute flags of a single filesystem entry.
///
/// The flags follow the richest platform model (Windows file attributes);
/// platforms without an equivalent simply leave the flag unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAttributes {
    /// The entry is a directory (after following a link, if any).
    pub is_dir: bool,
    /// The entry is a symbolic link, junction, or other reparse point.
    pub is_link: bool,
    /// The entry carries the platform's hidden marker.
    pub hidden: bool,
    /// The entry is an operating-system directory or file.
    pub system: bool,
    /// The entry's content is not locally materialized.
    pub offline: bool,
    /// The entry is stored as a sparse file.
    pub sparse: bool,
}

/// Entries of one directory, split by kind and sorted by full path (ordinal).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirListing {
    /// Subdirectories, including links that resolve to directories.
    pub directories: Vec<PathBuf>,
    /// Regular files, including links that resolve to files.
    pub files: Vec<PathBuf>,
}

impl DirListing {
    /// Sorts both lists by full path using ordinal comparison.
    pub fn sort(&mut self) {
        self.directories.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
        self.files.sort_by(|a, b| a.as_os_str().cmp(b.as_os_str()));
    }
}

/// Provides the filesystem capabilities the walker and root resolver use.
///
/// One implementation is chosen per compilation target; tests substitute an
/// in-memory tree. Failures are reported as [`io::Error`] so callers can
/// classify them by kind and OS code.
pub trait Platform: Send + Sync {
    /// Reads the attributes of `path` without following a trailing link,
    /// except that `is_dir` reports the link target's kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry does not exist or cannot be inspected.
    fn attributes(&self, path: &Path) -> io::Result<EntryAttributes>;

    /// Lists the immediate children of a directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be opened or read.
    fn list_dir(&self, path: &Path) -> io::Result<DirListing>;

    /// Resolves `path` to its real location, following every link to its
    /// ultimate target. Returns `None` when resolution is unavailable.
    fn resolve_link(&self, path: &Path) -> Option<PathBuf>;

    /// Returns `true` if `path` exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Returns `true` if `path` exists and is a regular file.
    fn is_file(&self, path: &Path) -> bool;

    /// Reads the first line of a text file, without its line terminator.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    fn read_first_line(&self, path: &Path) -> io::Result<Option<String>>;

    /// Whether path comparisons are case-sensitive on this platform.
    fn case_sensitive(&self) -> bool;

    /// Whether the hidden attribute should exclude directories here.
    ///
    /// Platforms where dot-directories are conventionally visible return
    /// `false`, which turns the hidden check into a no-op.
    fn honors_hidden(&self) -> bool;
}
