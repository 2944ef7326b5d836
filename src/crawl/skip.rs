//! Skip taxonomy reported by the walker.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Why a path was not entered or not yielded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SkipReason {
    /// Permission to read the directory was denied.
    UnauthorizedAccess,
    /// The directory vanished or was never there.
    DirectoryNotFound,
    /// The path exceeds the platform's length limit.
    PathTooLong,
    /// Any other I/O failure.
    IoError,
    /// A security policy refused the operation.
    SecurityException,
    /// The directory's real path was already entered during this walk.
    SymlinkCycle,
    /// The directory lies deeper than the walker's depth ceiling.
    MaxDepthReached,
    /// The directory name is on the deny-list.
    ExcludedDirectory,
    /// The directory carries the hidden or system attribute.
    HiddenOrSystem,
    /// The file's content is not locally materialized.
    CloudPlaceholder,
}

impl SkipReason {
    /// Stable name used in logs and JSON output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnauthorizedAccess => "UnauthorizedAccess",
            Self::DirectoryNotFound => "DirectoryNotFound",
            Self::PathTooLong => "PathTooLong",
            Self::IoError => "IoError",
            Self::SecurityException => "SecurityException",
            Self::SymlinkCycle => "SymlinkCycle",
            Self::MaxDepthReached => "MaxDepthReached",
            Self::ExcludedDirectory => "ExcludedDirectory",
            Self::HiddenOrSystem => "HiddenOrSystem",
            Self::CloudPlaceholder => "CloudPlaceholder",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One path the walker declined to enter or return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedPath {
    /// The path as the walker encountered it.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: SkipReason,
    /// Real path a cyclic link resolved to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,
    /// Depth at which the ceiling was hit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
}

impl SkippedPath {
    /// Creates a skip record with no target or depth.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, reason: SkipReason) -> Self {
        Self { path: path.into(), reason, target: None, depth: None }
    }

    /// Creates a cycle record carrying the resolved target.
    #[must_use]
    pub fn cycle(path: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self { target: Some(target.into()), ..Self::new(path, SkipReason::SymlinkCycle) }
    }

    /// Creates a depth-limit record.
    #[must_use]
    pub fn too_deep(path: impl Into<PathBuf>, depth: usize) -> Self {
        Self { depth: Some(depth), ..Self::new(path, SkipReason::MaxDepthReached) }
    }

    /// The skipped path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for SkippedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path.display(), self.reason)?;
        if let Some(target) = &self.target {
            write!(f, " -> {}", target.display())?;
        }
        if let Some(depth) = self.depth {
            write!(f, " at depth {depth}")?;
        }
        Ok(())
    }
}
