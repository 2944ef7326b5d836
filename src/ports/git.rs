//! Git repository port for version-control metadata queries.

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single git query.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GitError {
    /// The `git` executable could not be spawned.
    #[error("git is not available: {message}")]
    NotAvailable {
        /// Description of the spawn failure.
        message: String,
    },
    /// The command ran but exited unsuccessfully or printed nothing.
    #[error("git {command} failed: {message}")]
    Failed {
        /// The git arguments that were run.
        command: String,
        /// Captured standard error, trimmed.
        message: String,
    },
    /// The command did not finish within the allowed time.
    #[error("git {command} timed out after {seconds}s")]
    TimedOut {
        /// The git arguments that were run.
        command: String,
        /// The timeout that elapsed.
        seconds: u64,
    },
}

/// Boxed future type alias used by [`GitRepo`] to keep the trait dyn-compatible.
pub type GitFuture<'a> = Pin<Box<dyn Future<Output = Result<String, GitError>> + Send + 'a>>;

/// Provides read access to version-control metadata.
///
/// Both queries are read-only and may run concurrently.
pub trait GitRepo: Send + Sync {
    /// Returns the top-level working tree directory containing `cwd`.
    fn show_toplevel<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a>;

    /// Returns the abbreviated name of the currently checked-out branch.
    fn current_branch<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a>;
}
