//! Git metadata unit: repository top-level and current branch.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use crate::diagnostics::{Descriptor, Diagnostic, Diagnostics};
use crate::ports::{GitError, GitRepo};
use crate::root::Root;

/// Branch name used when git cannot tell.
pub const UNKNOWN_BRANCH: &str = "unknown";

/// How often, and how patiently, each git query is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per query, including the first.
    pub attempts: u32,
    /// Wait after the n-th failed attempt is `n * backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { attempts: 3, backoff_unit: Duration::from_secs(1) }
    }
}

impl RetryPolicy {
    /// A policy that retries without waiting, for tests and replays.
    #[must_use]
    pub fn immediate(attempts: u32) -> Self {
        Self { attempts, backoff_unit: Duration::ZERO }
    }

    /// Runs `query` until it succeeds or the attempts are used up.
    ///
    /// A missing git executable is not retried.
    ///
    /// # Errors
    ///
    /// Returns the last failure once no attempts remain.
    pub async fn run<F, Fut>(&self, mut query: F) -> Result<String, GitError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<String, GitError>>,
    {
        let attempts = self.attempts.max(1);
        let mut attempt = 1;
        loop {
            match query().await {
                Ok(output) => return Ok(output),
                Err(err @ GitError::NotAvailable { .. }) => return Err(err),
                Err(err) if attempt >= attempts => return Err(err),
                Err(err) => {
                    debug!(attempt, error = %err, "git query failed, retrying");
                    tokio::time::sleep(self.backoff_unit * attempt).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Values rendered into the `git` module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitMetadata {
    /// Top-level directory of the working tree.
    pub root_directory: String,
    /// Current branch, or [`UNKNOWN_BRANCH`].
    pub branch_name: String,
}

/// Queries git from `cwd`, falling back to `root` and [`UNKNOWN_BRANCH`].
///
/// Both queries run concurrently and are retried independently.
pub async fn git_metadata(
    git: &dyn GitRepo,
    cwd: &Path,
    root: &Root,
    policy: &RetryPolicy,
    diagnostics: &mut Diagnostics,
) -> GitMetadata {
    let (toplevel, branch) = tokio::join!(
        policy.run(|| git.show_toplevel(cwd)),
        policy.run(|| git.current_branch(cwd)),
    );

    let root_directory = match toplevel {
        Ok(path) => normalize_git_path(&path),
        Err(err) => {
            let fallback = root.path().display().to_string();
            report_failure(&err, "ROOT_DIRECTORY", &fallback, diagnostics);
            fallback
        }
    };
    let branch_name = match branch {
        Ok(name) => name.trim().to_string(),
        Err(err) => {
            report_failure(&err, "BRANCH_NAME", UNKNOWN_BRANCH, diagnostics);
            UNKNOWN_BRANCH.to_string()
        }
    };
    GitMetadata { root_directory, branch_name }
}

fn report_failure(err: &GitError, constant: &str, fallback: &str, diagnostics: &mut Diagnostics) {
    warn!(error = %err, constant, fallback, "git query failed, using fallback");
    match err {
        GitError::NotAvailable { .. } => {
            if !diagnostics.contains(Descriptor::GIT_NOT_AVAILABLE.id) {
                diagnostics.report(Diagnostic::new(
                    Descriptor::GIT_NOT_AVAILABLE,
                    format!("Git is not installed or not available on PATH: {err}"),
                ));
            }
        }
        GitError::Failed { .. } | GitError::TimedOut { .. } => {
            diagnostics.report(Diagnostic::new(
                Descriptor::GIT_COMMAND_FAILED,
                format!("Git command failed after retries: {err}"),
            ));
        }
    }
    diagnostics.report(Diagnostic::new(
        Descriptor::FALLBACK_USED,
        format!("Using fallback value '{fallback}' for {constant}"),
    ));
}

/// Trims git output and, on Windows, turns MSYS paths into native ones.
#[must_use]
pub fn normalize_git_path(raw: &str) -> String {
    let trimmed = raw.trim();
    if cfg!(windows) {
        msys_to_windows(trimmed).unwrap_or_else(|| trimmed.replace('/', "\\"))
    } else {
        trimmed.to_string()
    }
}

/// Converts `/c/Users/x` to `C:\Users\x`; `None` for anything else.
#[must_use]
pub fn msys_to_windows(path: &str) -> Option<String> {
    let rest = path.strip_prefix('/')?;
    let mut chars = rest.chars();
    let drive = chars.next().filter(char::is_ascii_alphabetic)?;
    let tail = chars.as_str();
    if !(tail.is_empty() || tail.starts_with('/')) {
        return None;
    }
    let native = tail.replace('/', "\\");
    let native = if native.is_empty() { "\\".to_string() } else { native };
    Some(format!("{}:{native}", drive.to_ascii_uppercase()))
}
