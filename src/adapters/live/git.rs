//! Live git adapter using `git` CLI commands.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::process::Command;

use crate::ports::git::{GitError, GitFuture, GitRepo};

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Live git adapter that shells out to the `git` CLI.
///
/// Each query spawns a fresh process. Processes that outlive `timeout` are
/// killed.
#[derive(Debug, Clone)]
pub struct LiveGitRepo {
    timeout: Duration,
}

impl LiveGitRepo {
    /// Creates a live git adapter with the default timeout.
    #[must_use]
    pub fn new() -> Self {
        Self { timeout: DEFAULT_TIMEOUT }
    }

    /// Creates a live git adapter with a custom per-command timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    async fn run(&self, cwd: &Path, args: &[&str]) -> Result<String, GitError> {
        let command = args.join(" ");
        let child = Command::new("git")
            .args(args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| GitError::NotAvailable { message: e.to_string() })?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| GitError::Failed {
                command: command.clone(),
                message: e.to_string(),
            })?,
            Err(_) => {
                return Err(GitError::TimedOut { command, seconds: self.timeout.as_secs() });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::Failed { command, message: stderr });
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.is_empty() {
            return Err(GitError::Failed { command, message: "no output".into() });
        }
        Ok(stdout)
    }
}

impl Default for LiveGitRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl GitRepo for LiveGitRepo {
    fn show_toplevel<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a> {
        Box::pin(self.run(cwd, &["rev-parse", "--show-toplevel"]))
    }

    fn current_branch<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a> {
        Box::pin(self.run(cwd, &["rev-parse", "--abbrev-ref", "HEAD"]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn outside_a_repository_reports_failure_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let git = LiveGitRepo::with_timeout(Duration::from_secs(10));
        // Either git is missing or it refuses to run outside a work tree.
        let result = git.show_toplevel(dir.path()).await;
        if let Ok(top) = result {
            // A parent of the temp dir may itself be a repository.
            assert!(!top.is_empty());
        }
    }
}
