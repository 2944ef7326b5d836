//! Replaying adapter for the `GitRepo` port.

use std::path::Path;
use std::sync::Mutex;

use crate::cassette::CassetteReplayer;
use crate::ports::{GitError, GitFuture, GitRepo};

/// Serves recorded git results from a cassette.
pub struct ReplayingGitRepo {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingGitRepo {
    /// Creates a replaying repo from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    fn replay(&self, method: &str) -> Result<String, GitError> {
        let interaction =
            self.replayer.lock().expect("replayer lock poisoned").next_interaction("git", method);
        let Some(interaction) = interaction else {
            return Err(GitError::Failed {
                command: method.to_string(),
                message: "no recorded interaction left in cassette".to_string(),
            });
        };
        serde_json::from_value(interaction.output).unwrap_or_else(|e| {
            Err(GitError::Failed {
                command: method.to_string(),
                message: format!("unreadable cassette output: {e}"),
            })
        })
    }
}

impl GitRepo for ReplayingGitRepo {
    fn show_toplevel<'a>(&'a self, _cwd: &'a Path) -> GitFuture<'a> {
        let result = self.replay("show_toplevel");
        Box::pin(async move { result })
    }

    fn current_branch<'a>(&'a self, _cwd: &'a Path) -> GitFuture<'a> {
        let result = self.replay("current_branch");
        Box::pin(async move { result })
    }
}
