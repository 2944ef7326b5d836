//! Recording adapter for the `GitRepo` port.

use std::path::Path;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::record_interaction;
use crate::cassette::CassetteRecorder;
use crate::ports::{GitFuture, GitRepo};

/// Records git queries while delegating to an inner implementation.
pub struct RecordingGitRepo {
    inner: Box<dyn GitRepo>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingGitRepo {
    /// Wraps `inner`, recording into `recorder`.
    pub fn new(inner: Box<dyn GitRepo>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct CwdInput {
    cwd: String,
}

impl GitRepo for RecordingGitRepo {
    fn show_toplevel<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a> {
        Box::pin(async move {
            let result = self.inner.show_toplevel(cwd).await;
            let input = CwdInput { cwd: cwd.display().to_string() };
            record_interaction(&self.recorder, "git", "show_toplevel", &input, &result);
            result
        })
    }

    fn current_branch<'a>(&'a self, cwd: &'a Path) -> GitFuture<'a> {
        Box::pin(async move {
            let result = self.inner.current_branch(cwd).await;
            let input = CwdInput { cwd: cwd.display().to_string() };
            record_interaction(&self.recorder, "git", "current_branch", &input, &result);
            result
        })
    }
}
