//! Service context bundling the port trait objects of one session.

use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::adapters::live::{LiveGitRepo, LiveIdGenerator, LivePlatform};
use crate::adapters::recording::{RecordingGitRepo, RecordingIdGenerator};
use crate::adapters::replaying::{ReplayingGitRepo, ReplayingIdGenerator};
use crate::cassette::{self, CassetteRecorder, CassetteReplayer};
use crate::config::{ENV_RECORD, ENV_REPLAY};
use crate::error::Result;
use crate::generate::git::RetryPolicy;
use crate::ports::{GitRepo, IdGenerator, Platform};
use crate::root::RootCache;

/// Bundles the ports and the session-wide root cache.
///
/// Constructors wire up different adapters: live, recording (live plus a
/// cassette written on drop) and replaying (git and ids from a cassette,
/// filesystem still live).
pub struct ServiceContext {
    /// Filesystem metadata and listings.
    pub platform: Box<dyn Platform>,
    /// Git metadata queries.
    pub git: Box<dyn GitRepo>,
    /// Random suffixes for identifiers.
    pub id_gen: Arc<dyn IdGenerator>,
    /// Memoized root searches.
    pub root_cache: RootCache,
    /// Retry behavior of git queries.
    pub retry: RetryPolicy,
    recorder: Option<Arc<Mutex<CassetteRecorder>>>,
}

impl ServiceContext {
    /// Creates a context from explicit ports.
    #[must_use]
    pub fn new(
        platform: Box<dyn Platform>,
        git: Box<dyn GitRepo>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            platform,
            git,
            id_gen,
            root_cache: RootCache::new(),
            retry: RetryPolicy::default(),
            recorder: None,
        }
    }

    /// Creates a context backed by the real filesystem, git and RNG.
    #[must_use]
    pub fn live() -> Self {
        Self::new(
            Box::new(LivePlatform),
            Box::new(LiveGitRepo::new()),
            Arc::new(LiveIdGenerator::new()),
        )
    }

    /// Creates a live context that records git and id interactions to `path`.
    ///
    /// The cassette is written when the context is dropped.
    #[must_use]
    pub fn recording(path: &Path) -> Self {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(path, "sourcy")));
        let git = RecordingGitRepo::new(Box::new(LiveGitRepo::new()), Arc::clone(&recorder));
        let ids = RecordingIdGenerator::new(Box::new(LiveIdGenerator::new()), Arc::clone(&recorder));
        let mut ctx = Self::new(Box::new(LivePlatform), Box::new(git), Arc::new(ids));
        ctx.recorder = Some(recorder);
        ctx
    }

    /// Creates a context replaying git and id interactions from `path`.
    ///
    /// Git retries do not wait, since replayed failures are instantaneous.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self> {
        let cassette = cassette::load(path)?;
        let mut ctx = Self::new(
            Box::new(LivePlatform),
            Box::new(ReplayingGitRepo::new(CassetteReplayer::new(&cassette))),
            Arc::new(ReplayingIdGenerator::new(CassetteReplayer::new(&cassette))),
        );
        ctx.retry = RetryPolicy::immediate(ctx.retry.attempts);
        Ok(ctx)
    }

    /// Picks replaying, recording or live from `SOURCY_REPLAY` and
    /// `SOURCY_RECORD`, in that order.
    ///
    /// # Errors
    ///
    /// Returns an error if a replay cassette cannot be loaded.
    pub fn from_env() -> Result<Self> {
        if let Some(path) = std::env::var_os(ENV_REPLAY) {
            info!(cassette = %Path::new(&path).display(), "replaying session");
            return Self::replaying(Path::new(&path));
        }
        if let Some(path) = std::env::var_os(ENV_RECORD) {
            info!(cassette = %Path::new(&path).display(), "recording session");
            return Ok(Self::recording(Path::new(&path)));
        }
        Ok(Self::live())
    }

    /// Replaces the git retry behavior.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

impl Drop for ServiceContext {
    fn drop(&mut self) {
        if let Some(recorder) = self.recorder.take() {
            let mut guard = recorder.lock().expect("recorder lock poisoned");
            if let Err(e) = guard.write() {
                warn!(error = %e, "failed to write cassette");
            }
        }
    }
}
