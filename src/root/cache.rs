//! Session-scoped memo of root lookups.

use std::path::{Path, PathBuf};

use dashmap::DashMap;

use super::Root;
use crate::paths::path_key;

/// Concurrent memo of upward root searches, keyed by starting path.
///
/// Negative results are stored too, so a start path that never resolves is
/// only searched once per session.
#[derive(Debug, Default)]
pub struct RootCache {
    entries: DashMap<PathBuf, Option<Root>>,
}

impl RootCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the memoized outcome for `start`, if any.
    ///
    /// The outer `Option` is a cache hit; the inner one is the search result.
    #[must_use]
    pub fn get(&self, start: &Path, case_sensitive: bool) -> Option<Option<Root>> {
        self.entries.get(&path_key(start, case_sensitive)).map(|entry| entry.value().clone())
    }

    /// Stores a search outcome unless one is already present, returning the
    /// value that ends up cached.
    pub fn insert(&self, start: &Path, case_sensitive: bool, root: Option<Root>) -> Option<Root> {
        self.entries.entry(path_key(start, case_sensitive)).or_insert(root).value().clone()
    }

    /// Number of memoized start paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been memoized yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
