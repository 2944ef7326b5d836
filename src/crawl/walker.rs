//! Depth-first directory and file iterators with per-node fault isolation.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::classify::{
    attribute_skip, classify_io_error, is_excluded_name, AttributePlaceholderPolicy,
    PlaceholderPolicy, IGNORE_MARKER,
};
use super::skip::{SkipReason, SkippedPath};
use crate::paths::{normalize_lexically, path_key};
use crate::ports::platform::{DirListing, Platform};

/// Depth below the walk root past which directories are not entered.
pub const MAX_DEPTH: usize = 50;

static DEFAULT_PLACEHOLDERS: AttributePlaceholderPolicy = AttributePlaceholderPolicy;

/// Entry point for safe traversals over a [`Platform`].
///
/// Each call to [`directories`](Self::directories) or [`files`](Self::files)
/// starts a fresh traversal with an empty visited-set.
#[derive(Clone, Copy)]
pub struct SafeWalker<'a> {
    platform: &'a dyn Platform,
    placeholders: &'a dyn PlaceholderPolicy,
    max_depth: usize,
}

impl<'a> SafeWalker<'a> {
    /// Creates a walker with the default placeholder policy and depth ceiling.
    #[must_use]
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform, placeholders: &DEFAULT_PLACEHOLDERS, max_depth: MAX_DEPTH }
    }

    /// Replaces the cloud-placeholder policy.
    #[must_use]
    pub fn with_placeholder_policy(mut self, policy: &'a dyn PlaceholderPolicy) -> Self {
        self.placeholders = policy;
        self
    }

    /// Replaces the depth ceiling.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Lazily enumerates admitted directories in pre-order, `root` first.
    #[must_use]
    pub fn directories(&self, root: &Path) -> Directories<'a> {
        Directories {
            platform: self.platform,
            max_depth: self.max_depth,
            pending_root: Some(root.to_path_buf()),
            stack: Vec::new(),
            visited: HashSet::new(),
            on_skip: None,
            on_enter: None,
        }
    }

    /// Lazily enumerates files inside admitted directories.
    #[must_use]
    pub fn files(&self, root: &Path) -> Files<'a> {
        Files {
            directories: self.directories(root),
            placeholders: self.placeholders,
            current: Vec::new().into_iter(),
        }
    }
}

/// Pending subdirectories of one entered directory.
struct Frame {
    dirs: std::vec::IntoIter<PathBuf>,
    depth: usize,
}

/// Result of processing a single directory node.
#[derive(Debug)]
enum NodeOutcome {
    /// Admitted and listed.
    Enter(DirListing),
    /// Admitted, but listing its contents failed.
    EnterUnlisted(SkippedPath),
    /// Not admitted; reported.
    Skip(SkippedPath),
    /// Not admitted; excluded on purpose and not reported.
    Ignore,
}

/// One admitted directory with its already-listed files.
struct Visit {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

/// Iterator over admitted directories.
pub struct Directories<'a> {
    platform: &'a dyn Platform,
    max_depth: usize,
    pending_root: Option<PathBuf>,
    stack: Vec<Frame>,
    visited: HashSet<PathBuf>,
    on_skip: Option<Box<dyn FnMut(&SkippedPath) + 'a>>,
    on_enter: Option<Box<dyn FnMut(&Path) + 'a>>,
}

impl<'a> Directories<'a> {
    /// Registers a callback invoked for every skipped path.
    ///
    /// The callback only observes; traversal is identical without it.
    #[must_use]
    pub fn with_skip_handler(mut self, handler: impl FnMut(&SkippedPath) + 'a) -> Self {
        self.on_skip = Some(Box::new(handler));
        self
    }

    /// Registers a callback invoked for every admitted directory, including
    /// ones whose listing failed.
    #[must_use]
    pub fn with_enter_handler(mut self, handler: impl FnMut(&Path) + 'a) -> Self {
        self.on_enter = Some(Box::new(handler));
        self
    }

    fn entered(&mut self, path: &Path) {
        if let Some(handler) = self.on_enter.as_mut() {
            handler(path);
        }
    }

    fn report(&mut self, skipped: &SkippedPath) {
        info!(path = %skipped.path.display(), reason = %skipped.reason, "skipped");
        if let Some(handler) = self.on_skip.as_mut() {
            handler(skipped);
        }
    }

    fn enter(&mut self, path: &Path, depth: usize) -> NodeOutcome {
        let attrs = match self.platform.attributes(path) {
            Ok(attrs) => attrs,
            Err(err) => return NodeOutcome::Skip(SkippedPath::new(path, classify_io_error(&err))),
        };
        if !attrs.is_dir {
            return NodeOutcome::Skip(SkippedPath::new(path, SkipReason::DirectoryNotFound));
        }

        let real = self.platform.resolve_link(path).unwrap_or_else(|| normalize_lexically(path));
        let key = path_key(&real, self.platform.case_sensitive());
        if attrs.is_link && self.visited.contains(&key) {
            return NodeOutcome::Skip(SkippedPath::cycle(path, real));
        }

        if depth > self.max_depth {
            return NodeOutcome::Skip(SkippedPath::too_deep(path, depth));
        }

        if let Some(reason) = attribute_skip(&attrs, self.platform.honors_hidden()) {
            return NodeOutcome::Skip(SkippedPath::new(path, reason));
        }
        if self.platform.is_file(&path.join(IGNORE_MARKER)) {
            debug!(path = %path.display(), "ignored by marker");
            return NodeOutcome::Ignore;
        }
        let name = path.file_name().map(|n| n.to_string_lossy());
        if name.as_deref().is_some_and(is_excluded_name) {
            return NodeOutcome::Skip(SkippedPath::new(path, SkipReason::ExcludedDirectory));
        }

        if !self.visited.insert(key) {
            return NodeOutcome::Skip(SkippedPath::cycle(path, real));
        }

        match self.platform.list_dir(path) {
            Ok(listing) => NodeOutcome::Enter(listing),
            Err(err) => NodeOutcome::EnterUnlisted(SkippedPath::new(path, classify_io_error(&err))),
        }
    }

    fn next_visit(&mut self) -> Option<Visit> {
        loop {
            let (path, depth) = if let Some(root) = self.pending_root.take() {
                (root, 0)
            } else {
                let frame = self.stack.last_mut()?;
                if let Some(next) = frame.dirs.next() {
                    (next, frame.depth + 1)
                } else {
                    self.stack.pop();
                    continue;
                }
            };

            match self.enter(&path, depth) {
                NodeOutcome::Enter(listing) => {
                    debug!(path = %path.display(), depth, "entered");
                    self.entered(&path);
                    self.stack.push(Frame { dirs: listing.directories.into_iter(), depth });
                    return Some(Visit { dir: path, files: listing.files });
                }
                NodeOutcome::EnterUnlisted(skipped) => {
                    self.entered(&path);
                    self.report(&skipped);
                    return Some(Visit { dir: path, files: Vec::new() });
                }
                NodeOutcome::Skip(skipped) => self.report(&skipped),
                NodeOutcome::Ignore => {}
            }
        }
    }
}

impl Iterator for Directories<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_visit().map(|visit| visit.dir)
    }
}

/// Iterator over files in admitted directories, placeholders excluded.
pub struct Files<'a> {
    directories: Directories<'a>,
    placeholders: &'a dyn PlaceholderPolicy,
    current: std::vec::IntoIter<PathBuf>,
}

impl<'a> Files<'a> {
    /// Registers a callback invoked for every skipped directory or file.
    #[must_use]
    pub fn with_skip_handler(mut self, handler: impl FnMut(&SkippedPath) + 'a) -> Self {
        self.directories = self.directories.with_skip_handler(handler);
        self
    }

    /// Registers a callback invoked for every directory whose files are
    /// about to be listed.
    #[must_use]
    pub fn with_enter_handler(mut self, handler: impl FnMut(&Path) + 'a) -> Self {
        self.directories = self.directories.with_enter_handler(handler);
        self
    }
}

impl Iterator for Files<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.current.next() {
                // Unreadable attributes are not evidence of a placeholder.
                let placeholder = self
                    .directories
                    .platform
                    .attributes(&file)
                    .is_ok_and(|attrs| self.placeholders.is_placeholder(&file, &attrs));
                if placeholder {
                    self.directories.report(&SkippedPath::new(file, SkipReason::CloudPlaceholder));
                    continue;
                }
                return Some(file);
            }
            let visit = self.directories.next_visit()?;
            self.current = visit.files.into_iter();
        }
    }
}
