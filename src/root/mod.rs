//! Repository root resolution.
//!
//! The root is the closest ancestor of the project directory carrying one of
//! the recognized markers, unless an explicit override names it directly.

pub mod cache;
pub mod relative;

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::{Component, Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

pub use cache::RootCache;
pub use relative::try_make_relative;

use crate::paths::{normalize_lexically, path_key};
use crate::ports::platform::Platform;

/// Upper bound on the number of directories examined while searching upward.
pub const MAX_SEARCH_DEPTH: usize = 30;

/// Explicit root marker file.
pub const ROOT_MARKER: &str = ".sourcyroot";

/// A root-identifying marker, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    /// A `.sourcyroot` file.
    SourcyRoot,
    /// A `.git` directory, or a `.git` file pointing at a git directory.
    Git,
    /// A `Directory.Build.props` file.
    DirectoryBuildProps,
    /// A `global.json` file.
    GlobalJson,
}

/// The resolved repository root.
///
/// Equality and hashing follow the platform's path comparison rules.
#[derive(Debug, Clone, Serialize)]
pub struct Root {
    path: PathBuf,
    #[serde(skip)]
    case_sensitive: bool,
}

impl Root {
    /// Wraps a directory path as a root.
    pub fn new(path: impl Into<PathBuf>, case_sensitive: bool) -> Self {
        Self { path: path.into(), case_sensitive }
    }

    /// The root directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether path comparisons under this root are case-sensitive.
    #[must_use]
    pub fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Relative path of `target` plus the fallback reason, if any.
    #[must_use]
    pub fn try_make_relative(&self, target: &Path) -> (String, Option<String>) {
        try_make_relative(&self.path, target, self.case_sensitive)
    }

    /// Whether the root lives on a UNC or network share.
    #[must_use]
    pub fn is_network_path(&self) -> bool {
        let text = self.path.to_string_lossy();
        text.starts_with(r"\\") || text.starts_with("//")
    }

    /// Inspects the version-control checkout rooted here.
    #[must_use]
    pub fn checkout_kind(&self, platform: &dyn Platform) -> CheckoutKind {
        let dot_git = self.path.join(".git");
        let (git_dir, nested) = if platform.is_dir(&dot_git) {
            (dot_git, false)
        } else if let Some(target) = read_gitdir(platform, &dot_git) {
            let target = PathBuf::from(target);
            let nested = target.components().any(|c| c == Component::Normal("modules".as_ref()));
            let resolved =
                if target.is_absolute() { target } else { normalize_lexically(&self.path.join(target)) };
            (resolved, nested)
        } else {
            return CheckoutKind::default();
        };
        let shallow = platform.is_file(&git_dir.join("shallow"));
        CheckoutKind { shallow, nested }
    }
}

impl PartialEq for Root {
    fn eq(&self, other: &Self) -> bool {
        path_key(&self.path, self.case_sensitive) == path_key(&other.path, self.case_sensitive)
    }
}

impl Eq for Root {}

impl Hash for Root {
    fn hash<H: Hasher>(&self, state: &mut H) {
        path_key(&self.path, self.case_sensitive).hash(state);
    }
}

impl fmt::Display for Root {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// Advisory facts about the git checkout at the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckoutKind {
    /// History is truncated (`<gitdir>/shallow` exists).
    pub shallow: bool,
    /// The checkout is a submodule of a superproject.
    pub nested: bool,
}

/// Something worth telling the user about how the root was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResolutionNote {
    /// The override path was used.
    CustomRootUsed(PathBuf),
    /// The override path does not name an existing directory.
    InvalidCustomRoot(String),
    /// No starting directory was supplied.
    NoProjectDir,
    /// No marker was found above the starting directory.
    RootNotFound(PathBuf),
    /// The root is on a network share.
    NetworkRoot(PathBuf),
    /// The checkout is shallow.
    ShallowClone(PathBuf),
    /// The checkout is a submodule.
    NestedCheckout(PathBuf),
}

/// Outcome of [`RootResolver::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// The root, if one was found.
    pub root: Option<Root>,
    /// Conditions observed along the way, in the order they arose.
    pub notes: Vec<ResolutionNote>,
}

/// Finds the repository root for a project directory.
pub struct RootResolver<'a> {
    platform: &'a dyn Platform,
    cache: Option<&'a RootCache>,
}

impl<'a> RootResolver<'a> {
    /// Creates a resolver that searches without memoization.
    #[must_use]
    pub fn new(platform: &'a dyn Platform) -> Self {
        Self { platform, cache: None }
    }

    /// Memoizes upward searches in `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: &'a RootCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Resolves the root from an optional start directory and override.
    ///
    /// A non-blank override naming an existing directory wins outright. An
    /// invalid override is noted and the upward search runs as if it were
    /// absent.
    #[must_use]
    pub fn resolve(&self, start: Option<&Path>, override_root: Option<&str>) -> Resolved {
        let mut notes = Vec::new();
        let mut root = override_root.and_then(|raw| self.custom_root(raw, &mut notes));

        if root.is_none() {
            let Some(start) = start else {
                warn!("no project directory supplied");
                notes.push(ResolutionNote::NoProjectDir);
                return Resolved { root: None, notes };
            };
            root = self.find_root(start);
            if root.is_none() {
                warn!(start = %start.display(), "repository root not found");
                notes.push(ResolutionNote::RootNotFound(start.to_path_buf()));
            }
        }

        if let Some(found) = &root {
            if found.is_network_path() {
                notes.push(ResolutionNote::NetworkRoot(found.path.clone()));
            }
            let kind = found.checkout_kind(self.platform);
            if kind.shallow {
                notes.push(ResolutionNote::ShallowClone(found.path.clone()));
            }
            if kind.nested {
                notes.push(ResolutionNote::NestedCheckout(found.path.clone()));
            }
        }
        Resolved { root, notes }
    }

    fn custom_root(&self, raw: &str, notes: &mut Vec<ResolutionNote>) -> Option<Root> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let path = Path::new(trimmed);
        if self.platform.is_dir(path) {
            let path = self.anchor(path);
            info!(root = %path.display(), "using custom root");
            notes.push(ResolutionNote::CustomRootUsed(path.clone()));
            Some(Root::new(path, self.platform.case_sensitive()))
        } else {
            warn!(root = trimmed, "custom root does not exist, falling back to detection");
            notes.push(ResolutionNote::InvalidCustomRoot(trimmed.to_string()));
            None
        }
    }

    /// Searches upward from `start` for the closest marked directory,
    /// consulting and filling the cache when one is attached.
    ///
    /// A relative `start` is taken from the current directory, and links
    /// along it are resolved, so the root is always absolute.
    #[must_use]
    pub fn find_root(&self, start: &Path) -> Option<Root> {
        if start.as_os_str().is_empty() {
            return None;
        }
        let start = self.anchor(start);
        let case_sensitive = self.platform.case_sensitive();
        if let Some(cache) = self.cache {
            if let Some(hit) = cache.get(&start, case_sensitive) {
                debug!(start = %start.display(), "root cache hit");
                return hit;
            }
            let found = self.search(&start);
            return cache.insert(&start, case_sensitive, found);
        }
        self.search(&start)
    }

    /// Absolute, link-free form of `path`. Falls back to lexical
    /// normalization of the absolute path when the platform cannot resolve it.
    fn anchor(&self, path: &Path) -> PathBuf {
        if let Some(real) = self.platform.resolve_link(path) {
            return real;
        }
        match std::path::absolute(path) {
            Ok(absolute) => normalize_lexically(&absolute),
            Err(_) => normalize_lexically(path),
        }
    }

    fn search(&self, start: &Path) -> Option<Root> {
        if !self.platform.is_dir(start) {
            return None;
        }
        let mut location = Some(start.to_path_buf());
        let mut depth = 0;
        while let Some(dir) = location {
            if depth >= MAX_SEARCH_DEPTH {
                return None;
            }
            if let Some(marker) = self.marker_in(&dir) {
                debug!(root = %dir.display(), ?marker, "root marker found");
                return Some(Root::new(dir, self.platform.case_sensitive()));
            }
            location = dir.parent().filter(|p| !p.as_os_str().is_empty()).map(Path::to_path_buf);
            depth += 1;
        }
        None
    }

    /// Returns the highest-priority marker present in `dir`.
    #[must_use]
    pub fn marker_in(&self, dir: &Path) -> Option<Marker> {
        let platform = self.platform;
        if platform.is_file(&dir.join(ROOT_MARKER)) {
            return Some(Marker::SourcyRoot);
        }
        let dot_git = dir.join(".git");
        if platform.is_dir(&dot_git) || read_gitdir(platform, &dot_git).is_some() {
            return Some(Marker::Git);
        }
        if platform.is_file(&dir.join("Directory.Build.props")) {
            return Some(Marker::DirectoryBuildProps);
        }
        if platform.is_file(&dir.join("global.json")) {
            return Some(Marker::GlobalJson);
        }
        None
    }
}

/// Reads the target of a `.git` file of the form `gitdir: <path>`.
fn read_gitdir(platform: &dyn Platform, dot_git: &Path) -> Option<String> {
    if !platform.is_file(dot_git) {
        return None;
    }
    let line = platform.read_first_line(dot_git).ok()??;
    let prefix = line.get(..7)?;
    if !prefix.eq_ignore_ascii_case("gitdir:") {
        return None;
    }
    Some(line[7..].trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemPlatform;

    fn resolver(fs: &MemPlatform) -> RootResolver<'_> {
        RootResolver::new(fs)
    }

    #[test]
    fn closest_marker_wins() {
        let fs = MemPlatform::new()
            .dir("/r/.git")
            .file("/r/a/.sourcyroot", "")
            .dir("/r/a/b/c");
        let root = resolver(&fs).find_root(Path::new("/r/a/b/c")).unwrap();
        assert_eq!(root.path(), Path::new("/r/a"));
    }

    #[test]
    fn start_behind_a_link_yields_the_real_root() {
        let fs = MemPlatform::new().dir("/real/.git").dir("/real/app").link("/alias", "/real");
        let resolved = resolver(&fs).resolve(Some(Path::new("/alias/app")), Some("/alias"));
        assert_eq!(resolved.root.unwrap().path(), Path::new("/real"));
        let found = resolver(&fs).find_root(Path::new("/alias/app")).unwrap();
        assert_eq!(found.path(), Path::new("/real"));
    }

    #[test]
    fn sourcyroot_outranks_git_in_same_directory() {
        let fs = MemPlatform::new().dir("/r/.git").file("/r/.sourcyroot", "");
        assert_eq!(resolver(&fs).marker_in(Path::new("/r")), Some(Marker::SourcyRoot));
    }

    #[test]
    fn gitdir_file_marks_worktree_root() {
        let fs = MemPlatform::new().file("/w/.git", "GITDIR: /main/.git/worktrees/w\n").dir("/w/src");
        let root = resolver(&fs).find_root(Path::new("/w/src")).unwrap();
        assert_eq!(root.path(), Path::new("/w"));
    }

    #[test]
    fn plain_git_file_is_not_a_marker() {
        let fs = MemPlatform::new().file("/w/.git", "something else").dir("/w/src");
        assert_eq!(resolver(&fs).marker_in(Path::new("/w")), None);
    }

    #[test]
    fn build_convention_files_are_markers() {
        let props = MemPlatform::new().file("/p/Directory.Build.props", "").dir("/p/x");
        assert_eq!(resolver(&props).find_root(Path::new("/p/x")).unwrap().path(), Path::new("/p"));

        let global = MemPlatform::new().file("/g/global.json", "{}").dir("/g/x");
        assert_eq!(resolver(&global).marker_in(Path::new("/g")), Some(Marker::GlobalJson));
    }

    #[test]
    fn search_is_bounded() {
        let deep: PathBuf = (0..40).fold(PathBuf::from("/r"), |p, i| p.join(format!("d{i}")));
        let fs = MemPlatform::new().dir("/r/.git").dir(&deep);
        assert!(resolver(&fs).find_root(&deep).is_none());

        let shallow: PathBuf = (0..28).fold(PathBuf::from("/r"), |p, i| p.join(format!("d{i}")));
        assert!(resolver(&fs).find_root(&shallow).is_some());
    }

    #[test]
    fn missing_start_fails_quietly() {
        let fs = MemPlatform::new().dir("/r/.git");
        let resolved = resolver(&fs).resolve(Some(Path::new("/r/missing")), None);
        assert_eq!(resolved.root, None);
        assert_eq!(resolved.notes, vec![ResolutionNote::RootNotFound(PathBuf::from("/r/missing"))]);
    }

    #[test]
    fn override_wins_without_markers() {
        let fs = MemPlatform::new().dir("/r/.git").dir("/tmp/X");
        let resolved = resolver(&fs).resolve(Some(Path::new("/r")), Some("  /tmp/X  "));
        assert_eq!(resolved.root.unwrap().path(), Path::new("/tmp/X"));
        assert_eq!(resolved.notes, vec![ResolutionNote::CustomRootUsed(PathBuf::from("/tmp/X"))]);
    }

    #[test]
    fn invalid_override_falls_back_to_detection() {
        let fs = MemPlatform::new().dir("/r/.git").dir("/r/src");
        let resolved = resolver(&fs).resolve(Some(Path::new("/r/src")), Some("/nope"));
        assert_eq!(resolved.root.unwrap().path(), Path::new("/r"));
        assert_eq!(resolved.notes, vec![ResolutionNote::InvalidCustomRoot("/nope".into())]);
    }

    #[test]
    fn blank_override_is_ignored() {
        let fs = MemPlatform::new().dir("/r/.git");
        let resolved = resolver(&fs).resolve(Some(Path::new("/r")), Some("   "));
        assert!(resolved.root.is_some());
        assert!(resolved.notes.is_empty());
    }

    #[test]
    fn no_project_dir_is_noted() {
        let fs = MemPlatform::new();
        let resolved = resolver(&fs).resolve(None, None);
        assert_eq!(resolved.notes, vec![ResolutionNote::NoProjectDir]);
    }

    #[test]
    fn cache_remembers_negative_results() {
        let cache = RootCache::new();
        let empty = MemPlatform::new().dir("/r/src");
        assert!(RootResolver::new(&empty).with_cache(&cache).find_root(Path::new("/r/src")).is_none());

        // The marker appearing later does not change the memoized answer.
        let marked = MemPlatform::new().dir("/r/.git").dir("/r/src");
        assert!(RootResolver::new(&marked).with_cache(&cache).find_root(Path::new("/r/src")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shallow_and_submodule_checkouts_are_noted() {
        let fs = MemPlatform::new()
            .file("/super/.git/modules/sub/shallow", "")
            .file("/super/sub/.git", "gitdir: ../.git/modules/sub");
        let resolved = resolver(&fs).resolve(Some(Path::new("/super/sub")), None);
        let root = resolved.root.clone().unwrap();
        assert_eq!(root.path(), Path::new("/super/sub"));
        assert_eq!(root.checkout_kind(&fs), CheckoutKind { shallow: true, nested: true });
        assert_eq!(
            resolved.notes,
            vec![
                ResolutionNote::ShallowClone(PathBuf::from("/super/sub")),
                ResolutionNote::NestedCheckout(PathBuf::from("/super/sub")),
            ]
        );
    }

    #[test]
    fn unc_roots_are_network_paths() {
        assert!(Root::new(r"\\server\share", false).is_network_path());
        assert!(Root::new("//server/share", true).is_network_path());
        assert!(!Root::new("/home/me", true).is_network_path());
    }

    #[test]
    fn equality_follows_case_rules() {
        assert_eq!(Root::new("/Repo", false), Root::new("/repo/", false));
        assert_ne!(Root::new("/Repo", true), Root::new("/repo", true));
    }
}
