//! In-memory `Platform` used to exercise attribute-driven and failure paths
//! that a real temporary directory cannot reproduce portably.

use std::collections::{BTreeMap, HashMap};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::paths::normalize_lexically;
use crate::ports::platform::{DirListing, EntryAttributes, Platform};

/// Upper bound on link hops while resolving a path.
const MAX_LINK_HOPS: usize = 40;

/// An injected failure returned by [`MemPlatform`].
#[derive(Debug, Clone, Copy)]
pub enum MemFailure {
    /// Fail with a portable error kind.
    Kind(ErrorKind),
    /// Fail with a raw OS error code.
    Raw(i32),
}

impl MemFailure {
    fn to_error(self) -> io::Error {
        match self {
            Self::Kind(kind) => io::Error::from(kind),
            Self::Raw(code) => io::Error::from_raw_os_error(code),
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Dir(EntryAttributes),
    File { attrs: EntryAttributes, content: String },
    Link(PathBuf),
}

/// A directory tree held in memory.
///
/// Parents are created implicitly. Link targets may be absolute or relative
/// to the link's parent directory.
#[derive(Debug, Clone)]
pub struct MemPlatform {
    nodes: BTreeMap<PathBuf, Node>,
    list_failures: HashMap<PathBuf, MemFailure>,
    attribute_failures: HashMap<PathBuf, MemFailure>,
    case_sensitive: bool,
    honors_hidden: bool,
}

impl Default for MemPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemPlatform {
    /// Creates an empty case-sensitive tree that ignores hidden attributes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            list_failures: HashMap::new(),
            attribute_failures: HashMap::new(),
            case_sensitive: true,
            honors_hidden: false,
        }
    }

    /// Makes the platform report hidden attributes as significant.
    #[must_use]
    pub fn honoring_hidden(mut self) -> Self {
        self.honors_hidden = true;
        self
    }

    /// Makes the platform compare paths case-insensitively.
    #[must_use]
    pub fn case_insensitive(mut self) -> Self {
        self.case_sensitive = false;
        self
    }

    /// Adds a plain directory.
    #[must_use]
    pub fn dir(self, path: impl AsRef<Path>) -> Self {
        self.dir_with(path, EntryAttributes::default())
    }

    /// Adds a directory with explicit attributes.
    #[must_use]
    pub fn dir_with(mut self, path: impl AsRef<Path>, attrs: EntryAttributes) -> Self {
        let path = path.as_ref().to_path_buf();
        self.ensure_parents(&path);
        self.nodes.insert(path, Node::Dir(EntryAttributes { is_dir: true, ..attrs }));
        self
    }

    /// Adds a regular file with the given content.
    #[must_use]
    pub fn file(self, path: impl AsRef<Path>, content: &str) -> Self {
        self.file_with(path, content, EntryAttributes::default())
    }

    /// Adds a file with explicit attributes.
    #[must_use]
    pub fn file_with(
        mut self,
        path: impl AsRef<Path>,
        content: &str,
        attrs: EntryAttributes,
    ) -> Self {
        let path = path.as_ref().to_path_buf();
        self.ensure_parents(&path);
        let attrs = EntryAttributes { is_dir: false, ..attrs };
        self.nodes.insert(path, Node::File { attrs, content: content.to_string() });
        self
    }

    /// Adds a symbolic link pointing at `target`.
    #[must_use]
    pub fn link(mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        self.ensure_parents(&path);
        self.nodes.insert(path, Node::Link(target.as_ref().to_path_buf()));
        self
    }

    /// Makes listing `path` fail.
    #[must_use]
    pub fn fail_listing(mut self, path: impl AsRef<Path>, failure: MemFailure) -> Self {
        self.list_failures.insert(path.as_ref().to_path_buf(), failure);
        self
    }

    /// Makes reading the attributes of `path` fail.
    #[must_use]
    pub fn fail_attributes(mut self, path: impl AsRef<Path>, failure: MemFailure) -> Self {
        self.attribute_failures.insert(path.as_ref().to_path_buf(), failure);
        self
    }

    fn ensure_parents(&mut self, path: &Path) {
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                break;
            }
            self.nodes
                .entry(ancestor.to_path_buf())
                .or_insert_with(|| Node::Dir(EntryAttributes { is_dir: true, ..Default::default() }));
        }
    }

    /// Follows links through every component of `path`.
    fn resolve(&self, path: &Path) -> Option<PathBuf> {
        let mut current = normalize_lexically(path);
        let mut hops = 0;
        'restart: loop {
            let mut prefix = PathBuf::new();
            let components: Vec<_> = current.components().collect();
            for (index, component) in components.iter().enumerate() {
                prefix.push(component.as_os_str());
                if let Some(Node::Link(target)) = self.nodes.get(&prefix) {
                    hops += 1;
                    if hops > MAX_LINK_HOPS {
                        return None;
                    }
                    let base = prefix.parent().map(Path::to_path_buf).unwrap_or_default();
                    let mut next = base.join(target);
                    for rest in &components[index + 1..] {
                        next.push(rest.as_os_str());
                    }
                    current = normalize_lexically(&next);
                    continue 'restart;
                }
            }
            return self.nodes.contains_key(&current).then_some(current);
        }
    }

    /// Resolves every component except the last, so the final entry itself
    /// is not followed.
    fn locate(&self, path: &Path) -> Option<PathBuf> {
        match (path.parent(), path.file_name()) {
            (Some(parent), Some(name)) if !parent.as_os_str().is_empty() => {
                Some(self.resolve(parent)?.join(name))
            }
            _ => Some(path.to_path_buf()),
        }
    }

    fn resolves_to_dir(&self, path: &Path) -> bool {
        self.resolve(path).is_some_and(|p| matches!(self.nodes.get(&p), Some(Node::Dir(_))))
    }
}

impl Platform for MemPlatform {
    fn attributes(&self, path: &Path) -> io::Result<EntryAttributes> {
        if let Some(failure) = self.attribute_failures.get(path) {
            return Err(failure.to_error());
        }
        let located = self.locate(path).ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        match self.nodes.get(&located) {
            Some(Node::Dir(attrs) | Node::File { attrs, .. }) => Ok(*attrs),
            Some(Node::Link(_)) => Ok(EntryAttributes {
                is_dir: self.resolves_to_dir(path),
                is_link: true,
                ..EntryAttributes::default()
            }),
            None => Err(io::Error::from(ErrorKind::NotFound)),
        }
    }

    fn list_dir(&self, path: &Path) -> io::Result<DirListing> {
        if let Some(failure) = self.list_failures.get(path) {
            return Err(failure.to_error());
        }
        let real = self.resolve(path).ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        if !matches!(self.nodes.get(&real), Some(Node::Dir(_))) {
            return Err(io::Error::other("not a directory"));
        }
        let mut listing = DirListing::default();
        for child in self.nodes.keys().filter(|k| k.parent() == Some(real.as_path())) {
            let Some(name) = child.file_name() else { continue };
            let entry = path.join(name);
            if self.resolves_to_dir(&entry) {
                listing.directories.push(entry);
            } else {
                listing.files.push(entry);
            }
        }
        listing.sort();
        Ok(listing)
    }

    fn resolve_link(&self, path: &Path) -> Option<PathBuf> {
        self.resolve(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.resolves_to_dir(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.resolve(path).is_some_and(|p| matches!(self.nodes.get(&p), Some(Node::File { .. })))
    }

    fn read_first_line(&self, path: &Path) -> io::Result<Option<String>> {
        let real = self.resolve(path).ok_or_else(|| io::Error::from(ErrorKind::NotFound))?;
        match self.nodes.get(&real) {
            Some(Node::File { content, .. }) => {
                Ok(content.lines().next().map(|l| l.trim_end_matches('\r').to_string()))
            }
            _ => Err(io::Error::from(ErrorKind::InvalidInput)),
        }
    }

    fn case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn honors_hidden(&self) -> bool {
        self.honors_hidden
    }
}
