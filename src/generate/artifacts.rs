//! Artifact generators: which crawled files become path constants, and under
//! which names.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::crawl::within_node_modules;
use crate::diagnostics::{Descriptor, Diagnostic, Diagnostics};
use crate::ident::{sanitize_path_to_identifier, to_valid_identifier, UsedIdentifiers};
use crate::ports::IdGenerator;
use crate::root::Root;

/// Project file extensions recognized by [`DotNetProjects`].
pub const PROJECT_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Solution file extensions recognized by [`DotNetSolutions`].
pub const SOLUTION_EXTENSIONS: &[&str] = &["sln", "slnx"];

/// A path a generator wants to emit, before it has been named.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path bound to the constant.
    pub emitted: PathBuf,
    /// Short name used while it is unique within the module.
    pub key: String,
    /// Path whose root-relative form names the constant on collision.
    pub qualifier: PathBuf,
    /// Suffix removed from the qualifier before sanitizing.
    pub extension: Option<String>,
}

/// One named constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Identifier of the constant.
    pub name: String,
    /// Path the constant holds.
    pub path: String,
}

/// Constants generated for one module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedModule {
    /// Module path, e.g. `dotnet::projects`.
    pub module: &'static str,
    /// Entries sorted by name.
    pub entries: Vec<Entry>,
}

/// Picks the files of one artifact type out of the crawl.
pub trait ArtifactGenerator: Send + Sync {
    /// Module path the constants are rendered into.
    fn module(&self) -> &'static str;

    /// Returns the candidate for `file`, `None` when the file is not this
    /// generator's concern, or a message when the file cannot be handled.
    ///
    /// # Errors
    ///
    /// Returns a description of the failure for a file that matched but
    /// could not be turned into a candidate.
    fn candidate(&self, file: &Path) -> Result<Option<Candidate>, String>;
}

/// `.csproj`, `.fsproj` and `.vbproj` files, named by file stem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotNetProjects;

impl ArtifactGenerator for DotNetProjects {
    fn module(&self) -> &'static str {
        "dotnet::projects"
    }

    fn candidate(&self, file: &Path) -> Result<Option<Candidate>, String> {
        stem_candidate(file, PROJECT_EXTENSIONS)
    }
}

/// `.sln` and `.slnx` files, named by file stem.
#[derive(Debug, Clone, Copy, Default)]
pub struct DotNetSolutions;

impl ArtifactGenerator for DotNetSolutions {
    fn module(&self) -> &'static str {
        "dotnet::solutions"
    }

    fn candidate(&self, file: &Path) -> Result<Option<Candidate>, String> {
        stem_candidate(file, SOLUTION_EXTENSIONS)
    }
}

/// Files named `Dockerfile`, named by their directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dockerfiles;

impl ArtifactGenerator for Dockerfiles {
    fn module(&self) -> &'static str {
        "docker::dockerfiles"
    }

    fn candidate(&self, file: &Path) -> Result<Option<Candidate>, String> {
        if !file.file_name().is_some_and(|n| n.eq_ignore_ascii_case("Dockerfile")) {
            return Ok(None);
        }
        let dir = file.parent().ok_or_else(|| format!("'{}' has no parent", file.display()))?;
        let key = utf8_name(dir)?;
        Ok(Some(Candidate {
            emitted: file.to_path_buf(),
            key,
            qualifier: dir.to_path_buf(),
            extension: None,
        }))
    }
}

/// Directories holding a `package.json`, outside any `node_modules`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeProjects;

impl ArtifactGenerator for NodeProjects {
    fn module(&self) -> &'static str {
        "node::projects"
    }

    fn candidate(&self, file: &Path) -> Result<Option<Candidate>, String> {
        if file.file_name() != Some(OsStr::new("package.json")) || within_node_modules(file) {
            return Ok(None);
        }
        let dir = file.parent().ok_or_else(|| format!("'{}' has no parent", file.display()))?;
        let key = utf8_name(dir)?;
        Ok(Some(Candidate {
            emitted: dir.to_path_buf(),
            key,
            qualifier: dir.to_path_buf(),
            extension: None,
        }))
    }
}

/// Every built-in generator, in render order.
#[must_use]
pub fn all_generators() -> Vec<Box<dyn ArtifactGenerator>> {
    vec![
        Box::new(DotNetProjects),
        Box::new(DotNetSolutions),
        Box::new(Dockerfiles),
        Box::new(NodeProjects),
    ]
}

fn stem_candidate(file: &Path, extensions: &[&str]) -> Result<Option<Candidate>, String> {
    let Some(ext) = file.extension() else {
        return Ok(None);
    };
    if !extensions.iter().any(|e| ext.eq_ignore_ascii_case(e)) {
        return Ok(None);
    }
    let ext = ext.to_str().ok_or_else(|| not_utf8(file))?;
    let stem = file.file_stem().and_then(OsStr::to_str).ok_or_else(|| not_utf8(file))?;

    // A project living in a directory of the same name is qualified by the
    // directory, so `src/App/App.csproj` becomes `src__App`.
    let parent = file.parent().filter(|p| p.file_name().and_then(OsStr::to_str) == Some(stem));
    let (qualifier, extension) = match parent {
        Some(dir) => (dir.to_path_buf(), None),
        None => (file.to_path_buf(), Some(format!(".{ext}"))),
    };
    Ok(Some(Candidate { emitted: file.to_path_buf(), key: stem.to_string(), qualifier, extension }))
}

fn utf8_name(path: &Path) -> Result<String, String> {
    path.file_name()
        .map_or(Some(""), OsStr::to_str)
        .map(str::to_string)
        .ok_or_else(|| not_utf8(path))
}

fn not_utf8(path: &Path) -> String {
    format!("'{}' is not valid UTF-8", path.display())
}

/// Runs one generator over the crawled `files`.
///
/// Files the generator cannot handle are reported and skipped; they never
/// prevent the rest of the module from being generated.
pub fn generate_module(
    generator: &dyn ArtifactGenerator,
    files: &[PathBuf],
    root: &Root,
    ids: Arc<dyn IdGenerator>,
    diagnostics: &mut Diagnostics,
) -> GeneratedModule {
    let module = generator.module();
    let mut candidates = Vec::new();
    for file in files {
        match generator.candidate(file) {
            Ok(Some(candidate)) if candidate.emitted.to_str().is_some() => {
                candidates.push(candidate);
            }
            Ok(Some(candidate)) => diagnostics.report(Diagnostic::new(
                Descriptor::GENERATION_ERROR,
                format!("Error generating {module}: {}", not_utf8(&candidate.emitted)),
            )),
            Ok(None) => {}
            Err(message) => diagnostics.report(Diagnostic::new(
                Descriptor::GENERATION_ERROR,
                format!("Error generating {module}: {message}"),
            )),
        }
    }
    debug!(module, count = candidates.len(), "candidates collected");

    let mut used = UsedIdentifiers::new(ids);
    let entries = distinct_names(candidates, root, &mut used, diagnostics);
    GeneratedModule { module, entries }
}

/// Names every candidate uniquely within `used`.
///
/// Keys held by a single candidate are sanitized as they are. When several
/// candidates share a key, each of them is named by its root-relative path
/// instead. The result is sorted by name.
pub fn distinct_names(
    candidates: Vec<Candidate>,
    root: &Root,
    used: &mut UsedIdentifiers,
    diagnostics: &mut Diagnostics,
) -> Vec<Entry> {
    let mut groups: BTreeMap<String, Vec<Candidate>> = BTreeMap::new();
    for candidate in candidates {
        groups.entry(candidate.key.clone()).or_default().push(candidate);
    }

    let mut entries = Vec::new();
    for (key, group) in groups {
        if let [single] = group.as_slice() {
            let name = to_valid_identifier(&key, Some(used));
            if name != key {
                diagnostics.report(Diagnostic::new(
                    Descriptor::INVALID_IDENTIFIER,
                    format!("'{key}' was sanitized to '{name}'"),
                ));
            }
            entries.push(entry(name, &single.emitted));
            continue;
        }

        debug!(key = %key, count = group.len(), "name collision, qualifying by path");
        for candidate in &group {
            let (relative, fallback) = root.try_make_relative(&candidate.qualifier);
            if let Some(reason) = fallback {
                diagnostics.report(Diagnostic::new(
                    Descriptor::INVALID_PATH,
                    format!(
                        "Path '{}' could not be made relative to the root ({reason}); using '{relative}'",
                        candidate.qualifier.display()
                    ),
                ));
            }
            let name =
                used.claim(sanitize_path_to_identifier(&relative, candidate.extension.as_deref()));
            entries.push(entry(name, &candidate.emitted));
        }
    }
    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

fn entry(name: String, path: &Path) -> Entry {
    Entry { name, path: path.to_string_lossy().into_owned() }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::adapters::live::LiveIdGenerator;

    fn ids() -> Arc<dyn IdGenerator> {
        Arc::new(LiveIdGenerator::new())
    }

    fn root() -> Root {
        Root::new("/repo", true)
    }

    fn files(paths: &[&str]) -> Vec<PathBuf> {
        paths.iter().map(PathBuf::from).collect()
    }

    fn names(module: &GeneratedModule) -> Vec<&str> {
        module.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn project_extensions_are_matched_case_insensitively() {
        let generator = DotNetProjects;
        assert!(generator.candidate(Path::new("/repo/a/A.CSPROJ")).unwrap().is_some());
        assert!(generator.candidate(Path::new("/repo/a/A.fsproj")).unwrap().is_some());
        assert!(generator.candidate(Path::new("/repo/a/A.sln")).unwrap().is_none());
        assert!(generator.candidate(Path::new("/repo/a/csproj")).unwrap().is_none());
    }

    #[test]
    fn unique_stems_keep_short_names() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &DotNetProjects,
            &files(&["/repo/src/Web/Web.csproj", "/repo/tools/cli.fsproj"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["Web", "cli"]);
        assert_eq!(module.entries[0].path, "/repo/src/Web/Web.csproj");
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn colliding_stems_are_qualified_by_directory() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &DotNetProjects,
            &files(&["/repo/src/App/App.csproj", "/repo/src/Lib/App/App.csproj"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["src__App", "src__Lib__App"]);
        assert_eq!(module.entries[1].path, "/repo/src/Lib/App/App.csproj");
    }

    #[test]
    fn colliding_stems_outside_matching_directory_use_file_path() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &DotNetProjects,
            &files(&["/repo/a/Core.csproj", "/repo/b/Core.csproj"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["a__Core", "b__Core"]);
    }

    #[test]
    fn dockerfiles_are_named_by_directory() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &Dockerfiles,
            &files(&["/repo/services/api/Dockerfile", "/repo/web.app/Dockerfile", "/repo/README"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["api", "web_app"]);
    }

    #[test]
    fn node_projects_emit_directories_outside_node_modules() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &NodeProjects,
            &files(&["/repo/web/package.json", "/repo/web/node_modules/left-pad/package.json"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(module.entries, [Entry { name: "web".into(), path: "/repo/web".into() }]);
    }

    #[test]
    fn keyword_keys_are_escaped_and_noted_when_verbose() {
        let mut diagnostics = Diagnostics::verbose();
        let module = generate_module(
            &DotNetSolutions,
            &files(&["/repo/type.sln"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["r#type"]);
        assert!(diagnostics.contains("SOURCY006"));
    }

    #[test]
    fn sanitized_collisions_are_uniquified() {
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &DotNetSolutions,
            &files(&["/repo/my-app.sln", "/repo/my_app.sln"]),
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["my_app", "my_app_2"]);
    }

    #[test]
    fn non_utf8_names_are_reported_and_skipped() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let mut bad = PathBuf::from("/repo");
        bad.push(OsString::from_vec(b"bad\xFF.csproj".to_vec()));
        let mut diagnostics = Diagnostics::new();
        let module = generate_module(
            &DotNetProjects,
            &[bad, PathBuf::from("/repo/Good.csproj")],
            &root(),
            ids(),
            &mut diagnostics,
        );
        assert_eq!(names(&module), ["Good"]);
        assert!(diagnostics.contains("SOURCY003"));
    }
}
