//! Entry point for a consumer's `build.rs`.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     sourcy::generate::run_build_script().unwrap();
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/sourcy.rs"));
//! ```

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::{generate, render_rust, Generated};
use crate::config::{
    BuildProperties, ENV_MANIFEST_DIR, ENV_PROJECT_DIR, ENV_RECORD, ENV_REPLAY, ENV_ROOT_PATH,
};
use crate::context::ServiceContext;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SourcyError};
use crate::root::ROOT_MARKER;

/// Name of the generated file inside `OUT_DIR`.
pub const OUTPUT_FILE: &str = "sourcy.rs";

/// Generates `$OUT_DIR/sourcy.rs` and prints diagnostics as cargo warnings.
///
/// A missing repository root still writes a file, so the consumer's
/// `include!` keeps compiling.
///
/// # Errors
///
/// Returns an error if `OUT_DIR` is unset, a replay cassette cannot be
/// loaded, or the output cannot be written.
pub fn run_build_script() -> Result<PathBuf> {
    let out_dir = std::env::var_os("OUT_DIR").ok_or(SourcyError::MissingEnv { name: "OUT_DIR" })?;
    let props = BuildProperties::for_build_script();
    let ctx = ServiceContext::from_env()?;
    let mut diagnostics = Diagnostics::new();
    let generated = generate(&ctx, &props, &mut diagnostics)?;

    // Crawled directories are canonical, so compare against canonical forms.
    let real = |path: PathBuf| ctx.platform.resolve_link(&path).unwrap_or(path);
    let out_dir = real(PathBuf::from(out_dir));
    let watch = Watch {
        out_dir: &out_dir,
        manifest_dir: std::env::var_os(ENV_MANIFEST_DIR).map(|dir| real(PathBuf::from(dir))),
        project_dir: props.project_dir,
    };
    let stdout = io::stdout();
    emit(&generated, &diagnostics, &watch, &mut stdout.lock())
}

/// Where the build script writes, and what it runs for.
#[derive(Debug, Clone)]
pub struct Watch<'a> {
    /// Cargo's `OUT_DIR`, also where the generated file lands.
    pub out_dir: &'a Path,
    /// The crate being built; locates the build output directory.
    pub manifest_dir: Option<PathBuf>,
    /// Where the root search started.
    pub project_dir: Option<PathBuf>,
}

impl Watch<'_> {
    /// Top-level directory of the build output: the first component of
    /// `OUT_DIR` that leaves the manifest directory's ancestry.
    fn build_output(&self) -> Option<PathBuf> {
        let manifest = self.manifest_dir.as_deref()?;
        let mut boundary = PathBuf::new();
        for component in self.out_dir.components() {
            boundary.push(component);
            if !manifest.starts_with(&boundary) {
                return Some(boundary);
            }
        }
        None
    }

    /// Directories cargo should watch for new or removed artifacts.
    ///
    /// Cargo scans a watched directory recursively, so only the shallowest
    /// directories are listed, and none that contains the build output.
    #[must_use]
    pub fn directories<'g>(&self, generated: &'g Generated) -> Vec<&'g Path> {
        let output = self.build_output();
        let mut picked: Vec<&Path> = Vec::new();
        for dir in &generated.watched {
            if self.out_dir.starts_with(dir) {
                continue;
            }
            if output.as_deref().is_some_and(|o| dir.starts_with(o)) {
                continue;
            }
            if picked.iter().any(|p| dir.starts_with(p)) {
                continue;
            }
            picked.push(dir);
        }
        picked
    }
}

/// Writes the generated file into `watch.out_dir` and the cargo directives
/// to `out`.
///
/// Without a root there is nothing to watch, so the missing root marker is
/// named instead; cargo reruns the script until it appears.
///
/// # Errors
///
/// Returns an error if writing either fails.
pub fn emit(
    generated: &Generated,
    diagnostics: &Diagnostics,
    watch: &Watch<'_>,
    out: &mut impl Write,
) -> Result<PathBuf> {
    let path = watch.out_dir.join(OUTPUT_FILE);
    let source = render_rust(generated);
    if std::fs::read_to_string(&path).ok().as_deref() == Some(source.as_str()) {
        debug!(path = %path.display(), "generated file unchanged");
    } else {
        std::fs::write(&path, source)?;
    }

    for name in [ENV_ROOT_PATH, ENV_PROJECT_DIR, ENV_RECORD, ENV_REPLAY] {
        writeln!(out, "cargo:rerun-if-env-changed={name}")?;
    }
    if generated.root.is_some() {
        for dir in watch.directories(generated) {
            writeln!(out, "cargo:rerun-if-changed={}", dir.display())?;
        }
    } else if let Some(project_dir) = &watch.project_dir {
        writeln!(out, "cargo:rerun-if-changed={}", project_dir.join(ROOT_MARKER).display())?;
    }
    diagnostics.write_cargo(out)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Descriptor, Diagnostic};

    fn watch(out_dir: &Path) -> Watch<'_> {
        Watch { out_dir, manifest_dir: None, project_dir: Some(PathBuf::from("/work/app")) }
    }

    #[test]
    fn writes_file_and_cargo_directives() {
        let dir = tempfile::tempdir().unwrap();
        let mut diagnostics = Diagnostics::new();
        diagnostics.report(Diagnostic::new(Descriptor::ROOT_NOT_FOUND, "no root"));
        let mut out = Vec::new();

        let path =
            emit(&Generated::default(), &diagnostics, &watch(dir.path()), &mut out).unwrap();

        assert_eq!(path, dir.path().join(OUTPUT_FILE));
        assert!(std::fs::read_to_string(&path).unwrap().starts_with("// @generated"));
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("cargo:rerun-if-env-changed=SOURCY_ROOT_PATH\n"));
        let marker = Path::new("/work/app").join(ROOT_MARKER);
        assert!(text.contains(&format!("cargo:rerun-if-changed={}\n", marker.display())));
        assert!(text.ends_with("cargo:warning=SOURCY001: no root\n"));
    }

    #[test]
    fn crawled_directories_are_watched() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("repo");
        let out_dir = root.join("target/debug/build/app-1234/out");
        std::fs::create_dir_all(&out_dir).unwrap();
        let generated = Generated {
            root: Some(root.display().to_string()),
            watched: ["", "src", "src/App", "target", "target/debug", "target/debug/deps", "web"]
                .iter()
                .map(|d| if d.is_empty() { root.clone() } else { root.join(d) })
                .collect(),
            ..Generated::default()
        };
        let watch = Watch { out_dir: &out_dir, manifest_dir: Some(root.clone()), project_dir: None };

        let mut out = Vec::new();
        emit(&generated, &Diagnostics::new(), &watch, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let watched: Vec<_> =
            text.lines().filter_map(|l| l.strip_prefix("cargo:rerun-if-changed=")).collect();
        let expected = [root.join("src"), root.join("web")];
        let expected: Vec<_> = expected.iter().map(|p| p.display().to_string()).collect();
        assert_eq!(watched, expected);
    }

    #[test]
    fn build_output_outside_the_manifest_tree_is_found() {
        let watch = Watch {
            out_dir: Path::new("/tmp/t/debug/build/x/out"),
            manifest_dir: Some(PathBuf::from("/tmp/repo")),
            project_dir: None,
        };
        assert_eq!(watch.build_output(), Some(PathBuf::from("/tmp/t")));
    }
}
