//! Build properties: where to start looking for the root, and an optional
//! explicit root.
//!
//! Values come from CLI flags, then the process environment, then a `.env`
//! file. `.env` never overrides a variable that is already set.

use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

/// Explicit repository root.
pub const ENV_ROOT_PATH: &str = "SOURCY_ROOT_PATH";

/// Project directory the root search starts from.
pub const ENV_PROJECT_DIR: &str = "SOURCY_PROJECT_DIR";

/// Project directory of a build script, used when [`ENV_PROJECT_DIR`] is unset.
pub const ENV_MANIFEST_DIR: &str = "CARGO_MANIFEST_DIR";

/// Cassette file to record git and id interactions into.
pub const ENV_RECORD: &str = "SOURCY_RECORD";

/// Cassette file to replay git and id interactions from.
pub const ENV_REPLAY: &str = "SOURCY_REPLAY";

/// The property bag a generation pass runs with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildProperties {
    /// Directory the upward root search starts from.
    pub project_dir: Option<PathBuf>,
    /// Explicit root; used when it names an existing directory.
    pub root_override: Option<String>,
}

impl BuildProperties {
    /// Reads the properties from the environment after loading `.env`.
    #[must_use]
    pub fn from_env() -> Self {
        load_dotenv();
        Self::from_lookup(env_lookup)
    }

    /// Like [`from_env`](Self::from_env), falling back to the crate being
    /// built as the project directory.
    #[must_use]
    pub fn for_build_script() -> Self {
        load_dotenv();
        Self::build_script_from_lookup(env_lookup)
    }

    /// Reads the properties through `lookup`; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        Self { project_dir: get(ENV_PROJECT_DIR).map(PathBuf::from), root_override: get(ENV_ROOT_PATH) }
    }

    /// Like [`from_lookup`](Self::from_lookup), with [`ENV_MANIFEST_DIR`] as
    /// the project directory fallback.
    pub fn build_script_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let manifest_dir = lookup(ENV_MANIFEST_DIR).filter(|v| !v.trim().is_empty());
        let mut props = Self::from_lookup(lookup);
        if props.project_dir.is_none() {
            props.project_dir = manifest_dir.map(PathBuf::from);
        }
        props
    }

    /// Replaces values with the ones given on the command line.
    #[must_use]
    pub fn with_overrides(
        mut self,
        project_dir: Option<PathBuf>,
        root_override: Option<String>,
    ) -> Self {
        if project_dir.is_some() {
            self.project_dir = project_dir;
        }
        if root_override.is_some() {
            self.root_override = root_override;
        }
        self
    }
}

fn load_dotenv() {
    if let Ok(path) = dotenvy::dotenv() {
        debug!(path = %path.display(), "loaded .env");
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}
