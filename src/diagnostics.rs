//! User-facing diagnostics with stable identifiers.
//!
//! Nothing in the crawler or resolver fails loudly; the conditions they
//! observe are collected here and surfaced either as `cargo:warning=` lines
//! from a build script or through `tracing` from the CLI.

use std::fmt;
use std::io::{self, Write};

use serde::Serialize;
use tracing::{info, warn};

use crate::crawl::{SkipReason, SkippedPath};
use crate::root::ResolutionNote;

/// How loudly a diagnostic is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something the user should act on.
    Warning,
    /// Informational only.
    Info,
}

/// Static description of one kind of diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Descriptor {
    /// Stable identifier, e.g. `SOURCY001`.
    pub id: &'static str,
    /// Short title.
    pub title: &'static str,
    /// Default severity.
    pub severity: Severity,
    /// Whether the diagnostic is reported without verbose output.
    pub enabled_by_default: bool,
}

const fn descriptor(
    id: &'static str,
    title: &'static str,
    severity: Severity,
    enabled_by_default: bool,
) -> Descriptor {
    Descriptor { id, title, severity, enabled_by_default }
}

impl Descriptor {
    /// SOURCY001
    pub const ROOT_NOT_FOUND: Self =
        descriptor("SOURCY001", "Repository root not found", Severity::Warning, true);
    /// SOURCY002
    pub const FILE_SKIPPED: Self =
        descriptor("SOURCY002", "File skipped during generation", Severity::Info, true);
    /// SOURCY003
    pub const GENERATION_ERROR: Self =
        descriptor("SOURCY003", "Error during source generation", Severity::Warning, true);
    /// SOURCY004
    pub const GIT_COMMAND_FAILED: Self =
        descriptor("SOURCY004", "Git command failed", Severity::Warning, true);
    /// SOURCY005
    pub const GIT_NOT_AVAILABLE: Self =
        descriptor("SOURCY005", "Git is not available", Severity::Warning, true);
    /// SOURCY006
    pub const INVALID_IDENTIFIER: Self =
        descriptor("SOURCY006", "Invalid identifier sanitized", Severity::Info, false);
    /// SOURCY007
    pub const PATH_TOO_LONG: Self = descriptor("SOURCY007", "Path too long", Severity::Info, true);
    /// SOURCY008
    pub const ACCESS_DENIED: Self = descriptor("SOURCY008", "Access denied", Severity::Info, true);
    /// SOURCY009
    pub const INVALID_PATH: Self =
        descriptor("SOURCY009", "Invalid path characters", Severity::Warning, true);
    /// SOURCY010
    pub const INVALID_CUSTOM_ROOT: Self =
        descriptor("SOURCY010", "Invalid custom root", Severity::Warning, true);
    /// SOURCY011
    pub const CUSTOM_ROOT_USED: Self =
        descriptor("SOURCY011", "Custom root used", Severity::Info, true);
    /// SOURCY012
    pub const NETWORK_ROOT: Self =
        descriptor("SOURCY012", "Network/UNC root", Severity::Warning, true);
    /// SOURCY013
    pub const SHALLOW_CLONE: Self = descriptor("SOURCY013", "Shallow clone", Severity::Info, true);
    /// SOURCY014
    pub const NESTED_CHECKOUT: Self =
        descriptor("SOURCY014", "Nested checkout (submodule)", Severity::Info, true);
    /// SOURCY015
    pub const NO_PROJECT_DIR: Self =
        descriptor("SOURCY015", "No project directory", Severity::Warning, true);
    /// SOURCY100
    pub const GENERATION_SUCCESS: Self =
        descriptor("SOURCY100", "Generation successful", Severity::Info, false);
    /// SOURCY101
    pub const FALLBACK_USED: Self =
        descriptor("SOURCY101", "Fallback value used", Severity::Info, true);

    /// Every descriptor, ordered by id.
    pub const ALL: [Self; 17] = [
        Self::ROOT_NOT_FOUND,
        Self::FILE_SKIPPED,
        Self::GENERATION_ERROR,
        Self::GIT_COMMAND_FAILED,
        Self::GIT_NOT_AVAILABLE,
        Self::INVALID_IDENTIFIER,
        Self::PATH_TOO_LONG,
        Self::ACCESS_DENIED,
        Self::INVALID_PATH,
        Self::INVALID_CUSTOM_ROOT,
        Self::CUSTOM_ROOT_USED,
        Self::NETWORK_ROOT,
        Self::SHALLOW_CLONE,
        Self::NESTED_CHECKOUT,
        Self::NO_PROJECT_DIR,
        Self::GENERATION_SUCCESS,
        Self::FALLBACK_USED,
    ];
}

/// One reported condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// What kind of condition this is.
    pub descriptor: Descriptor,
    /// Rendered message.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic from a descriptor and message.
    pub fn new(descriptor: Descriptor, message: impl Into<String>) -> Self {
        Self { descriptor, message: message.into() }
    }

    /// Stable identifier of the descriptor.
    #[must_use]
    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }

    /// Maps a walker skip to its diagnostic.
    #[must_use]
    pub fn from_skip(skipped: &SkippedPath) -> Self {
        let path = skipped.path.display();
        match skipped.reason {
            SkipReason::PathTooLong => Self::new(
                Descriptor::PATH_TOO_LONG,
                format!("Path '{path}' exceeds system limits and was skipped"),
            ),
            SkipReason::UnauthorizedAccess => Self::new(
                Descriptor::ACCESS_DENIED,
                format!("Access denied to '{path}' - file/directory skipped"),
            ),
            _ => Self::new(
                Descriptor::FILE_SKIPPED,
                format!("File '{path}' was skipped: {}", skip_detail(skipped)),
            ),
        }
    }

    /// Maps a root resolution note to its diagnostic.
    #[must_use]
    pub fn from_note(note: &ResolutionNote) -> Self {
        match note {
            ResolutionNote::CustomRootUsed(path) => Self::new(
                Descriptor::CUSTOM_ROOT_USED,
                format!("Using custom root '{}'", path.display()),
            ),
            ResolutionNote::InvalidCustomRoot(raw) => Self::new(
                Descriptor::INVALID_CUSTOM_ROOT,
                format!("Custom root '{raw}' does not exist; falling back to auto-detection"),
            ),
            ResolutionNote::NoProjectDir => Self::new(
                Descriptor::NO_PROJECT_DIR,
                "No project directory was provided; generation skipped",
            ),
            ResolutionNote::RootNotFound(start) => Self::new(
                Descriptor::ROOT_NOT_FOUND,
                format!(
                    "Could not find repository root above '{}'. Ensure a .git directory or \
                     .sourcyroot file exists in a parent directory.",
                    start.display()
                ),
            ),
            ResolutionNote::NetworkRoot(path) => Self::new(
                Descriptor::NETWORK_ROOT,
                format!("Root '{}' is on a network share; crawling may be slow", path.display()),
            ),
            ResolutionNote::ShallowClone(path) => Self::new(
                Descriptor::SHALLOW_CLONE,
                format!("Repository at '{}' is a shallow clone", path.display()),
            ),
            ResolutionNote::NestedCheckout(path) => Self::new(
                Descriptor::NESTED_CHECKOUT,
                format!("Repository at '{}' is a submodule of a larger checkout", path.display()),
            ),
        }
    }
}

fn skip_detail(skipped: &SkippedPath) -> String {
    match (&skipped.target, skipped.depth) {
        (Some(target), _) => format!("{} (target '{}')", skipped.reason, target.display()),
        (None, Some(depth)) => format!("{} (depth {depth})", skipped.reason),
        (None, None) => skipped.reason.to_string(),
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.descriptor.id, self.message)
    }
}

/// Collects diagnostics for one generation pass.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
    verbose: bool,
}

impl Diagnostics {
    /// Creates a sink keeping only descriptors enabled by default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that also keeps descriptors disabled by default.
    #[must_use]
    pub fn verbose() -> Self {
        Self { items: Vec::new(), verbose: true }
    }

    /// Records `diagnostic` unless its descriptor is disabled.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        if self.verbose || diagnostic.descriptor.enabled_by_default {
            self.items.push(diagnostic);
        }
    }

    /// Records a walker skip.
    pub fn skipped(&mut self, skipped: &SkippedPath) {
        self.report(Diagnostic::from_skip(skipped));
    }

    /// Records every resolution note.
    pub fn notes(&mut self, notes: &[ResolutionNote]) {
        for note in notes {
            self.report(Diagnostic::from_note(note));
        }
    }

    /// Collected diagnostics in report order.
    #[must_use]
    pub fn items(&self) -> &[Diagnostic] {
        &self.items
    }

    /// Whether any diagnostic with `id` was recorded.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|d| d.descriptor.id == id)
    }

    /// Number of collected diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Writes warnings as `cargo:warning=` lines; info diagnostics too when
    /// the sink is verbose.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `out` fails.
    pub fn write_cargo(&self, out: &mut impl Write) -> io::Result<()> {
        for diagnostic in &self.items {
            if diagnostic.descriptor.severity == Severity::Warning || self.verbose {
                writeln!(out, "cargo:warning={diagnostic}")?;
            }
        }
        Ok(())
    }

    /// Emits every diagnostic through `tracing`.
    pub fn log(&self) {
        for diagnostic in &self.items {
            match diagnostic.descriptor.severity {
                Severity::Warning => warn!(id = diagnostic.id(), "{}", diagnostic.message),
                Severity::Info => info!(id = diagnostic.id(), "{}", diagnostic.message),
            }
        }
    }
}
