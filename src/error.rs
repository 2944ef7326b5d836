//! Error types and exit codes for `sourcy`.

use std::process::ExitCode;

use thiserror::Error;

/// Main error type for `sourcy` operations.
///
/// The crawler, root resolver and identifier sanitizer never produce these for
/// expected filesystem conditions; they report skips instead. Errors here are
/// reserved for failures at the command boundary.
#[derive(Error, Debug)]
pub enum SourcyError {
    /// Command-line arguments could not be parsed.
    #[error("{0}")]
    Usage(String),

    /// No repository root could be located.
    #[error("Repository root not found from '{start}'")]
    RootNotFound {
        /// The directory the upward search started from.
        start: String,
    },

    /// A required environment variable is missing.
    #[error("Environment variable {name} is not set")]
    MissingEnv {
        /// Name of the variable.
        name: &'static str,
    },

    /// A cassette could not be read, parsed or written.
    #[error("Cassette error: {message}")]
    Cassette {
        /// Human-readable description of the failure.
        message: String,
    },

    /// The async runtime could not be started.
    #[error("Runtime error: {message}")]
    Runtime {
        /// Human-readable description of the failure.
        message: String,
    },

    /// JSON serialization failed.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other I/O failure at the command boundary.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SourcyError {
    /// Converts the error into a process exit code:
    /// - 1: I/O or serialization failure
    /// - 2: usage error
    /// - 3: root not found
    /// - 4: cassette or runtime failure
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) | Self::Serialize(_) => ExitCode::from(1),
            Self::Usage(_) | Self::MissingEnv { .. } => ExitCode::from(2),
            Self::RootNotFound { .. } => ExitCode::from(3),
            Self::Cassette { .. } | Self::Runtime { .. } => ExitCode::from(4),
        }
    }
}

/// Result type alias for `sourcy` operations.
pub type Result<T> = std::result::Result<T, SourcyError>;
