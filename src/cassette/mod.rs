//! Record/replay fixtures for the git and id ports.

pub mod format;
pub mod recorder;
pub mod replayer;

pub use format::{Cassette, Interaction};
pub use recorder::CassetteRecorder;
pub use replayer::CassetteReplayer;

use std::path::Path;

use crate::error::{Result, SourcyError};

/// Reads and parses the cassette at `path`.
///
/// # Errors
///
/// Returns [`SourcyError::Cassette`] if the file cannot be read or parsed.
pub fn load(path: &Path) -> Result<Cassette> {
    let content = std::fs::read_to_string(path).map_err(|e| SourcyError::Cassette {
        message: format!("failed to read {}: {e}", path.display()),
    })?;
    Cassette::from_yaml(&content).map_err(|e| SourcyError::Cassette {
        message: format!("failed to parse {}: {e}", path.display()),
    })
}
