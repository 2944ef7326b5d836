//! `sourcy generate` command.

use std::io::Write;
use std::path::PathBuf;

use tracing::info;

use super::current_dir_or;
use crate::config::BuildProperties;
use crate::context::ServiceContext;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SourcyError};
use crate::generate::{self, render, OutputFormat};

/// Arguments of `sourcy generate`.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Directory the root search starts from.
    pub project_dir: Option<PathBuf>,
    /// Explicit root.
    pub root_path: Option<String>,
    /// Output file; standard output when absent.
    pub out: Option<PathBuf>,
    /// Output format.
    pub format: OutputFormat,
}

/// Executes the `generate` command.
///
/// # Errors
///
/// Returns [`SourcyError::RootNotFound`] when nothing could be generated, or
/// an I/O error if writing fails.
pub fn run(
    ctx: &ServiceContext,
    args: Args,
    diagnostics: &mut Diagnostics,
    out: &mut impl Write,
) -> Result<()> {
    let props = BuildProperties::from_env().with_overrides(args.project_dir, args.root_path);
    let start = current_dir_or(props.project_dir.clone())?;
    let props = BuildProperties { project_dir: Some(start.clone()), ..props };

    let generated = generate::generate(ctx, &props, diagnostics)?;
    if generated.root.is_none() {
        return Err(SourcyError::RootNotFound { start: start.display().to_string() });
    }

    let text = render(&generated, args.format)?;
    match args.out {
        Some(path) => {
            std::fs::write(&path, text)?;
            info!(path = %path.display(), "wrote generated constants");
        }
        None => out.write_all(text.as_bytes())?,
    }
    Ok(())
}
