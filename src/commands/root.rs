//! `sourcy root` command.

use std::io::Write;
use std::path::PathBuf;

use super::current_dir_or;
use crate::context::ServiceContext;
use crate::diagnostics::Diagnostics;
use crate::error::{Result, SourcyError};
use crate::root::RootResolver;

/// Executes the `root` command, printing the resolved root.
///
/// # Errors
///
/// Returns [`SourcyError::RootNotFound`] when no root could be resolved.
pub fn run(
    ctx: &ServiceContext,
    start: Option<PathBuf>,
    root_path: Option<&str>,
    diagnostics: &mut Diagnostics,
    out: &mut impl Write,
) -> Result<()> {
    let start = current_dir_or(start)?;
    let resolved = RootResolver::new(ctx.platform.as_ref())
        .with_cache(&ctx.root_cache)
        .resolve(Some(&start), root_path);
    diagnostics.notes(&resolved.notes);

    let root =
        resolved.root.ok_or_else(|| SourcyError::RootNotFound { start: start.display().to_string() })?;
    writeln!(out, "{root}")?;
    Ok(())
}
