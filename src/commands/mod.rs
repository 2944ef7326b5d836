//! Command dispatch and handlers.

pub mod generate;
pub mod ident;
pub mod root;
pub mod walk;

use std::io::Write;
use std::path::PathBuf;

use crate::cli::{Cli, Command};
use crate::context::ServiceContext;
use crate::diagnostics::Diagnostics;
use crate::error::Result;

/// Dispatches a parsed command, writing its output to `out`.
///
/// The service context comes from the environment: `SOURCY_REPLAY` and
/// `SOURCY_RECORD` select cassette-backed git and id ports.
///
/// # Errors
///
/// Returns an error if the context cannot be built or the handler fails.
pub fn dispatch(cli: &Cli, out: &mut impl Write) -> Result<()> {
    let ctx = ServiceContext::from_env()?;
    dispatch_with_context(cli, &ctx, out)
}

/// Dispatches a parsed command with the given service context.
///
/// # Errors
///
/// Returns an error if the handler fails.
pub fn dispatch_with_context(cli: &Cli, ctx: &ServiceContext, out: &mut impl Write) -> Result<()> {
    let mut diagnostics = if cli.verbose { Diagnostics::verbose() } else { Diagnostics::new() };
    let result = match &cli.command {
        Command::Generate { project_dir, root_path, out: file, format } => generate::run(
            ctx,
            generate::Args {
                project_dir: project_dir.clone(),
                root_path: root_path.clone(),
                out: file.clone(),
                format: *format,
            },
            &mut diagnostics,
            out,
        ),
        Command::Root { start, root_path } => {
            root::run(ctx, start.clone(), root_path.as_deref(), &mut diagnostics, out)
        }
        Command::Walk { start, files, show_skipped, max_depth } => walk::run(
            ctx,
            &walk::Args {
                start: start.clone(),
                files: *files,
                show_skipped: *show_skipped,
                max_depth: *max_depth,
            },
            out,
        ),
        Command::Ident { inputs, extension, path } => {
            ident::run(ctx, inputs, extension.as_deref(), *path, out)
        }
    };
    diagnostics.log();
    result
}

fn current_dir_or(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}
