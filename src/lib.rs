//! Build-time generator of strongly-typed path constants for repository
//! artifacts.
//!
//! The core is a repository crawler: [`root`] finds the repository root,
//! [`crawl`] walks it safely and deterministically, and [`ident`] turns file
//! names into identifiers. [`generate`] ties them together for a build
//! script or the `sourcy` CLI.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod crawl;
pub mod diagnostics;
pub mod error;
pub mod generate;
pub mod ident;
pub mod paths;
pub mod ports;
pub mod root;

use std::io::Write;

use clap::error::ErrorKind;
use clap::Parser;

pub use error::{Result, SourcyError};

/// Runs the CLI with the provided arguments, writing command output to `out`.
///
/// # Errors
///
/// Returns an error when argument parsing or command execution fails.
pub fn run<I, T>(args: I, out: &mut impl Write) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match cli::Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            write!(out, "{err}")?;
            return Ok(());
        }
        Err(err) => return Err(SourcyError::Usage(err.to_string())),
    };
    commands::dispatch(&cli, out)
}
