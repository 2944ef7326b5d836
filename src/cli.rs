//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{ENV_PROJECT_DIR, ENV_ROOT_PATH};
use crate::generate::OutputFormat;

/// Top-level CLI parser for `sourcy`.
#[derive(Debug, Parser)]
#[command(
    name = "sourcy",
    version,
    about = "Generate strongly-typed path constants for repository artifacts"
)]
pub struct Cli {
    /// Also report diagnostics that are off by default.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Resolve the root, crawl it and print the generated constants.
    Generate {
        /// Directory the root search starts from (defaults to the current one).
        #[arg(long, env = ENV_PROJECT_DIR)]
        project_dir: Option<PathBuf>,
        /// Use this directory as the root instead of searching.
        #[arg(long, env = ENV_ROOT_PATH)]
        root_path: Option<String>,
        /// Write to this file instead of standard output.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t)]
        format: OutputFormat,
    },
    /// Print the repository root for a directory.
    Root {
        /// Directory to search upward from (defaults to the current one).
        #[arg(long)]
        start: Option<PathBuf>,
        /// Use this directory as the root instead of searching.
        #[arg(long, env = ENV_ROOT_PATH)]
        root_path: Option<String>,
    },
    /// List the directories (or files) a crawl admits, in crawl order.
    Walk {
        /// Directory to crawl (defaults to the current one).
        #[arg(long)]
        start: Option<PathBuf>,
        /// List files instead of directories.
        #[arg(long)]
        files: bool,
        /// Also print every skipped path with its reason.
        #[arg(long)]
        show_skipped: bool,
        /// Deepest level entered below the start directory.
        #[arg(long)]
        max_depth: Option<usize>,
    },
    /// Turn strings into valid, unique identifiers.
    Ident {
        /// Strings to convert; duplicates get numbered suffixes.
        #[arg(required = true)]
        inputs: Vec<String>,
        /// Treat inputs as root-relative paths, removing this extension.
        #[arg(long)]
        extension: Option<String>,
        /// Treat inputs as root-relative paths.
        #[arg(long)]
        path: bool,
    },
}
