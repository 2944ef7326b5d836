//! The generation pipeline: resolve the root, crawl it once, then run every
//! artifact generator and the git unit over the result.

pub mod artifacts;
pub mod build_script;
pub mod git;
pub mod render;

pub use artifacts::{all_generators, ArtifactGenerator, Entry, GeneratedModule};
pub use build_script::run_build_script;
pub use git::{GitMetadata, RetryPolicy};
pub use render::{render, render_rust, OutputFormat};

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::config::BuildProperties;
use crate::context::ServiceContext;
use crate::crawl::SafeWalker;
use crate::diagnostics::{Descriptor, Diagnostic, Diagnostics};
use crate::error::{Result, SourcyError};
use crate::ports::Platform;
use crate::root::{Root, RootResolver};

/// Everything one pass produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Generated {
    /// The resolved root; `None` when nothing was generated.
    pub root: Option<String>,
    /// One module per artifact generator.
    pub modules: Vec<GeneratedModule>,
    /// Git metadata, present whenever a root was found.
    pub git: Option<GitMetadata>,
    /// Directories the crawl listed; a build script reruns when any changes.
    #[serde(skip)]
    pub watched: Vec<PathBuf>,
}

/// Runs a generation pass.
///
/// A missing root is not an error: the notes explaining it are reported and
/// an empty [`Generated`] is returned.
pub async fn generate_async(
    ctx: &ServiceContext,
    props: &BuildProperties,
    diagnostics: &mut Diagnostics,
) -> Generated {
    let resolved = RootResolver::new(ctx.platform.as_ref())
        .with_cache(&ctx.root_cache)
        .resolve(props.project_dir.as_deref(), props.root_override.as_deref());
    diagnostics.notes(&resolved.notes);
    let Some(root) = resolved.root else {
        return Generated::default();
    };
    info!(root = %root, "generating");

    let (files, watched) = crawl(ctx.platform.as_ref(), &root, diagnostics);
    let mut modules = Vec::new();
    for generator in all_generators() {
        let ids = Arc::clone(&ctx.id_gen);
        let module =
            artifacts::generate_module(generator.as_ref(), &files, &root, ids, diagnostics);
        diagnostics.report(Diagnostic::new(
            Descriptor::GENERATION_SUCCESS,
            format!(
                "Successfully generated {} properties for {}",
                module.entries.len(),
                module.module
            ),
        ));
        modules.push(module);
    }

    let cwd = props.project_dir.clone().unwrap_or_else(|| root.path().to_path_buf());
    let git = git::git_metadata(ctx.git.as_ref(), &cwd, &root, &ctx.retry, diagnostics).await;

    Generated {
        root: Some(root.path().display().to_string()),
        modules,
        git: Some(git),
        watched,
    }
}

/// Blocking wrapper around [`generate_async`] on a current-thread runtime.
///
/// # Errors
///
/// Returns [`SourcyError::Runtime`] if the runtime cannot be built.
pub fn generate(
    ctx: &ServiceContext,
    props: &BuildProperties,
    diagnostics: &mut Diagnostics,
) -> Result<Generated> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| SourcyError::Runtime { message: e.to_string() })?;
    Ok(runtime.block_on(generate_async(ctx, props, diagnostics)))
}

/// Lists the files of one crawl along with the directories it entered.
fn crawl(
    platform: &dyn Platform,
    root: &Root,
    diagnostics: &mut Diagnostics,
) -> (Vec<PathBuf>, Vec<PathBuf>) {
    let mut entered = Vec::new();
    let files = SafeWalker::new(platform)
        .files(root.path())
        .with_skip_handler(|skipped| diagnostics.skipped(skipped))
        .with_enter_handler(|dir| entered.push(dir.to_path_buf()))
        .collect();
    (files, entered)
}
