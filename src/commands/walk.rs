//! `sourcy walk` command.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::info;

use super::current_dir_or;
use crate::context::ServiceContext;
use crate::crawl::{SafeWalker, SkippedPath};
use crate::error::Result;

/// Arguments of `sourcy walk`.
#[derive(Debug, Clone, Default)]
pub struct Args {
    /// Directory to crawl.
    pub start: Option<PathBuf>,
    /// List files instead of directories.
    pub files: bool,
    /// Print skipped paths too.
    pub show_skipped: bool,
    /// Depth ceiling override.
    pub max_depth: Option<usize>,
}

/// Executes the `walk` command.
///
/// Each admitted path is printed on its own line. With `show_skipped`,
/// skips are printed as `skipped: <path> (<reason>)` right before the entry
/// whose discovery produced them.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable or writing fails.
pub fn run(ctx: &ServiceContext, args: &Args, out: &mut impl Write) -> Result<()> {
    let start = current_dir_or(args.start.clone())?;
    let mut walker = SafeWalker::new(ctx.platform.as_ref());
    if let Some(depth) = args.max_depth {
        walker = walker.with_max_depth(depth);
    }

    let pending: Rc<RefCell<Vec<SkippedPath>>> = Rc::default();
    let sink = Rc::clone(&pending);
    let record = move |skipped: &SkippedPath| sink.borrow_mut().push(skipped.clone());

    let entries: Box<dyn Iterator<Item = PathBuf> + '_> = if args.files {
        Box::new(walker.files(&start).with_skip_handler(record))
    } else {
        Box::new(walker.directories(&start).with_skip_handler(record))
    };

    let (mut admitted, mut skipped) = (0usize, 0usize);
    for entry in entries {
        skipped += flush(&pending, args.show_skipped, out)?;
        writeln!(out, "{}", entry.display())?;
        admitted += 1;
    }
    skipped += flush(&pending, args.show_skipped, out)?;
    info!(start = %start.display(), admitted, skipped, "walk finished");
    Ok(())
}

fn flush(
    pending: &RefCell<Vec<SkippedPath>>,
    show: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let drained: Vec<SkippedPath> = pending.borrow_mut().drain(..).collect();
    if show {
        for skipped in &drained {
            writeln!(out, "skipped: {skipped}")?;
        }
    }
    Ok(drained.len())
}
