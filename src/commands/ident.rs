//! `sourcy ident` command.

use std::io::Write;
use std::sync::Arc;

use crate::context::ServiceContext;
use crate::error::Result;
use crate::ident::{sanitize_path_to_identifier, to_valid_identifier, UsedIdentifiers};

/// Executes the `ident` command: one identifier per input line, unique
/// across the whole invocation.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn run(
    ctx: &ServiceContext,
    inputs: &[String],
    extension: Option<&str>,
    as_path: bool,
    out: &mut impl Write,
) -> Result<()> {
    let mut used = UsedIdentifiers::new(Arc::clone(&ctx.id_gen));
    for input in inputs {
        let identifier = if as_path || extension.is_some() {
            used.claim(sanitize_path_to_identifier(input, extension))
        } else {
            to_valid_identifier(input, Some(&mut used))
        };
        writeln!(out, "{identifier}")?;
    }
    Ok(())
}
