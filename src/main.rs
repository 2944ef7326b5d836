//! Binary entrypoint for the `sourcy` CLI.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Loaded before parsing so clap's env fallbacks see `.env` values.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sourcy=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let stdout = std::io::stdout();
    match sourcy::run(std::env::args(), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            err.exit_code()
        }
    }
}
