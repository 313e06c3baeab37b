//! aerofilter CLI entry point
//!
//! Installs logging on stderr, delegates to the CLI module and maps
//! failures to a JSON error on stdout and a per-kind exit code.

use aerofilter::cli;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run() {
        if cli::write_error(e.code_str(), e.message()).is_err() {
            eprintln!("{}", e);
        }
        std::process::exit(e.exit_code());
    }
}
