//! pushdown CLI entry point
//!
//! Installs the tracing subscriber, then delegates everything to
//! `cli::run`. Errors go to stderr with a non-zero exit code.

use pushdown::cli;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() {
    init_tracing();

    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
