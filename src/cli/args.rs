//! CLI argument definitions using clap
//!
//! Commands:
//! - pushdown [--log-format text|json] compile [--config <path>]
//! - pushdown [--log-format text|json] filter [--config <path>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Predicate pushdown compiler for document stores
#[derive(Parser, Debug)]
#[command(name = "pushdown")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Diagnostic output on stderr
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Diagnostic sink selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `tracing` events, filtered by `RUST_LOG`
    Text,
    /// One JSON object per event
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile one read request from stdin into a native query
    Compile {
        /// Path to compiler configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compile the request on the first stdin line, then print each
    /// following document that matches the compiled filter
    Filter {
        /// Path to compiler configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
