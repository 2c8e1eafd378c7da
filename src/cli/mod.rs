//! CLI module
//!
//! Provides command-line access to the compiler:
//! - compile: one read request in, one native query out
//! - filter: compile a request, then filter a stream of documents with it

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, LogFormat};
pub use commands::{compile, filter, run, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};
