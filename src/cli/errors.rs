//! CLI-specific error types
//!
//! Compilation failures are reported twice: as an error response on stdout
//! and as `CompileFailed` so the process exits non-zero.

use std::fmt;
use std::io;

use crate::matcher::MatchError;
use crate::pushdown::ConfigError;

/// CLI error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Malformed request or document JSON
    InvalidInput,
    /// Request rejected by the compiler
    CompileFailed,
    /// Compiled filter could not be evaluated
    EvaluationFailed,
}

impl CliErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "PUSHDOWN_CLI_CONFIG_ERROR",
            Self::IoError => "PUSHDOWN_CLI_IO_ERROR",
            Self::InvalidInput => "PUSHDOWN_CLI_INVALID_INPUT",
            Self::CompileFailed => "PUSHDOWN_CLI_COMPILE_FAILED",
            Self::EvaluationFailed => "PUSHDOWN_CLI_EVALUATION_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    pub fn code(&self) -> CliErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::invalid_input(format!("JSON error: {}", e))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::new(CliErrorCode::ConfigError, e.to_string())
    }
}

impl From<MatchError> for CliError {
    fn from(e: MatchError) -> Self {
        Self::new(CliErrorCode::EvaluationFailed, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
