//! CLI command implementations
//!
//! Commands are thin: parse JSON, call the compiler, print JSON. A compilation
//! failure is written as an error response, then returned as `CompileFailed`.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde_json::Value;

use crate::matcher;
use crate::observability::{DiagnosticSink, JsonLogger, TracingSink};
use crate::protocol::ReadRequest;
use crate::pushdown::{CompiledQuery, CompilerConfig, QueryCompiler};

use super::args::{Cli, Command, LogFormat};
use super::errors::{CliError, CliErrorCode, CliResult};
use super::io::{read_lines, read_value, write_error, write_json, write_response};

/// Parses arguments and runs the selected command against stdin/stdout
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    match cli.log_format {
        LogFormat::Text => run_command(cli.command, &TracingSink),
        LogFormat::Json => run_command(cli.command, &JsonLogger::stderr()),
    }
}

pub fn run_command(command: Command, sink: &dyn DiagnosticSink) -> CliResult<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();

    match command {
        Command::Compile { config } => {
            let config = load_config(config)?;
            compile(config, sink, &mut stdin.lock(), &mut stdout.lock())
        }
        Command::Filter { config } => {
            let config = load_config(config)?;
            filter(config, sink, stdin.lock(), &mut stdout.lock())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> CliResult<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::load(&path)?),
        None => Ok(CompilerConfig::default()),
    }
}

fn parse_request(value: Value) -> CliResult<ReadRequest> {
    serde_json::from_value(value)
        .map_err(|e| CliError::invalid_input(format!("invalid read request: {e}")))
}

/// Compiles, writing an error response on failure
fn compile_and_report<W: Write>(
    config: CompilerConfig,
    sink: &dyn DiagnosticSink,
    request: &ReadRequest,
    output: &mut W,
) -> CliResult<CompiledQuery> {
    let compiler = QueryCompiler::new(config, sink);
    compiler.compile_request(request).or_else(|e| {
        let message = e.to_string();
        write_error(output, e.code().code(), &message)?;
        Err(CliError::new(CliErrorCode::CompileFailed, message))
    })
}

/// `compile`: one request in, one response out
pub fn compile<R: BufRead, W: Write>(
    config: CompilerConfig,
    sink: &dyn DiagnosticSink,
    input: &mut R,
    output: &mut W,
) -> CliResult<()> {
    let request = parse_request(read_value(input)?)?;

    let query = compile_and_report(config, sink, &request, output)?;
    write_response(output, &query)
}

/// `filter`: request on the first line, documents on the rest
pub fn filter<R: BufRead, W: Write>(
    config: CompilerConfig,
    sink: &dyn DiagnosticSink,
    input: R,
    output: &mut W,
) -> CliResult<()> {
    let mut lines = read_lines(input);

    let request = match lines.next() {
        Some(first) => parse_request(first?)?,
        None => return Err(CliError::invalid_input("Empty input")),
    };

    let query = compile_and_report(config, sink, &request, output)?;

    for document in lines {
        let document = document?;
        if matcher::matches(&query.filter, &document)? {
            write_json(output, &document)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;
    use serde_json::json;

    fn run_compile(input: &str) -> (CliResult<()>, Value) {
        let sink = MemorySink::new();
        let mut out = Vec::new();
        let result = compile(
            CompilerConfig::default(),
            &sink,
            &mut input.as_bytes(),
            &mut out,
        );
        (result, serde_json::from_slice(&out).unwrap())
    }

    #[test]
    fn test_compile_ok() {
        let (result, response) = run_compile(
            r#"{"select": {"what": ["a"], "where": {"kind": "is_not_null", "value": {"kind": "column", "name": "a"}}}, "filtering": "mandatory"}"#,
        );
        assert!(result.is_ok());
        assert_eq!(response["status"], "ok");
        assert_eq!(response["data"]["filter"], json!({"a": {"$ne": null}}));
    }

    #[test]
    fn test_compile_error_response() {
        let (result, response) = run_compile(r#"{"select": {}}"#);
        assert_eq!(result.unwrap_err().code(), CliErrorCode::CompileFailed);
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "PUSHDOWN_MISSING_PROJECTION");
    }

    #[test]
    fn test_compile_logs_json_events() {
        let logger = JsonLogger::new(Vec::new());
        let mut out = Vec::new();
        compile(
            CompilerConfig::default(),
            &logger,
            &mut r#"{"select": {"what": ["a"], "where": {"kind": "json_exists"}}, "filtering": "optional"}"#.as_bytes(),
            &mut out,
        )
        .unwrap();

        let log = String::from_utf8(logger.into_inner()).unwrap();
        let event: Value = serde_json::from_str(log.trim()).unwrap();
        assert_eq!(event["event"], "PUSHDOWN_ERROR_ACCEPTED");
        assert_eq!(event["code"], "PUSHDOWN_UNIMPLEMENTED_PREDICATE_TYPE");
    }

    #[test]
    fn test_compile_rejects_malformed_request() {
        let sink = MemorySink::new();
        let mut out = Vec::new();
        let err = compile(
            CompilerConfig::default(),
            &sink,
            &mut r#"{"nope": 1}"#.as_bytes(),
            &mut out,
        )
        .unwrap_err();
        assert!(err.message().starts_with("invalid read request"));
    }

    #[test]
    fn test_filter_streams_matching_documents() {
        let input = concat!(
            r#"{"select": {"what": ["a"], "where": {"kind": "between", "value": {"kind": "column", "name": "a"}, "least": {"kind": "typed_value", "value": {"type": {"kind": "primitive", "id": "int32"}, "value": {"int32": 2}}}, "greatest": {"kind": "typed_value", "value": {"type": {"kind": "primitive", "id": "int32"}, "value": {"int32": 3}}}}}}"#,
            "\n",
            r#"{"a": 1}"#,
            "\n",
            r#"{"a": 2}"#,
            "\n",
            r#"{"a": 3}"#,
            "\n",
            r#"{"a": 4}"#,
            "\n",
        );

        let sink = MemorySink::new();
        let mut out = Vec::new();
        filter(CompilerConfig::default(), &sink, input.as_bytes(), &mut out).unwrap();

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines, vec![json!({"a": 2}), json!({"a": 3})]);
    }
}
