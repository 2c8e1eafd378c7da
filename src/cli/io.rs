//! JSON I/O handling for CLI
//!
//! - Input: JSON via stdin, one value per line for `filter`
//! - Output: one JSON object per line via stdout

use std::io::{BufRead, Write};

use serde::Serialize;
use serde_json::Value;

use super::errors::{CliError, CliResult};

/// Reads the whole input as a single JSON value
pub fn read_value<R: BufRead>(reader: &mut R) -> CliResult<Value> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;

    if input.trim().is_empty() {
        return Err(CliError::invalid_input("Empty input"));
    }

    Ok(serde_json::from_str(&input)?)
}

/// Reads JSON values one per line, skipping blank lines
pub fn read_lines<R: BufRead>(reader: R) -> impl Iterator<Item = CliResult<Value>> {
    reader.lines().filter_map(|line| match line {
        Ok(line) if line.trim().is_empty() => None,
        Ok(line) => Some(serde_json::from_str(&line).map_err(CliError::from)),
        Err(e) => Some(Err(CliError::from(e))),
    })
}

/// Writes a success response
pub fn write_response<W: Write, T: Serialize>(writer: &mut W, data: &T) -> CliResult<()> {
    let data = serde_json::to_value(data)?;
    let response = serde_json::json!({
        "status": "ok",
        "data": data
    });
    write_json(writer, &response)
}

/// Writes an error response
pub fn write_error<W: Write>(writer: &mut W, code: &str, message: &str) -> CliResult<()> {
    let response = serde_json::json!({
        "status": "error",
        "code": code,
        "message": message
    });
    write_json(writer, &response)
}

/// Writes one JSON value followed by a newline
pub fn write_json<W: Write>(writer: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
