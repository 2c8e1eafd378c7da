//! Structured JSON logger
//!
//! - One log line = one event
//! - `event` first, `severity` second, remaining keys sorted
//! - Synchronous, no buffering

use std::fmt;
use std::io::{self, Write};
use std::sync::Mutex;

use serde_json::{Map, Value};

use super::sink::DiagnosticSink;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Trace = 0,
    Info = 1,
    /// Degraded but proceeding
    Warn = 2,
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sink writing JSON lines to any writer
pub struct JsonLogger<W: Write + Send> {
    writer: Mutex<W>,
}

impl JsonLogger<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> JsonLogger<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Renders one event as a JSON line
    pub fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut line = Map::with_capacity(fields.len() + 2);
        line.insert("event".into(), Value::from(event));
        line.insert("severity".into(), Value::from(severity.as_str()));

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            line.insert((*key).to_string(), Value::from(*value));
        }

        let mut output = Value::Object(line).to_string();
        output.push('\n');
        output
    }
}

impl<W: Write + Send> DiagnosticSink for JsonLogger<W> {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = Self::render(severity, event, fields);
        let mut writer = match self.writer.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        };
        // Diagnostics must never fail a compilation.
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}
