//! Diagnostic sink trait and in-process implementations

use std::sync::Mutex;

use super::logger::Severity;

/// Destination for compiler diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]);

    fn info(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Info, event, fields);
    }

    fn warn(&self, event: &str, fields: &[(&str, &str)]) {
        self.log(Severity::Warn, event, fields);
    }
}

/// Forwards diagnostics to `tracing` under the `pushdown` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let details = fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ");

        match severity {
            Severity::Trace => tracing::trace!(target: "pushdown", event, %details),
            Severity::Info => tracing::info!(target: "pushdown", event, %details),
            Severity::Warn => tracing::warn!(target: "pushdown", event, %details),
            Severity::Error => tracing::error!(target: "pushdown", event, %details),
        }
    }
}

/// A recorded diagnostic event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggedEvent {
    pub severity: Severity,
    pub event: String,
    pub fields: Vec<(String, String)>,
}

impl LoggedEvent {
    /// Returns the value of a field, if present
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Records every event in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LoggedEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events
    pub fn events(&self) -> Vec<LoggedEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the recorded events with the given name
    pub fn events_named(&self, event: &str) -> Vec<LoggedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.event == event)
            .collect()
    }
}

impl DiagnosticSink for MemorySink {
    fn log(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let record = LoggedEvent {
            severity,
            event: event.to_string(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        };
        match self.events.lock() {
            Ok(mut events) => events.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}
