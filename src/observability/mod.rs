//! Diagnostics for the pushdown compiler
//!
//! The compiler never logs through global state. Callers hand it a
//! [`DiagnosticSink`]; this module provides three:
//!
//! - [`TracingSink`] forwards events to the `tracing` ecosystem
//! - [`JsonLogger`] writes one deterministic JSON object per event
//! - [`MemorySink`] records events for inspection
//!
//! # Events
//!
//! - `PUSHDOWN_CONJUNCT_DROPPED`: a conjunction operand was replaced by
//!   match-all under optional filtering
//! - `PUSHDOWN_ERROR_ACCEPTED`: a tolerable failure was accepted at the top
//!   level and the query proceeds unfiltered

mod logger;
mod sink;

pub use logger::{JsonLogger, Severity};
pub use sink::{DiagnosticSink, LoggedEvent, MemorySink, TracingSink};

/// Event names emitted by the compiler
pub mod events {
    pub const CONJUNCT_DROPPED: &str = "PUSHDOWN_CONJUNCT_DROPPED";
    pub const ERROR_ACCEPTED: &str = "PUSHDOWN_ERROR_ACCEPTED";
}
