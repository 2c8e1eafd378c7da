//! pushdown - predicate pushdown compiler for document stores
//!
//! Translates backend-agnostic read requests (projection, pagination and a
//! typed predicate tree) into native document-store queries, honoring the
//! caller's filtering mode when parts of the filter cannot be expressed.

pub mod cli;
pub mod matcher;
pub mod observability;
pub mod protocol;
pub mod pushdown;
