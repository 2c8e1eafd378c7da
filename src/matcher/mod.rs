//! Native filter evaluation
//!
//! Evaluates a compiled native filter against JSON documents. Used for the
//! engine-side pass that restores correctness when a filter was only
//! partially pushed down, and to check compiled filters in tests.
//!
//! # Semantics
//!
//! - `$and`, `$or`, `$nor` over sub-filters
//! - Field conditions: `$exists`, `$eq`, `$ne`, `$in`, `$lt`, `$lte`, `$gt`,
//!   `$gte`, `$regex`; a bare value means equality
//! - `$eq: null` matches a missing or null field
//! - Field range operators only compare values of the same type bracket
//! - `$expr` evaluates computed expressions under a total cross-type order

mod compare;
mod errors;
mod expr;
mod filter;

pub use errors::{MatchError, MatchResult};
pub use filter::{filter_documents, matches};
