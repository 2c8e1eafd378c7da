//! Predicate pushdown compiler
//!
//! Compiles a backend-agnostic read request (projection, pagination and a
//! typed predicate tree) into a native document-store query.
//!
//! # Layers
//!
//! - `compiler`: projection, pagination, root-level policy decision
//! - `predicate`: recursive predicate translation, conjunction suppression
//! - `expression`: column references, literals, null, coalesce
//! - `normalize`: typed values to native scalars and document identifiers
//! - `policy`: tolerable vs fatal classification per filtering mode
//!
//! Compilation is synchronous and pure: no I/O, no shared state. The only
//! side effect is diagnostics sent to the injected sink.

mod compiler;
mod config;
mod document_id;
mod errors;
mod expression;
mod normalize;
mod policy;
mod predicate;

pub use compiler::{CompiledQuery, Fidelity, Pagination, Projection, QueryCompiler};
pub use config::{CompilerConfig, ConfigError, ConfigResult, SuppressionScope, DEFAULT_MAX_DEPTH};
pub use document_id::{DocumentId, DocumentIdError, DOCUMENT_ID_LEN};
pub use errors::{PushdownError, PushdownErrorCode, PushdownResult};
pub use expression::ExpressionFormatter;
pub use normalize::normalize_typed_value;
pub use policy::{classify, FilteringPolicy, Tolerance};
pub use predicate::{match_all, PredicateTranslator};
