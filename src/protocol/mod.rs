//! Inbound wire model for read requests
//!
//! These are the shapes the transport layer hands to the pushdown compiler:
//! a typed value system, scalar expressions, predicate trees and the
//! select/filtering envelope around them.
//!
//! Every tagged enum carries a `"kind"` discriminator. Kinds this build does
//! not know decode into an explicit `Unsupported` variant so the compiler can
//! classify them instead of the decoder rejecting the whole request.

mod ast;
mod request;
mod types;

pub use ast::{ComparisonOp, Expression, Predicate};
pub use request::{FilteringMode, Limit, ReadRequest, Select};
pub use types::{PrimitiveType, ScalarValue, TypeDescriptor, TypedValue, OBJECT_ID_TAG};
