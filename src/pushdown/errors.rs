//! Pushdown error types
//!
//! Error codes:
//! - PUSHDOWN_UNIMPLEMENTED_PREDICATE_TYPE (tolerable)
//! - PUSHDOWN_UNIMPLEMENTED_EXPRESSION (tolerable)
//! - PUSHDOWN_UNIMPLEMENTED_OPERATION (tolerable)
//! - PUSHDOWN_UNIMPLEMENTED_TYPED_VALUE (tolerable)
//! - PUSHDOWN_MISSING_PROJECTION (fatal)
//! - PUSHDOWN_INVALID_PATTERN (fatal)
//! - PUSHDOWN_MALFORMED_TYPED_VALUE (fatal)
//! - PUSHDOWN_DEPTH_EXCEEDED (fatal)
//!
//! Tolerance is decided by [`crate::pushdown::policy::classify`]; this module
//! only names the failures.

use std::fmt;

use thiserror::Error;

/// Stable pushdown error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushdownErrorCode {
    UnimplementedPredicateType,
    UnimplementedExpression,
    UnimplementedOperation,
    UnimplementedTypedValue,
    MissingProjection,
    InvalidPattern,
    MalformedTypedValue,
    DepthExceeded,
}

impl PushdownErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnimplementedPredicateType => "PUSHDOWN_UNIMPLEMENTED_PREDICATE_TYPE",
            Self::UnimplementedExpression => "PUSHDOWN_UNIMPLEMENTED_EXPRESSION",
            Self::UnimplementedOperation => "PUSHDOWN_UNIMPLEMENTED_OPERATION",
            Self::UnimplementedTypedValue => "PUSHDOWN_UNIMPLEMENTED_TYPED_VALUE",
            Self::MissingProjection => "PUSHDOWN_MISSING_PROJECTION",
            Self::InvalidPattern => "PUSHDOWN_INVALID_PATTERN",
            Self::MalformedTypedValue => "PUSHDOWN_MALFORMED_TYPED_VALUE",
            Self::DepthExceeded => "PUSHDOWN_DEPTH_EXCEEDED",
        }
    }
}

impl fmt::Display for PushdownErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Failure while compiling a predicate tree into a native filter
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PushdownError {
    /// Predicate node kind with no native translation
    #[error("unimplemented predicate type, type: {0}")]
    UnimplementedPredicateType(String),

    /// Expression kind not allowed or not translatable at this position
    #[error("unimplemented expression: {0}")]
    UnimplementedExpression(String),

    /// Comparison operation with no native counterpart
    #[error("unimplemented operation, op: {0}")]
    UnimplementedOperation(String),

    /// Typed value kind or type outside the supported representation
    #[error("unimplemented typed value: {0}")]
    UnimplementedTypedValue(String),

    /// Projection absent or empty
    #[error("not specified columns to query in select")]
    MissingProjection,

    /// Pattern text absent, empty or not a string
    #[error("invalid pattern: {0}")]
    InvalidPattern(String),

    /// Typed literal without a payload
    #[error("malformed typed value: {0}")]
    MalformedTypedValue(String),

    /// Tree nested deeper than the configured limit
    #[error("nesting exceeds maximum depth of {limit}")]
    DepthExceeded { limit: usize },

    /// Wraps an inner failure with the location it propagated through
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<PushdownError>,
    },
}

impl PushdownError {
    /// Annotates this error with the step it propagated through
    pub fn context(self, context: impl Into<String>) -> Self {
        PushdownError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost, unannotated error
    pub fn root_cause(&self) -> &PushdownError {
        let mut current = self;
        while let PushdownError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// Returns the code of the root cause
    pub fn code(&self) -> PushdownErrorCode {
        match self.root_cause() {
            PushdownError::UnimplementedPredicateType(_) => {
                PushdownErrorCode::UnimplementedPredicateType
            }
            PushdownError::UnimplementedExpression(_) => PushdownErrorCode::UnimplementedExpression,
            PushdownError::UnimplementedOperation(_) => PushdownErrorCode::UnimplementedOperation,
            PushdownError::UnimplementedTypedValue(_) => PushdownErrorCode::UnimplementedTypedValue,
            PushdownError::MissingProjection => PushdownErrorCode::MissingProjection,
            PushdownError::InvalidPattern(_) => PushdownErrorCode::InvalidPattern,
            PushdownError::MalformedTypedValue(_) => PushdownErrorCode::MalformedTypedValue,
            PushdownError::DepthExceeded { .. } => PushdownErrorCode::DepthExceeded,
            // root_cause never stops on a Context layer
            PushdownError::Context { source, .. } => source.code(),
        }
    }
}

/// Result type for pushdown operations
pub type PushdownResult<T> = Result<T, PushdownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_code() {
        let err = PushdownError::UnimplementedOperation("unsupported".into())
            .context("get Comparison filter")
            .context("get Conjunction filter");

        assert_eq!(err.code(), PushdownErrorCode::UnimplementedOperation);
        assert_eq!(
            err.to_string(),
            "get Conjunction filter: get Comparison filter: unimplemented operation, op: unsupported"
        );
    }

    #[test]
    fn test_root_cause() {
        let err = PushdownError::MissingProjection.context("outer");
        assert_eq!(err.root_cause(), &PushdownError::MissingProjection);
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(
            PushdownErrorCode::UnimplementedPredicateType.code(),
            "PUSHDOWN_UNIMPLEMENTED_PREDICATE_TYPE"
        );
        assert_eq!(
            PushdownErrorCode::DepthExceeded.code(),
            "PUSHDOWN_DEPTH_EXCEEDED"
        );
    }
}
