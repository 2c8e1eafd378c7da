//! Filtering policy
//!
//! Decides which translation failures a request may absorb. The decision is
//! made in two places: inside a conjunction authorised to suppress operand
//! failures, and once more by the compiler on whatever reaches the root.

use crate::protocol::FilteringMode;

use super::errors::{PushdownError, PushdownErrorCode};

/// Classification of a translation failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tolerance {
    /// Caused by a construct this backend cannot express; a downstream
    /// filter pass can compensate
    Tolerable,
    /// Malformed request or violated limit
    Fatal,
}

/// Classifies a failure by its root cause
pub fn classify(err: &PushdownError) -> Tolerance {
    match err.code() {
        PushdownErrorCode::UnimplementedPredicateType
        | PushdownErrorCode::UnimplementedExpression
        | PushdownErrorCode::UnimplementedOperation
        | PushdownErrorCode::UnimplementedTypedValue => Tolerance::Tolerable,
        PushdownErrorCode::MissingProjection
        | PushdownErrorCode::InvalidPattern
        | PushdownErrorCode::MalformedTypedValue
        | PushdownErrorCode::DepthExceeded => Tolerance::Fatal,
    }
}

/// Per-request view of the filtering mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilteringPolicy {
    mode: FilteringMode,
}

impl FilteringPolicy {
    pub fn new(mode: FilteringMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> FilteringMode {
        self.mode
    }

    /// Whether the root conjunction may replace failing operands with
    /// match-all. Only explicit optional filtering grants this.
    pub fn suppresses_conjunction_errors(&self) -> bool {
        self.mode == FilteringMode::Optional
    }

    /// Whether a failure reaching the root can be accepted, leaving the
    /// query unfiltered
    pub fn accepts(&self, err: &PushdownError) -> bool {
        match self.mode {
            FilteringMode::Mandatory => false,
            FilteringMode::Optional | FilteringMode::Unspecified => {
                classify(err) == Tolerance::Tolerable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tolerable() -> PushdownError {
        PushdownError::UnimplementedExpression("coalesce".into()).context("get IsNull filter")
    }

    fn fatal() -> PushdownError {
        PushdownError::InvalidPattern("empty".into())
    }

    #[test]
    fn test_classification() {
        assert_eq!(classify(&tolerable()), Tolerance::Tolerable);
        assert_eq!(
            classify(&PushdownError::UnimplementedTypedValue("x".into())),
            Tolerance::Tolerable
        );
        assert_eq!(classify(&fatal()), Tolerance::Fatal);
        assert_eq!(
            classify(&PushdownError::DepthExceeded { limit: 4 }),
            Tolerance::Fatal
        );
        assert_eq!(classify(&PushdownError::MissingProjection), Tolerance::Fatal);
    }

    #[test]
    fn test_only_optional_suppresses_in_translator() {
        assert!(FilteringPolicy::new(FilteringMode::Optional).suppresses_conjunction_errors());
        assert!(!FilteringPolicy::new(FilteringMode::Unspecified).suppresses_conjunction_errors());
        assert!(!FilteringPolicy::new(FilteringMode::Mandatory).suppresses_conjunction_errors());
    }

    #[test]
    fn test_mandatory_accepts_nothing() {
        let policy = FilteringPolicy::new(FilteringMode::Mandatory);
        assert!(!policy.accepts(&tolerable()));
        assert!(!policy.accepts(&fatal()));
    }

    #[test]
    fn test_non_mandatory_accepts_tolerable_only() {
        for mode in [FilteringMode::Optional, FilteringMode::Unspecified] {
            let policy = FilteringPolicy::new(mode);
            assert!(policy.accepts(&tolerable()));
            assert!(!policy.accepts(&fatal()));
        }
    }
}
