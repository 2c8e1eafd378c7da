//! Filter evaluation errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MatchError {
    /// Filter is not a document, or a logical operator lacks an array
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Operator given the wrong argument shape
    #[error("invalid argument for {operator}: {reason}")]
    InvalidArgument { operator: String, reason: String },

    #[error("invalid regex {pattern:?}: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl MatchError {
    pub(crate) fn invalid_argument(operator: &str, reason: impl Into<String>) -> Self {
        MatchError::InvalidArgument {
            operator: operator.to_string(),
            reason: reason.into(),
        }
    }
}

pub type MatchResult<T> = Result<T, MatchError>;
