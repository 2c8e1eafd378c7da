//! Compiler configuration
//!
//! All fields are optional in the JSON form and fall back to the defaults
//! below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default maximum nesting of predicates and expressions
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How far conjunction-level error suppression reaches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuppressionScope {
    /// Only the conjunction handed the flag by the compiler suppresses.
    #[default]
    Shallow,
    /// Conjunctions nested directly in a suppressing conjunction suppress too.
    /// Negations and disjunctions still translate strictly.
    Transitive,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Pushdown compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Maximum predicate/expression nesting before failing fast
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default)]
    pub suppression_scope: SuppressionScope,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            suppression_scope: SuppressionScope::Shallow,
        }
    }
}

impl CompilerConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_suppression_scope(mut self, scope: SuppressionScope) -> Self {
        self.suppression_scope = scope;
        self
    }

    /// Parses and validates a JSON config
    pub fn from_json(s: &str) -> ConfigResult<Self> {
        let config: CompilerConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a JSON config file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be positive".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CompilerConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.suppression_scope, SuppressionScope::Shallow);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = CompilerConfig::from_json("{}").unwrap();
        assert_eq!(config, CompilerConfig::default());
    }

    #[test]
    fn test_transitive_scope() {
        let config =
            CompilerConfig::from_json(r#"{"suppression_scope": "transitive", "max_depth": 8}"#)
                .unwrap();
        assert_eq!(config.suppression_scope, SuppressionScope::Transitive);
        assert_eq!(config.max_depth, 8);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let err = CompilerConfig::from_json(r#"{"max_depth": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_scope_rejected() {
        let err = CompilerConfig::from_json(r#"{"suppression_scope": "deep"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
