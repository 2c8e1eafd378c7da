//! Query compilation
//!
//! Entry point of the pushdown subsystem: builds the projection and
//! pagination, translates the filter and applies the filtering policy to
//! whatever failure reaches the root.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::observability::{events, DiagnosticSink};
use crate::protocol::{FilteringMode, Limit, ReadRequest, Select};

use super::config::CompilerConfig;
use super::errors::{PushdownError, PushdownResult};
use super::policy::FilteringPolicy;
use super::predicate::{match_all, PredicateTranslator};

/// Ordered projected columns, each included with weight 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection(Vec<String>);

impl Projection {
    pub fn columns(&self) -> &[String] {
        &self.0
    }

    /// Native `{column: 1, ...}` document
    pub fn to_document(&self) -> Value {
        let mut map = Map::with_capacity(self.0.len());
        for column in &self.0 {
            map.insert(column.clone(), Value::from(1));
        }
        Value::Object(map)
    }
}

impl Serialize for Projection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_document().serialize(serializer)
    }
}

/// Native skip/limit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: i64,
    pub limit: i64,
}

impl From<Limit> for Pagination {
    fn from(limit: Limit) -> Self {
        // Passed through verbatim; values past i64::MAX wrap like the
        // driver's signed fields.
        Self {
            skip: limit.offset as i64,
            limit: limit.limit as i64,
        }
    }
}

/// How faithfully the compiled filter reflects the requested one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fidelity {
    /// Filter fully pushed down
    Exact,
    /// Some conjunction operands replaced by match-all
    Relaxed { dropped_conjuncts: usize },
    /// Filter dropped entirely after an accepted failure
    Unfiltered,
}

/// Compiled native query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub filter: Value,
    pub projection: Projection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    pub fidelity: Fidelity,
}

/// Compiles read requests into native queries
pub struct QueryCompiler<'a> {
    config: CompilerConfig,
    sink: &'a dyn DiagnosticSink,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(config: CompilerConfig, sink: &'a dyn DiagnosticSink) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compiles a full read request
    pub fn compile_request(&self, request: &ReadRequest) -> PushdownResult<CompiledQuery> {
        self.compile(&request.select, request.filtering)
    }

    /// Compiles a select under the given filtering mode
    pub fn compile(&self, select: &Select, filtering: FilteringMode) -> PushdownResult<CompiledQuery> {
        let projection = match &select.what {
            Some(columns) if !columns.is_empty() => Projection(columns.clone()),
            _ => return Err(PushdownError::MissingProjection),
        };

        let pagination = select.limit.map(Pagination::from);

        let Some(predicate) = &select.filter else {
            return Ok(CompiledQuery {
                filter: match_all(),
                projection,
                pagination,
                fidelity: Fidelity::Exact,
            });
        };

        let policy = FilteringPolicy::new(filtering);
        let mut translator = PredicateTranslator::new(&self.config, self.sink);

        let (filter, fidelity) =
            match translator.translate(predicate, policy.suppresses_conjunction_errors()) {
                Ok(filter) => {
                    let fidelity = match translator.dropped_conjuncts() {
                        0 => Fidelity::Exact,
                        dropped => Fidelity::Relaxed {
                            dropped_conjuncts: dropped,
                        },
                    };
                    (filter, fidelity)
                }
                Err(err) if policy.accepts(&err) => {
                    let message = err.to_string();
                    self.sink.warn(
                        events::ERROR_ACCEPTED,
                        &[
                            ("code", err.code().code()),
                            ("error", message.as_str()),
                            ("filtering", filtering.as_str()),
                        ],
                    );
                    (match_all(), Fidelity::Unfiltered)
                }
                Err(err) => return Err(err.context("encountered an error making a filter")),
            };

        Ok(CompiledQuery {
            filter,
            projection,
            pagination,
            fidelity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::MemorySink;
    use crate::protocol::{ComparisonOp, Expression, Predicate, TypedValue};
    use crate::pushdown::errors::PushdownErrorCode;
    use serde_json::json;

    fn unsupported_cmp() -> Predicate {
        Predicate::compare(
            ComparisonOp::Unsupported,
            Expression::column("a"),
            Expression::literal(TypedValue::int32(1)),
        )
    }

    #[test]
    fn test_missing_projection() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);

        let err = compiler
            .compile(&Select::default(), FilteringMode::Optional)
            .unwrap_err();
        assert_eq!(err.code(), PushdownErrorCode::MissingProjection);

        let empty = Select::new(Vec::<String>::new());
        let err = compiler.compile(&empty, FilteringMode::Optional).unwrap_err();
        assert_eq!(err.code(), PushdownErrorCode::MissingProjection);
    }

    #[test]
    fn test_projection_and_pagination() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);

        let query = compiler
            .compile(&Select::new(["b", "a"]).with_limit(10, 5), FilteringMode::Mandatory)
            .unwrap();

        assert_eq!(query.filter, json!({}));
        assert_eq!(query.projection.columns(), ["b", "a"]);
        assert_eq!(
            serde_json::to_string(&query.projection).unwrap(),
            r#"{"b":1,"a":1}"#
        );
        assert_eq!(query.pagination, Some(Pagination { skip: 10, limit: 5 }));
        assert_eq!(query.fidelity, Fidelity::Exact);
    }

    #[test]
    fn test_no_pagination() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let query = compiler
            .compile(&Select::new(["a"]), FilteringMode::Unspecified)
            .unwrap();
        assert!(query.pagination.is_none());
    }

    #[test]
    fn test_mandatory_propagates_tolerable() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let select = Select::new(["a"]).with_filter(unsupported_cmp());

        let err = compiler.compile(&select, FilteringMode::Mandatory).unwrap_err();
        assert_eq!(err.code(), PushdownErrorCode::UnimplementedOperation);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_optional_accepts_tolerable_at_root() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let select = Select::new(["a"]).with_filter(unsupported_cmp());

        let query = compiler.compile(&select, FilteringMode::Optional).unwrap();
        assert_eq!(query.filter, json!({}));
        assert_eq!(query.fidelity, Fidelity::Unfiltered);

        let accepted = sink.events_named(events::ERROR_ACCEPTED);
        assert_eq!(accepted.len(), 1);
        assert_eq!(
            accepted[0].field("code"),
            Some("PUSHDOWN_UNIMPLEMENTED_OPERATION")
        );
    }

    #[test]
    fn test_relaxed_fidelity() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let select = Select::new(["a"]).with_filter(Predicate::and(vec![
            Predicate::is_not_null(Expression::column("a")),
            unsupported_cmp(),
        ]));

        let query = compiler.compile(&select, FilteringMode::Optional).unwrap();
        assert_eq!(
            query.fidelity,
            Fidelity::Relaxed {
                dropped_conjuncts: 1
            }
        );
    }

    #[test]
    fn test_fatal_aborts_in_every_mode() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let select = Select::new(["a"]).with_filter(Predicate::compare(
            ComparisonOp::EndsWith,
            Expression::column("a"),
            Expression::literal(TypedValue::text("")),
        ));

        for mode in [
            FilteringMode::Mandatory,
            FilteringMode::Optional,
            FilteringMode::Unspecified,
        ] {
            let err = compiler.compile(&select, mode).unwrap_err();
            assert_eq!(err.code(), PushdownErrorCode::InvalidPattern);
        }
    }

    #[test]
    fn test_serialized_query() {
        let sink = MemorySink::new();
        let compiler = QueryCompiler::new(CompilerConfig::default(), &sink);
        let query = compiler
            .compile(
                &Select::new(["a"])
                    .with_limit(0, 3)
                    .with_filter(Predicate::eq("a", TypedValue::int32(2))),
                FilteringMode::Mandatory,
            )
            .unwrap();

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "filter": {"$expr": {"$eq": ["$a", 2]}},
                "projection": {"a": 1},
                "pagination": {"skip": 0, "limit": 3},
                "fidelity": {"kind": "exact"}
            })
        );
    }
}
