//! Predicate translation
//!
//! Recursively compiles a predicate tree into a native filter document.
//!
//! # Suppression
//!
//! `translate` takes an explicit `suppress` flag. Only a conjunction reads
//! it: when set, operands failing with a tolerable error are replaced by the
//! match-all document `{}` and a warning is logged. Every recursive call
//! passes `false`, so the flag never survives past the conjunction it was
//! handed to. The one exception is [`SuppressionScope::Transitive`], which
//! lets a suppressing conjunction pass the flag to its own operands.
//!
//! Negation and disjunction never degrade: dropping an operand of either
//! would change which rows match in both directions.

use serde_json::{json, Map, Value};

use crate::observability::{events, DiagnosticSink};
use crate::protocol::{ComparisonOp, Expression, Predicate, ScalarValue};

use super::config::{CompilerConfig, SuppressionScope};
use super::errors::{PushdownError, PushdownResult};
use super::expression::{column_reference, ExpressionFormatter};
use super::policy::{classify, Tolerance};

/// Filter document matching every row
pub fn match_all() -> Value {
    Value::Object(Map::new())
}

/// Single-key document `{key: value}`
fn doc(key: &str, value: Value) -> Value {
    let mut map = Map::with_capacity(1);
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Compiles predicate trees for one request
pub struct PredicateTranslator<'a> {
    config: &'a CompilerConfig,
    formatter: ExpressionFormatter,
    sink: &'a dyn DiagnosticSink,
    dropped: usize,
}

impl<'a> PredicateTranslator<'a> {
    pub fn new(config: &'a CompilerConfig, sink: &'a dyn DiagnosticSink) -> Self {
        Self {
            config,
            formatter: ExpressionFormatter::new(config.max_depth),
            sink,
            dropped: 0,
        }
    }

    /// Number of conjunction operands replaced by match-all so far
    pub fn dropped_conjuncts(&self) -> usize {
        self.dropped
    }

    /// Translates `predicate`. `suppress` applies to this level only.
    pub fn translate(&mut self, predicate: &Predicate, suppress: bool) -> PushdownResult<Value> {
        self.translate_at(predicate, suppress, 1)
    }

    fn translate_at(
        &mut self,
        predicate: &Predicate,
        suppress: bool,
        depth: usize,
    ) -> PushdownResult<Value> {
        if depth > self.config.max_depth {
            return Err(PushdownError::DepthExceeded {
                limit: self.config.max_depth,
            });
        }

        match predicate {
            Predicate::IsNull { value } => {
                is_null_filter(value).map_err(|e| e.context("get IsNull filter"))
            }
            Predicate::IsNotNull { value } => {
                is_not_null_filter(value).map_err(|e| e.context("get IsNotNull filter"))
            }
            Predicate::Negation { operand } => self
                .negation_filter(operand, depth)
                .map_err(|e| e.context("get Negation filter")),
            Predicate::Conjunction { operands } => self
                .conjunction_filter(operands, suppress, depth)
                .map_err(|e| e.context("get Conjunction filter")),
            Predicate::Disjunction { operands } => self
                .disjunction_filter(operands, depth)
                .map_err(|e| e.context("get Disjunction filter")),
            Predicate::Comparison {
                operation,
                left,
                right,
            } => self
                .comparison_filter(*operation, left, right)
                .map_err(|e| e.context("get Comparison filter")),
            Predicate::BoolExpression { value } => self
                .bool_filter(value)
                .map_err(|e| e.context("get BoolExpression filter")),
            Predicate::In { value, set } => self
                .in_set_filter(value, set)
                .map_err(|e| e.context("get In filter")),
            Predicate::Between {
                value,
                least,
                greatest,
            } => self
                .between_filter(value, least, greatest)
                .map_err(|e| e.context("get Between filter")),
            Predicate::Regexp { value, pattern } => self
                .regex_filter(value, pattern)
                .map_err(|e| e.context("get Regexp filter")),
            Predicate::Unsupported => Err(PushdownError::UnimplementedPredicateType(
                predicate.kind().to_string(),
            )),
        }
    }

    fn negation_filter(&mut self, operand: &Predicate, depth: usize) -> PushdownResult<Value> {
        let operand = self
            .translate_at(operand, false, depth + 1)
            .map_err(|e| e.context("unable to format negation operand predicate"))?;

        Ok(json!({ "$nor": [operand] }))
    }

    fn conjunction_filter(
        &mut self,
        operands: &[Predicate],
        suppress: bool,
        depth: usize,
    ) -> PushdownResult<Value> {
        let nested_suppress =
            suppress && self.config.suppression_scope == SuppressionScope::Transitive;
        let mut filters = Vec::with_capacity(operands.len());

        for operand in operands {
            match self.translate_at(operand, nested_suppress, depth + 1) {
                Ok(filter) => filters.push(filter),
                Err(err) => {
                    let err =
                        err.context("unable to format one of the predicates in conjunction");
                    if !suppress || classify(&err) == Tolerance::Fatal {
                        return Err(err);
                    }

                    let message = err.to_string();
                    self.sink.warn(
                        events::CONJUNCT_DROPPED,
                        &[("code", err.code().code()), ("error", message.as_str())],
                    );
                    self.dropped += 1;
                    filters.push(match_all());
                }
            }
        }

        Ok(json!({ "$and": filters }))
    }

    fn disjunction_filter(&mut self, operands: &[Predicate], depth: usize) -> PushdownResult<Value> {
        let mut filters = Vec::with_capacity(operands.len());

        for operand in operands {
            let filter = self
                .translate_at(operand, false, depth + 1)
                .map_err(|e| e.context("unable to format one of the predicates in disjunction"))?;
            filters.push(filter);
        }

        Ok(json!({ "$or": filters }))
    }

    fn comparison_filter(
        &self,
        operation: ComparisonOp,
        left: &Expression,
        right: &Expression,
    ) -> PushdownResult<Value> {
        if operation.is_string_match() {
            return string_comparison_filter(operation, left, right);
        }

        let op = match operation {
            ComparisonOp::Lt => "$lt",
            ComparisonOp::Le => "$lte",
            ComparisonOp::Eq => "$eq",
            ComparisonOp::Ne => "$ne",
            ComparisonOp::Ge => "$gte",
            ComparisonOp::Gt => "$gt",
            _ => {
                return Err(PushdownError::UnimplementedOperation(
                    operation.op_name().to_string(),
                ))
            }
        };

        let left = self
            .formatter
            .format(left)
            .map_err(|e| e.context("format left expression"))?;
        let right = self
            .formatter
            .format(right)
            .map_err(|e| e.context("format right expression"))?;

        Ok(doc("$expr", doc(op, json!([left, right]))))
    }

    fn bool_filter(&self, value: &Expression) -> PushdownResult<Value> {
        let expr = self
            .formatter
            .format(value)
            .map_err(|e| e.context("unable to format bool expression"))?;

        Ok(json!({ "$expr": { "$eq": [expr, true] } }))
    }

    fn in_set_filter(&self, value: &Expression, set: &[Expression]) -> PushdownResult<Value> {
        let field = require_column(value, "In")?;

        let mut members = Vec::with_capacity(set.len());
        for member in set {
            let formatted = self
                .formatter
                .format(member)
                .map_err(|e| e.context("format In set member"))?;
            members.push(formatted);
        }

        if set.iter().all(is_constant) {
            return Ok(doc(field, json!({ "$in": members })));
        }

        // Field-level operands are literals; computed members need `$expr`.
        Ok(doc(
            "$expr",
            json!({ "$in": [column_reference(field), members] }),
        ))
    }

    fn between_filter(
        &self,
        value: &Expression,
        least: &Expression,
        greatest: &Expression,
    ) -> PushdownResult<Value> {
        let field = require_column(value, "Between")?;
        let constant_bounds = is_constant(least) && is_constant(greatest);

        let least = self
            .formatter
            .format(least)
            .map_err(|e| e.context("format least expression"))?;
        let greatest = self
            .formatter
            .format(greatest)
            .map_err(|e| e.context("format greatest expression"))?;

        if constant_bounds {
            return Ok(doc(field, json!({ "$gte": least, "$lte": greatest })));
        }

        let column = column_reference(field);
        Ok(doc(
            "$expr",
            json!({
                "$and": [
                    { "$gte": [column.clone(), least] },
                    { "$lte": [column, greatest] }
                ]
            }),
        ))
    }

    fn regex_filter(&self, value: &Expression, pattern: &Expression) -> PushdownResult<Value> {
        let field = require_column(value, "Regexp")?;

        if matches!(pattern, Expression::Column { .. } | Expression::Coalesce { .. }) {
            return Err(PushdownError::UnimplementedExpression(format!(
                "unsupported pattern expression in Regexp filter: {}",
                pattern.kind()
            )));
        }

        let formatted = self
            .formatter
            .format(pattern)
            .map_err(|e| e.context("format regex pattern expression"))?;

        match formatted {
            Value::String(s) if !s.is_empty() => Ok(doc(field, doc("$regex", Value::String(s)))),
            other => Err(PushdownError::InvalidPattern(format!(
                "regex pattern must be non-empty text, got {other}"
            ))),
        }
    }
}

/// Literal or null: safe as a field-level operator operand
fn is_constant(expr: &Expression) -> bool {
    matches!(expr, Expression::TypedValue { .. } | Expression::Null)
}

fn require_column<'e>(value: &'e Expression, filter: &str) -> PushdownResult<&'e str> {
    value.as_column().ok_or_else(|| {
        PushdownError::UnimplementedExpression(format!(
            "unsupported expression {} in {filter} filter",
            value.kind()
        ))
    })
}

fn is_null_filter(value: &Expression) -> PushdownResult<Value> {
    let field = require_column(value, "IsNull")?;

    Ok(json!({
        "$or": [
            doc(field, json!({ "$exists": false })),
            doc(field, json!({ "$eq": null })),
        ]
    }))
}

fn is_not_null_filter(value: &Expression) -> PushdownResult<Value> {
    let field = require_column(value, "IsNotNull")?;

    Ok(doc(field, json!({ "$ne": null })))
}

/// STARTS_WITH / ENDS_WITH / CONTAINS as an anchored regex on a column.
/// The literal text is escaped so it only ever matches itself.
fn string_comparison_filter(
    operation: ComparisonOp,
    left: &Expression,
    right: &Expression,
) -> PushdownResult<Value> {
    let field = left.as_column().ok_or_else(|| {
        PushdownError::UnimplementedExpression(format!(
            "unsupported expression {} for left value in string comparison filter",
            left.kind()
        ))
    })?;

    let text = match right {
        Expression::TypedValue { value } => match &value.value {
            Some(ScalarValue::Text(text)) if !text.is_empty() => text,
            _ => {
                return Err(PushdownError::InvalidPattern(format!(
                    "failed to get string from right value in string comparison filter {}",
                    operation.op_name()
                )))
            }
        },
        other => {
            return Err(PushdownError::InvalidPattern(format!(
                "unsupported right value {} in string comparison filter {}",
                other.kind(),
                operation.op_name()
            )))
        }
    };

    let escaped = regex::escape(text);
    let pattern = match operation {
        ComparisonOp::StartsWith => format!("^{escaped}"),
        ComparisonOp::EndsWith => format!("{escaped}$"),
        ComparisonOp::Contains => escaped,
        other => {
            return Err(PushdownError::UnimplementedOperation(format!(
                "{} in string comparison",
                other.op_name()
            )))
        }
    };

    Ok(doc(field, json!({ "$regex": pattern })))
}
