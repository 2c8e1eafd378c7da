//! Expression formatting
//!
//! Turns a scalar expression into an argument usable inside native computed
//! expressions: `"$column"` for references, normalized values for literals,
//! `null`, or `{"$ifNull": [...]}` for coalesce.

use serde_json::{json, Value};

use crate::protocol::Expression;

use super::errors::{PushdownError, PushdownResult};
use super::normalize::normalize_typed_value;

/// Formats expressions, bounding coalesce nesting
#[derive(Debug, Clone, Copy)]
pub struct ExpressionFormatter {
    max_depth: usize,
}

impl ExpressionFormatter {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Formats an expression into a native argument
    pub fn format(&self, expr: &Expression) -> PushdownResult<Value> {
        self.format_at(expr, 1)
    }

    fn format_at(&self, expr: &Expression, depth: usize) -> PushdownResult<Value> {
        if depth > self.max_depth {
            return Err(PushdownError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        match expr {
            Expression::Column { name } => Ok(column_reference(name)),
            Expression::TypedValue { value } => normalize_typed_value(value),
            Expression::Null => Ok(Value::Null),
            Expression::Coalesce { operands } => {
                let mut formatted = Vec::with_capacity(operands.len());
                for operand in operands {
                    let value = self
                        .format_at(operand, depth + 1)
                        .map_err(|e| e.context("format coalesce expression"))?;
                    formatted.push(value);
                }
                Ok(json!({ "$ifNull": formatted }))
            }
            Expression::Unsupported => Err(PushdownError::UnimplementedExpression(format!(
                "type: {}",
                expr.kind()
            ))),
        }
    }
}

/// Symbolic column reference for computed expressions
pub fn column_reference(name: &str) -> Value {
    Value::String(format!("${name}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TypedValue;
    use crate::pushdown::errors::PushdownErrorCode;

    fn formatter() -> ExpressionFormatter {
        ExpressionFormatter::new(16)
    }

    #[test]
    fn test_column_reference() {
        assert_eq!(formatter().format(&Expression::column("a")).unwrap(), json!("$a"));
    }

    #[test]
    fn test_null_literal() {
        assert_eq!(formatter().format(&Expression::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_coalesce_preserves_order() {
        let expr = Expression::coalesce(vec![
            Expression::column("a"),
            Expression::Null,
            Expression::literal(TypedValue::int32(0)),
        ]);
        assert_eq!(
            formatter().format(&expr).unwrap(),
            json!({"$ifNull": ["$a", null, 0]})
        );
    }

    #[test]
    fn test_coalesce_fails_on_any_operand() {
        let expr = Expression::coalesce(vec![Expression::column("a"), Expression::Unsupported]);
        let err = formatter().format(&expr).unwrap_err();
        assert_eq!(err.code(), PushdownErrorCode::UnimplementedExpression);
        assert!(err.to_string().starts_with("format coalesce expression"));
    }

    #[test]
    fn test_nested_coalesce_depth_limit() {
        let mut expr = Expression::column("a");
        for _ in 0..4 {
            expr = Expression::coalesce(vec![expr]);
        }
        assert!(ExpressionFormatter::new(5).format(&expr).is_ok());

        let err = ExpressionFormatter::new(4).format(&expr).unwrap_err();
        assert_eq!(err.code(), PushdownErrorCode::DepthExceeded);
    }
}
