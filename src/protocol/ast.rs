//! Scalar expression and predicate trees
//!
//! Trees are produced once by the caller and only read by the compiler.

use serde::{Deserialize, Serialize};

use super::types::TypedValue;

/// Comparison operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOp {
    Lt,
    Le,
    Eq,
    Ne,
    Ge,
    Gt,
    StartsWith,
    EndsWith,
    Contains,
    #[serde(other)]
    Unsupported,
}

impl ComparisonOp {
    /// Returns the operation name for diagnostics
    pub fn op_name(&self) -> &'static str {
        match self {
            ComparisonOp::Lt => "lt",
            ComparisonOp::Le => "le",
            ComparisonOp::Eq => "eq",
            ComparisonOp::Ne => "ne",
            ComparisonOp::Ge => "ge",
            ComparisonOp::Gt => "gt",
            ComparisonOp::StartsWith => "starts_with",
            ComparisonOp::EndsWith => "ends_with",
            ComparisonOp::Contains => "contains",
            ComparisonOp::Unsupported => "unsupported",
        }
    }

    /// Returns true for the substring-style operations
    pub fn is_string_match(&self) -> bool {
        matches!(
            self,
            ComparisonOp::StartsWith | ComparisonOp::EndsWith | ComparisonOp::Contains
        )
    }
}

/// Scalar expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expression {
    /// Reference to a column by name
    Column { name: String },
    /// Typed literal
    TypedValue { value: TypedValue },
    /// The null literal
    Null,
    /// First non-null operand, in order
    Coalesce { operands: Vec<Expression> },
    #[serde(other)]
    Unsupported,
}

impl Expression {
    pub fn column(name: impl Into<String>) -> Self {
        Expression::Column { name: name.into() }
    }

    pub fn literal(value: TypedValue) -> Self {
        Expression::TypedValue { value }
    }

    pub fn coalesce(operands: Vec<Expression>) -> Self {
        Expression::Coalesce { operands }
    }

    /// Returns the column name if this is a column reference
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Expression::Column { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the expression kind for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Expression::Column { .. } => "column",
            Expression::TypedValue { .. } => "typed_value",
            Expression::Null => "null",
            Expression::Coalesce { .. } => "coalesce",
            Expression::Unsupported => "unsupported",
        }
    }
}

/// Filter predicate tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Predicate {
    IsNull {
        value: Expression,
    },
    IsNotNull {
        value: Expression,
    },
    Negation {
        operand: Box<Predicate>,
    },
    Conjunction {
        operands: Vec<Predicate>,
    },
    Disjunction {
        operands: Vec<Predicate>,
    },
    Comparison {
        operation: ComparisonOp,
        left: Expression,
        right: Expression,
    },
    /// A boolean-valued expression used directly as a filter
    BoolExpression {
        value: Expression,
    },
    /// Set membership: `value IN (set...)`
    In {
        value: Expression,
        set: Vec<Expression>,
    },
    /// Inclusive range: `least <= value <= greatest`
    Between {
        value: Expression,
        least: Expression,
        greatest: Expression,
    },
    /// Regular-expression match with a caller-supplied pattern
    Regexp {
        value: Expression,
        pattern: Expression,
    },
    #[serde(other)]
    Unsupported,
}

impl Predicate {
    pub fn is_null(value: Expression) -> Self {
        Predicate::IsNull { value }
    }

    pub fn is_not_null(value: Expression) -> Self {
        Predicate::IsNotNull { value }
    }

    pub fn not(operand: Predicate) -> Self {
        Predicate::Negation {
            operand: Box::new(operand),
        }
    }

    pub fn and(operands: Vec<Predicate>) -> Self {
        Predicate::Conjunction { operands }
    }

    pub fn or(operands: Vec<Predicate>) -> Self {
        Predicate::Disjunction { operands }
    }

    pub fn compare(operation: ComparisonOp, left: Expression, right: Expression) -> Self {
        Predicate::Comparison {
            operation,
            left,
            right,
        }
    }

    /// Equality between a column and a literal
    pub fn eq(column: impl Into<String>, value: TypedValue) -> Self {
        Self::compare(
            ComparisonOp::Eq,
            Expression::column(column),
            Expression::literal(value),
        )
    }

    pub fn bool_expression(value: Expression) -> Self {
        Predicate::BoolExpression { value }
    }

    pub fn in_set(value: Expression, set: Vec<Expression>) -> Self {
        Predicate::In { value, set }
    }

    pub fn between(value: Expression, least: Expression, greatest: Expression) -> Self {
        Predicate::Between {
            value,
            least,
            greatest,
        }
    }

    pub fn regexp(value: Expression, pattern: Expression) -> Self {
        Predicate::Regexp { value, pattern }
    }

    /// Returns the predicate kind for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::IsNull { .. } => "is_null",
            Predicate::IsNotNull { .. } => "is_not_null",
            Predicate::Negation { .. } => "negation",
            Predicate::Conjunction { .. } => "conjunction",
            Predicate::Disjunction { .. } => "disjunction",
            Predicate::Comparison { .. } => "comparison",
            Predicate::BoolExpression { .. } => "bool_expression",
            Predicate::In { .. } => "in",
            Predicate::Between { .. } => "between",
            Predicate::Regexp { .. } => "regexp",
            Predicate::Unsupported => "unsupported",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_comparison() {
        let predicate: Predicate = serde_json::from_value(json!({
            "kind": "comparison",
            "operation": "ge",
            "left": {"kind": "column", "name": "age"},
            "right": {"kind": "typed_value", "value": {
                "type": {"kind": "primitive", "id": "int32"},
                "value": {"int32": 18}
            }}
        }))
        .unwrap();

        assert_eq!(
            predicate,
            Predicate::compare(
                ComparisonOp::Ge,
                Expression::column("age"),
                Expression::literal(TypedValue::int32(18)),
            )
        );
    }

    #[test]
    fn test_decode_unknown_kinds() {
        let predicate: Predicate =
            serde_json::from_value(json!({"kind": "json_exists", "path": "$.a"})).unwrap();
        assert_eq!(predicate, Predicate::Unsupported);

        let expr: Expression =
            serde_json::from_value(json!({"kind": "arithmetical_expression"})).unwrap();
        assert_eq!(expr, Expression::Unsupported);

        let op: ComparisonOp = serde_json::from_value(json!("is_distinct_from")).unwrap();
        assert_eq!(op, ComparisonOp::Unsupported);
    }

    #[test]
    fn test_null_expression_roundtrip() {
        let encoded = serde_json::to_value(Expression::Null).unwrap();
        assert_eq!(encoded, json!({"kind": "null"}));
    }

    #[test]
    fn test_string_match_ops() {
        assert!(ComparisonOp::StartsWith.is_string_match());
        assert!(ComparisonOp::Contains.is_string_match());
        assert!(!ComparisonOp::Eq.is_string_match());
    }
}
