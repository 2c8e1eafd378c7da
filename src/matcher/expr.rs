//! Computed expressions inside `$expr`

use std::cmp::Ordering;

use serde_json::{Map, Value};

use super::compare::{total_cmp, values_equal};
use super::errors::{MatchError, MatchResult};

/// Resolves a dotted field path in a document
pub fn lookup<'d>(document: &'d Value, path: &str) -> Option<&'d Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}

/// Extended-JSON literal objects such as `{"$oid": ...}`
pub fn is_literal_object(map: &Map<String, Value>) -> bool {
    map.len() == 1 && (map.contains_key("$oid") || map.contains_key("$binary"))
}

/// Evaluates a computed expression to a value
pub fn evaluate(expr: &Value, document: &Value) -> MatchResult<Value> {
    match expr {
        Value::String(s) if s.starts_with('$') => {
            Ok(lookup(document, &s[1..]).cloned().unwrap_or(Value::Null))
        }
        Value::Object(map) if is_literal_object(map) => Ok(expr.clone()),
        Value::Object(map) => {
            let mut entries = map.iter();
            let (operator, args) = match (entries.next(), entries.next()) {
                (Some(entry), None) => entry,
                _ => {
                    return Err(MatchError::InvalidFilter(format!(
                        "expression object must have exactly one operator: {expr}"
                    )))
                }
            };
            evaluate_operator(operator, args, document)
        }
        Value::Array(items) => items
            .iter()
            .map(|item| evaluate(item, document))
            .collect::<MatchResult<Vec<_>>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

fn evaluate_operator(operator: &str, args: &Value, document: &Value) -> MatchResult<Value> {
    match operator {
        "$eq" | "$ne" | "$lt" | "$lte" | "$gt" | "$gte" => {
            let (left, right) = match args.as_array().map(Vec::as_slice) {
                Some([left, right]) => (left, right),
                _ => return Err(MatchError::invalid_argument(operator, "expected two operands")),
            };
            let ord = total_cmp(&evaluate(left, document)?, &evaluate(right, document)?);
            let result = match operator {
                "$eq" => ord == Ordering::Equal,
                "$ne" => ord != Ordering::Equal,
                "$lt" => ord == Ordering::Less,
                "$lte" => ord != Ordering::Greater,
                "$gt" => ord == Ordering::Greater,
                _ => ord != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        "$and" => {
            let operands = args
                .as_array()
                .ok_or_else(|| MatchError::invalid_argument(operator, "expected an array"))?;
            for operand in operands {
                if !is_truthy(&evaluate(operand, document)?) {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        "$in" => {
            let (needle, haystack) = match args.as_array().map(Vec::as_slice) {
                Some([needle, haystack]) => (needle, haystack),
                _ => return Err(MatchError::invalid_argument(operator, "expected two operands")),
            };
            let needle = evaluate(needle, document)?;
            match evaluate(haystack, document)? {
                Value::Array(items) => Ok(Value::Bool(
                    items.iter().any(|item| values_equal(item, &needle)),
                )),
                _ => Err(MatchError::invalid_argument(
                    operator,
                    "second operand must be an array",
                )),
            }
        }
        "$ifNull" => {
            let operands = args
                .as_array()
                .ok_or_else(|| MatchError::invalid_argument(operator, "expected an array"))?;
            for operand in operands {
                let value = evaluate(operand, document)?;
                if !value.is_null() {
                    return Ok(value);
                }
            }
            Ok(Value::Null)
        }
        other => Err(MatchError::UnknownOperator(other.to_string())),
    }
}

/// Truthiness of an expression result
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}
