//! Document-level filter matching

use std::cmp::Ordering;

use regex::Regex;
use serde_json::{Map, Value};

use super::compare::{bracketed_cmp, values_equal};
use super::errors::{MatchError, MatchResult};
use super::expr::{evaluate, is_literal_object, is_truthy, lookup};

/// Checks whether a document matches a native filter
pub fn matches(filter: &Value, document: &Value) -> MatchResult<bool> {
    let clauses = filter
        .as_object()
        .ok_or_else(|| MatchError::InvalidFilter(format!("filter must be a document: {filter}")))?;

    for (key, condition) in clauses {
        if !clause_matches(key, condition, document)? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Keeps the documents matching `filter`, in order
pub fn filter_documents<'d>(
    filter: &Value,
    documents: impl IntoIterator<Item = &'d Value>,
) -> MatchResult<Vec<&'d Value>> {
    let mut out = Vec::new();
    for document in documents {
        if matches(filter, document)? {
            out.push(document);
        }
    }
    Ok(out)
}

fn clause_matches(key: &str, condition: &Value, document: &Value) -> MatchResult<bool> {
    match key {
        "$and" => {
            for sub in sub_filters(key, condition)? {
                if !matches(sub, document)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "$or" => {
            for sub in sub_filters(key, condition)? {
                if matches(sub, document)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        "$nor" => {
            for sub in sub_filters(key, condition)? {
                if matches(sub, document)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        "$expr" => Ok(is_truthy(&evaluate(condition, document)?)),
        k if k.starts_with('$') => Err(MatchError::UnknownOperator(k.to_string())),
        field => field_matches(lookup(document, field), condition),
    }
}

fn sub_filters<'f>(operator: &str, condition: &'f Value) -> MatchResult<&'f Vec<Value>> {
    condition
        .as_array()
        .ok_or_else(|| MatchError::InvalidFilter(format!("{operator} requires an array")))
}

fn is_operator_document(map: &Map<String, Value>) -> bool {
    !map.is_empty() && !is_literal_object(map) && map.keys().all(|k| k.starts_with('$'))
}

fn field_matches(actual: Option<&Value>, condition: &Value) -> MatchResult<bool> {
    let operators = match condition {
        Value::Object(map) if is_operator_document(map) => map,
        _ => return Ok(eq_match(actual, condition)),
    };

    for (operator, operand) in operators {
        let matched = match operator.as_str() {
            "$exists" => {
                let expected = operand
                    .as_bool()
                    .ok_or_else(|| MatchError::invalid_argument(operator, "expected a boolean"))?;
                actual.is_some() == expected
            }
            "$eq" => eq_match(actual, operand),
            "$ne" => !eq_match(actual, operand),
            "$in" => operand
                .as_array()
                .ok_or_else(|| MatchError::invalid_argument(operator, "expected an array"))?
                .iter()
                .any(|candidate| eq_match(actual, candidate)),
            "$gt" => range_match(actual, operand, |o| o == Ordering::Greater),
            "$gte" => range_match(actual, operand, |o| o != Ordering::Less),
            "$lt" => range_match(actual, operand, |o| o == Ordering::Less),
            "$lte" => range_match(actual, operand, |o| o != Ordering::Greater),
            "$regex" => regex_match(actual, operand)?,
            other => return Err(MatchError::UnknownOperator(other.to_string())),
        };
        if !matched {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Null matches a missing field as well as an explicit null
fn eq_match(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        None => expected.is_null(),
        Some(value) => values_equal(value, expected),
    }
}

fn range_match(actual: Option<&Value>, bound: &Value, accept: impl Fn(Ordering) -> bool) -> bool {
    actual
        .and_then(|value| bracketed_cmp(value, bound))
        .is_some_and(accept)
}

fn regex_match(actual: Option<&Value>, pattern: &Value) -> MatchResult<bool> {
    let pattern = pattern
        .as_str()
        .ok_or_else(|| MatchError::invalid_argument("$regex", "expected a string pattern"))?;
    let regex = Regex::new(pattern).map_err(|source| MatchError::InvalidRegex {
        pattern: pattern.to_string(),
        source,
    })?;

    Ok(actual
        .and_then(Value::as_str)
        .is_some_and(|text| regex.is_match(text)))
}
