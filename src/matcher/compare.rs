//! Value equality and ordering

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

/// Rank of a value's type in the cross-type order
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Object(_) => 3,
        Value::Array(_) => 4,
        Value::Bool(_) => 5,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
        return a.cmp(&b);
    }
    let af = a.as_f64().unwrap_or(0.0);
    let bf = b.as_f64().unwrap_or(0.0);
    af.partial_cmp(&bf).unwrap_or(Ordering::Equal)
}

fn compare_arrays(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = total_cmp(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_objects(a: &Map<String, Value>, b: &Map<String, Value>) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b) {
        let ord = ka.cmp(kb).then_with(|| total_cmp(va, vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

/// Total order across all JSON values:
/// null < numbers < strings < objects < arrays < booleans
pub fn total_cmp(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Number(a), Value::Number(b)) => compare_numbers(a, b),
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Array(a), Value::Array(b)) => compare_arrays(a, b),
        (Value::Object(a), Value::Object(b)) => compare_objects(a, b),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Ordering only within a type bracket; `None` across brackets
pub fn bracketed_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    if type_rank(a) != type_rank(b) || a.is_null() {
        return None;
    }
    Some(total_cmp(a, b))
}

/// Equality with numeric normalisation (`1 == 1.0`)
pub fn values_equal(a: &Value, b: &Value) -> bool {
    total_cmp(a, b) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_numeric_equality_across_representations() {
        assert!(values_equal(&json!(1), &json!(1.0)));
        assert!(!values_equal(&json!(1), &json!("1")));
    }

    #[test]
    fn test_cross_type_order() {
        assert_eq!(total_cmp(&json!(null), &json!(0)), Ordering::Less);
        assert_eq!(total_cmp(&json!(99), &json!("a")), Ordering::Less);
        assert_eq!(total_cmp(&json!("z"), &json!({})), Ordering::Less);
        assert_eq!(total_cmp(&json!([]), &json!(false)), Ordering::Less);
    }

    #[test]
    fn test_large_unsigned() {
        assert_eq!(
            total_cmp(&json!(u64::MAX), &json!(u64::MAX - 1)),
            Ordering::Greater
        );
    }

    #[test]
    fn test_bracketed() {
        assert_eq!(bracketed_cmp(&json!(2), &json!(1)), Some(Ordering::Greater));
        assert_eq!(bracketed_cmp(&json!(2), &json!("1")), None);
        assert_eq!(bracketed_cmp(&json!(null), &json!(null)), None);
    }

    #[test]
    fn test_object_ids_compare_by_hex() {
        let a = json!({"$oid": "000000000000000000000001"});
        let b = json!({"$oid": "000000000000000000000002"});
        assert_eq!(total_cmp(&a, &b), Ordering::Less);
        assert!(values_equal(&a, &a.clone()));
    }
}
