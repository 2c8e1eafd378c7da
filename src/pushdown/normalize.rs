//! Typed value normalization
//!
//! Maps a declared type plus a scalar payload onto a native filter value.
//! Supported primitives pass through unchanged; the `ObjectId` tag turns raw
//! bytes into a document identifier.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Number, Value};

use crate::protocol::{PrimitiveType, ScalarValue, TypeDescriptor, TypedValue};

use super::document_id::{encode_hex, DocumentId};
use super::errors::{PushdownError, PushdownResult};

/// Normalizes a typed literal
pub fn normalize_typed_value(typed: &TypedValue) -> PushdownResult<Value> {
    let raw = typed.value.as_ref().ok_or_else(|| {
        PushdownError::MalformedTypedValue("typed value without payload".into())
    })?;

    let native = scalar_to_native(raw)?;
    normalize(&typed.ty, raw, native)
}

/// Checks the payload kind and converts it to its native shape
fn scalar_to_native(raw: &ScalarValue) -> PushdownResult<Value> {
    let value = match raw {
        ScalarValue::Bool(v) => Value::Bool(*v),
        ScalarValue::Int32(v) => json!(v),
        ScalarValue::Uint32(v) => json!(v),
        ScalarValue::Int64(v) => json!(v),
        ScalarValue::Uint64(v) => json!(v),
        ScalarValue::Float(v) => finite_number(f64::from(*v))?,
        ScalarValue::Double(v) => finite_number(*v)?,
        ScalarValue::Bytes(v) => binary(v),
        ScalarValue::Text(v) => Value::String(v.clone()),
        other => {
            return Err(PushdownError::UnimplementedTypedValue(format!(
                "payload kind: {}",
                other.kind()
            )))
        }
    };
    Ok(value)
}

/// Applies the declared type to an already-converted payload
fn normalize(ty: &TypeDescriptor, raw: &ScalarValue, native: Value) -> PushdownResult<Value> {
    match ty.unwrap_optional() {
        TypeDescriptor::Primitive { id } => match id {
            PrimitiveType::Bool
            | PrimitiveType::Int8
            | PrimitiveType::Uint8
            | PrimitiveType::Int16
            | PrimitiveType::Uint16
            | PrimitiveType::Int32
            | PrimitiveType::Uint32
            | PrimitiveType::Int64
            | PrimitiveType::Uint64
            | PrimitiveType::Float
            | PrimitiveType::Double
            | PrimitiveType::Bytes
            | PrimitiveType::Text => Ok(native),
            other => Err(PushdownError::UnimplementedTypedValue(format!(
                "unsupported type {} for typed value",
                other.as_str()
            ))),
        },
        tagged @ TypeDescriptor::Tagged { tag, .. } => {
            if !tagged.is_object_id() {
                return Err(PushdownError::UnimplementedTypedValue(format!(
                    "unknown tagged type: {tag}"
                )));
            }
            normalize_object_id(raw)
        }
        TypeDescriptor::Optional { .. } | TypeDescriptor::Unsupported => Err(
            PushdownError::UnimplementedTypedValue("unsupported type for typed value".into()),
        ),
    }
}

/// Bytes → hex → document identifier
fn normalize_object_id(raw: &ScalarValue) -> PushdownResult<Value> {
    match raw {
        ScalarValue::Bytes(bytes) => {
            let hex = encode_hex(bytes);
            let id = DocumentId::from_hex(&hex).map_err(|e| {
                PushdownError::UnimplementedTypedValue(format!(
                    "failed to construct ObjectId from {hex}: {e}"
                ))
            })?;
            Ok(id.to_native())
        }
        other => Err(PushdownError::UnimplementedTypedValue(format!(
            "wrong value of typed value for ObjectId: {}",
            other.kind()
        ))),
    }
}

fn finite_number(v: f64) -> PushdownResult<Value> {
    Number::from_f64(v).map(Value::Number).ok_or_else(|| {
        PushdownError::UnimplementedTypedValue(format!("non-finite float {v}"))
    })
}

fn binary(bytes: &[u8]) -> Value {
    json!({ "$binary": { "base64": STANDARD.encode(bytes), "subType": "00" } })
}
