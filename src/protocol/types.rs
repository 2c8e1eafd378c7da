//! Type descriptors and typed literal values

use serde::{Deserialize, Serialize};

/// Tag name marking a byte-string column as a document identifier.
pub const OBJECT_ID_TAG: &str = "ObjectId";

/// Primitive type identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveType {
    Bool,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float,
    Double,
    /// Arbitrary byte string
    Bytes,
    /// UTF-8 text
    Text,
    Date,
    Datetime,
    Timestamp,
    Interval,
    Json,
    Uuid,
    /// Any identifier this build does not know
    #[serde(other)]
    Unsupported,
}

impl PrimitiveType {
    /// Returns the wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::Bool => "bool",
            PrimitiveType::Int8 => "int8",
            PrimitiveType::Uint8 => "uint8",
            PrimitiveType::Int16 => "int16",
            PrimitiveType::Uint16 => "uint16",
            PrimitiveType::Int32 => "int32",
            PrimitiveType::Uint32 => "uint32",
            PrimitiveType::Int64 => "int64",
            PrimitiveType::Uint64 => "uint64",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Bytes => "bytes",
            PrimitiveType::Text => "text",
            PrimitiveType::Date => "date",
            PrimitiveType::Datetime => "datetime",
            PrimitiveType::Timestamp => "timestamp",
            PrimitiveType::Interval => "interval",
            PrimitiveType::Json => "json",
            PrimitiveType::Uuid => "uuid",
            PrimitiveType::Unsupported => "unsupported",
        }
    }
}

/// Recursive type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDescriptor {
    /// A primitive scalar type
    Primitive { id: PrimitiveType },
    /// Nullable wrapper, nestable to any depth
    Optional { item: Box<TypeDescriptor> },
    /// Primitive annotated with a semantic tag
    Tagged {
        tag: String,
        item: Box<TypeDescriptor>,
    },
    /// Containers and other descriptor kinds
    #[serde(other)]
    Unsupported,
}

impl TypeDescriptor {
    pub fn primitive(id: PrimitiveType) -> Self {
        TypeDescriptor::Primitive { id }
    }

    pub fn optional(item: TypeDescriptor) -> Self {
        TypeDescriptor::Optional {
            item: Box::new(item),
        }
    }

    pub fn tagged(tag: impl Into<String>, item: TypeDescriptor) -> Self {
        TypeDescriptor::Tagged {
            tag: tag.into(),
            item: Box::new(item),
        }
    }

    /// The document identifier type: bytes tagged `ObjectId`
    pub fn object_id() -> Self {
        Self::tagged(OBJECT_ID_TAG, Self::primitive(PrimitiveType::Bytes))
    }

    /// Strips every optional layer
    pub fn unwrap_optional(&self) -> &TypeDescriptor {
        let mut current = self;
        while let TypeDescriptor::Optional { item } = current {
            current = item;
        }
        current
    }

    /// Returns true if this is the document identifier type
    pub fn is_object_id(&self) -> bool {
        matches!(
            self,
            TypeDescriptor::Tagged { tag, item }
                if tag == OBJECT_ID_TAG
                    && **item == TypeDescriptor::primitive(PrimitiveType::Bytes)
        )
    }
}

/// Scalar payload of a typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarValue {
    Bool(bool),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float(f32),
    Double(f64),
    Bytes(Vec<u8>),
    Text(String),
    /// High half of a 128-bit value
    #[serde(rename = "low_128")]
    Low128(u64),
    /// Nested container items
    Items(Vec<ScalarValue>),
    /// Explicit null marker
    NullFlag,
    /// Any payload kind not listed above, kept verbatim
    #[serde(untagged)]
    Unsupported(serde_json::Value),
}

impl ScalarValue {
    /// Returns the payload kind name for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            ScalarValue::Bool(_) => "bool",
            ScalarValue::Int32(_) => "int32",
            ScalarValue::Uint32(_) => "uint32",
            ScalarValue::Int64(_) => "int64",
            ScalarValue::Uint64(_) => "uint64",
            ScalarValue::Float(_) => "float",
            ScalarValue::Double(_) => "double",
            ScalarValue::Bytes(_) => "bytes",
            ScalarValue::Text(_) => "text",
            ScalarValue::Low128(_) => "low_128",
            ScalarValue::Items(_) => "items",
            ScalarValue::NullFlag => "null_flag",
            ScalarValue::Unsupported(_) => "unsupported",
        }
    }
}

/// A literal value together with its declared type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedValue {
    #[serde(rename = "type")]
    pub ty: TypeDescriptor,
    /// Payload; absent only in malformed requests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ScalarValue>,
}

impl TypedValue {
    pub fn new(ty: TypeDescriptor, value: ScalarValue) -> Self {
        Self {
            ty,
            value: Some(value),
        }
    }

    pub fn bool(v: bool) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Bool),
            ScalarValue::Bool(v),
        )
    }

    pub fn int32(v: i32) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Int32),
            ScalarValue::Int32(v),
        )
    }

    pub fn int64(v: i64) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Int64),
            ScalarValue::Int64(v),
        )
    }

    pub fn uint64(v: u64) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Uint64),
            ScalarValue::Uint64(v),
        )
    }

    pub fn double(v: f64) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Double),
            ScalarValue::Double(v),
        )
    }

    pub fn text(v: impl Into<String>) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Text),
            ScalarValue::Text(v.into()),
        )
    }

    pub fn bytes(v: impl Into<Vec<u8>>) -> Self {
        Self::new(
            TypeDescriptor::primitive(PrimitiveType::Bytes),
            ScalarValue::Bytes(v.into()),
        )
    }

    /// A document identifier literal from its raw bytes
    pub fn object_id(v: impl Into<Vec<u8>>) -> Self {
        Self::new(TypeDescriptor::object_id(), ScalarValue::Bytes(v.into()))
    }

    /// Wraps the declared type in one more optional layer
    pub fn into_optional(self) -> Self {
        Self {
            ty: TypeDescriptor::optional(self.ty),
            value: self.value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_nested_optionals() {
        let ty = TypeDescriptor::optional(TypeDescriptor::optional(TypeDescriptor::primitive(
            PrimitiveType::Int64,
        )));
        assert_eq!(
            ty.unwrap_optional(),
            &TypeDescriptor::primitive(PrimitiveType::Int64)
        );
    }

    #[test]
    fn test_object_id_recognition() {
        assert!(TypeDescriptor::object_id().is_object_id());
        assert!(!TypeDescriptor::tagged("ObjectId", TypeDescriptor::primitive(PrimitiveType::Text))
            .is_object_id());
        assert!(!TypeDescriptor::tagged("Other", TypeDescriptor::primitive(PrimitiveType::Bytes))
            .is_object_id());
    }

    #[test]
    fn test_decode_typed_value() {
        let value: TypedValue = serde_json::from_value(json!({
            "type": {"kind": "optional", "item": {"kind": "primitive", "id": "int32"}},
            "value": {"int32": 7}
        }))
        .unwrap();
        assert_eq!(value, TypedValue::int32(7).into_optional());
    }

    #[test]
    fn test_unknown_kinds_decode_as_unsupported() {
        let ty: TypeDescriptor = serde_json::from_value(json!({"kind": "list"})).unwrap();
        assert_eq!(ty, TypeDescriptor::Unsupported);

        let ty: TypeDescriptor =
            serde_json::from_value(json!({"kind": "primitive", "id": "decimal"})).unwrap();
        assert_eq!(ty, TypeDescriptor::primitive(PrimitiveType::Unsupported));
    }

    #[test]
    fn test_payload_kinds() {
        let low: ScalarValue = serde_json::from_value(json!({"low_128": 5})).unwrap();
        assert_eq!(low, ScalarValue::Low128(5));
        assert_eq!(low.kind(), "low_128");

        let flag: ScalarValue = serde_json::from_value(json!("null_flag")).unwrap();
        assert_eq!(flag, ScalarValue::NullFlag);

        let unknown: ScalarValue = serde_json::from_value(json!({"decimal": "1.5"})).unwrap();
        assert_eq!(unknown, ScalarValue::Unsupported(json!({"decimal": "1.5"})));
        assert_eq!(unknown.kind(), "unsupported");
    }

    #[test]
    fn test_missing_payload_decodes_as_none() {
        let value: TypedValue =
            serde_json::from_value(json!({"type": {"kind": "primitive", "id": "text"}})).unwrap();
        assert!(value.value.is_none());
    }
}
