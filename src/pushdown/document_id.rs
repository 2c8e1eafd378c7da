//! Document identifier
//!
//! A 12-byte identifier whose canonical external form is 24 lowercase hex
//! characters. In the native filter dialect it is written as
//! `{"$oid": "<hex>"}`.

use std::fmt::{self, Write as _};

use serde_json::{json, Value};
use thiserror::Error;

/// Raw identifier length in bytes
pub const DOCUMENT_ID_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentIdError {
    #[error("document id must be {expected} hex characters, got {len}")]
    InvalidLength { len: usize, expected: usize },

    #[error("invalid hex character at position {position}")]
    InvalidHex { position: usize },
}

/// 12-byte document identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId([u8; DOCUMENT_ID_LEN]);

impl DocumentId {
    pub fn new(bytes: [u8; DOCUMENT_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parses the canonical 24-character hex form (either case)
    pub fn from_hex(s: &str) -> Result<Self, DocumentIdError> {
        if s.len() != DOCUMENT_ID_LEN * 2 {
            return Err(DocumentIdError::InvalidLength {
                len: s.len(),
                expected: DOCUMENT_ID_LEN * 2,
            });
        }

        let raw = s.as_bytes();
        let mut out = [0u8; DOCUMENT_ID_LEN];
        for (i, byte) in out.iter_mut().enumerate() {
            let hi = decode_hex_nibble(raw[2 * i])
                .ok_or(DocumentIdError::InvalidHex { position: 2 * i + 1 })?;
            let lo = decode_hex_nibble(raw[2 * i + 1])
                .ok_or(DocumentIdError::InvalidHex { position: 2 * i + 2 })?;
            *byte = (hi << 4) | lo;
        }

        Ok(Self(out))
    }

    /// Canonical lowercase hex form
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8; DOCUMENT_ID_LEN] {
        &self.0
    }

    /// Extended-JSON representation used in native filters
    pub fn to_native(&self) -> Value {
        json!({ "$oid": self.to_hex() })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Lowercase hex encoding of arbitrary bytes
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        // Formatting into a String is infallible.
        write!(out, "{byte:02x}").ok();
    }
    out
}

const fn decode_hex_nibble(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_hex_pads_each_byte() {
        assert_eq!(encode_hex(&[0x00, 0x0a, 0xff]), "000aff");
        assert_eq!(encode_hex(&[]), "");
    }

    #[test]
    fn test_hex_roundtrip() {
        let hex = "5f1d7a3b9c0e4d2a1b3c4d5e";
        let id = DocumentId::from_hex(hex).unwrap();
        assert_eq!(id.to_hex(), hex);
    }

    #[test]
    fn test_uppercase_parses_to_lowercase() {
        let id = DocumentId::from_hex("ABCDEF0123456789ABCDEF01").unwrap();
        assert_eq!(id.to_hex(), "abcdef0123456789abcdef01");
    }

    #[test]
    fn test_rejects_wrong_length() {
        assert_eq!(
            DocumentId::from_hex("abcd"),
            Err(DocumentIdError::InvalidLength {
                len: 4,
                expected: 24
            })
        );
    }

    #[test]
    fn test_rejects_non_hex() {
        let err = DocumentId::from_hex("zz1d7a3b9c0e4d2a1b3c4d5e").unwrap_err();
        assert_eq!(err, DocumentIdError::InvalidHex { position: 1 });
    }

    #[test]
    fn test_native_form() {
        let id = DocumentId::new([0xab; DOCUMENT_ID_LEN]);
        assert_eq!(id.to_native(), json!({"$oid": "abababababababababababab"}));
    }
}
