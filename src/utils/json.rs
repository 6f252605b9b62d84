//! JSON and Hex Parsing Utilities
//!
//! The upstream operation service sends transaction quantities as hex strings,
//! sometimes without a `0x` prefix. These helpers read them strictly: a field
//! that is present but unreadable is an error, an absent or null field is `None`.

use crate::error::{SignerError, SignerResult};
use serde_json::Value;

/// Strip a `0x`/`0X` prefix if present
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode hex bytes, tolerating a missing prefix and an odd digit count
/// (a leading zero nibble is assumed, as go-ethereum's `FromHex` does)
pub fn decode_hex(s: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let cleaned = strip_hex_prefix(s.trim());
    if cleaned.len() % 2 == 1 {
        hex::decode(format!("0{}", cleaned))
    } else {
        hex::decode(cleaned)
    }
}

/// Parse a hex quantity into a u64
pub fn parse_hex_u64(hex_str: &str) -> Option<u64> {
    let cleaned = strip_hex_prefix(hex_str.trim());
    if cleaned.is_empty() {
        return None;
    }
    u64::from_str_radix(cleaned, 16).ok()
}

/// Parse a hex quantity into a u128
pub fn parse_hex_u128(hex_str: &str) -> Option<u128> {
    let cleaned = strip_hex_prefix(hex_str.trim());
    if cleaned.is_empty() {
        return None;
    }
    u128::from_str_radix(cleaned, 16).ok()
}

/// Read an optional u64 quantity (hex string or JSON integer)
pub fn get_json_u64(value: &Value, field: &str) -> SignerResult<Option<u64>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => parse_hex_u64(s)
            .map(Some)
            .ok_or_else(|| SignerError::invalid_field(field, s.as_str())),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| SignerError::invalid_field(field, n.to_string())),
        Some(other) => Err(SignerError::invalid_field(field, other.to_string())),
    }
}

/// Read an optional u128 quantity (hex string or JSON integer)
pub fn get_json_u128(value: &Value, field: &str) -> SignerResult<Option<u128>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => parse_hex_u128(s)
            .map(Some)
            .ok_or_else(|| SignerError::invalid_field(field, s.as_str())),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|v| Some(v as u128))
            .ok_or_else(|| SignerError::invalid_field(field, n.to_string())),
        Some(other) => Err(SignerError::invalid_field(field, other.to_string())),
    }
}

/// Read an optional hex byte string
pub fn get_json_bytes(value: &Value, field: &str) -> SignerResult<Option<Vec<u8>>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => decode_hex(s)
            .map(Some)
            .map_err(|e| SignerError::invalid_field(field, format!("{}: {}", s, e))),
        Some(other) => Err(SignerError::invalid_field(field, other.to_string())),
    }
}
