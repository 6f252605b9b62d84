//! EIP-712 Type Definitions
//!
//! Core data structures for EIP-712 typed data signing.

use crate::error::{SignerError, SignerResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Name of the domain struct type
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// Struct name -> ordered field list
pub type TypeMap = HashMap<String, Vec<TypedDataField>>;

/// A field in a struct type definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypedDataField {
    /// The name of the field
    pub name: String,
    /// The type of the field (e.g., "address", "uint256", "Person[]")
    #[serde(rename = "type")]
    pub type_name: String,
}

impl TypedDataField {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// The EIP-712 signing domain.
///
/// `name`, `chainId` and `verifyingContract` are named because the default
/// domain type uses exactly those. Other keys such as `version` or `salt` are
/// kept in `extra` and encoded when the message's own `EIP712Domain` type
/// lists them.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Eip712Domain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Number, decimal string or `0x` hex string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifying_contract: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Eip712Domain {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && matches!(self.chain_id, None | Some(Value::Null))
            && self.verifying_contract.is_none()
            && self.extra.is_empty()
    }

    /// The domain as a JSON object, ready for struct hashing
    pub fn to_value(&self) -> SignerResult<Value> {
        serde_json::to_value(self).map_err(|e| SignerError::malformed("domain", e.to_string()))
    }
}

/// The domain type inserted when a message does not declare one
pub fn default_domain_fields() -> Vec<TypedDataField> {
    vec![
        TypedDataField::new("name", "string"),
        TypedDataField::new("chainId", "uint256"),
        TypedDataField::new("verifyingContract", "address"),
    ]
}

/// Complete EIP-712 typed data structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TypedMessage {
    /// Type definitions (struct name -> fields)
    #[serde(default)]
    pub types: TypeMap,

    /// The name of the primary type being signed
    #[serde(default)]
    pub primary_type: String,

    #[serde(default)]
    pub domain: Eip712Domain,

    /// The actual message data to sign
    #[serde(default)]
    pub message: Value,
}

impl TypedMessage {
    /// Parse typed data from a JSON string
    pub fn from_json(json: &str) -> SignerResult<Self> {
        serde_json::from_str(json).map_err(|e| SignerError::malformed("typedData", e.to_string()))
    }

    pub fn from_value(value: Value) -> SignerResult<Self> {
        serde_json::from_value(value).map_err(|e| SignerError::malformed("typedData", e.to_string()))
    }

    /// Check that all four parts are present and non-empty
    pub fn validate_presence(&self) -> SignerResult<()> {
        if self.domain.is_empty() {
            return Err(SignerError::malformed("domain", "missing or empty"));
        }
        if self.types.is_empty() {
            return Err(SignerError::malformed("types", "missing or empty"));
        }
        if self.primary_type.trim().is_empty() {
            return Err(SignerError::malformed("primaryType", "missing or empty"));
        }
        match &self.message {
            Value::Object(fields) if !fields.is_empty() => Ok(()),
            Value::Object(_) | Value::Null => {
                Err(SignerError::malformed("message", "missing or empty"))
            }
            other => Err(SignerError::malformed(
                "message",
                format!("expected an object, got {}", other),
            )),
        }
    }
}

/// Check that the primary type and every field type resolve
pub fn validate_types(types: &TypeMap, primary_type: &str) -> SignerResult<()> {
    if !types.contains_key(primary_type) {
        return Err(SignerError::malformed(
            "primaryType",
            format!("{} is not declared in types", primary_type),
        ));
    }

    for (struct_name, fields) in types {
        for field in fields {
            let base_type = base_type(&field.type_name);
            if !(is_atomic_type(base_type)
                || is_dynamic_type(base_type)
                || types.contains_key(base_type))
            {
                return Err(SignerError::malformed(
                    format!("types.{}.{}", struct_name, field.name),
                    format!("unknown type {}", field.type_name),
                ));
            }
        }
    }

    Ok(())
}

/// Strip every array suffix: "Person[]" -> "Person", "uint256[2][]" -> "uint256"
pub fn base_type(type_name: &str) -> &str {
    match type_name.find('[') {
        Some(bracket_pos) => &type_name[..bracket_pos],
        None => type_name,
    }
}

/// Check if a type is an atomic (fixed-size) type
pub fn is_atomic_type(type_name: &str) -> bool {
    if type_name == "address" || type_name == "bool" {
        return true;
    }

    // uintN and intN
    let bits = type_name
        .strip_prefix("uint")
        .or_else(|| type_name.strip_prefix("int"));
    if let Some(bits) = bits {
        if let Ok(n) = bits.parse::<u32>() {
            return n > 0 && n <= 256 && n % 8 == 0;
        }
        return false;
    }

    // bytesN (fixed-size bytes)
    if let Some(size) = type_name.strip_prefix("bytes") {
        if let Ok(n) = size.parse::<u32>() {
            return n > 0 && n <= 32;
        }
    }

    false
}

/// Check if a type is a dynamic type
pub fn is_dynamic_type(type_name: &str) -> bool {
    type_name == "bytes" || type_name == "string"
}
