//! EIP-712 Hashing
//!
//! Implements domain separator and struct hashing for EIP-712.

use super::encoder::encode_struct;
use super::types::*;
use crate::error::{SignerError, SignerResult};
use crate::utils::{keccak256, keccak256_concat};
use serde_json::Value;
use std::borrow::Cow;

/// Magic prefix for EIP-712 encoding
const EIP712_PREFIX: &[u8] = b"\x19\x01";

/// hashStruct(s) = keccak256(typeHash || encodeData(s))
pub fn hash_struct(type_name: &str, value: &Value, types: &TypeMap) -> SignerResult<[u8; 32]> {
    hash_struct_at(type_name, value, types, type_name)
}

/// [`hash_struct`] with an explicit field path for error reporting
pub(crate) fn hash_struct_at(
    type_name: &str,
    value: &Value,
    types: &TypeMap,
    path: &str,
) -> SignerResult<[u8; 32]> {
    let encoded = encode_struct(type_name, value, types, path)?;
    Ok(keccak256(&encoded))
}

/// The message's types with the default `EIP712Domain` added when absent
pub fn types_with_domain(types: &TypeMap) -> Cow<'_, TypeMap> {
    if types.contains_key(DOMAIN_TYPE) {
        Cow::Borrowed(types)
    } else {
        let mut owned = types.clone();
        owned.insert(DOMAIN_TYPE.to_string(), default_domain_fields());
        Cow::Owned(owned)
    }
}

/// Everything that goes into the final digest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreImage {
    pub domain_separator: [u8; 32],
    pub struct_hash: [u8; 32],
    pub digest: [u8; 32],
}

impl PreImage {
    /// `0x19 0x01 || domainSeparator || structHash`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(66);
        bytes.extend_from_slice(EIP712_PREFIX);
        bytes.extend_from_slice(&self.domain_separator);
        bytes.extend_from_slice(&self.struct_hash);
        bytes
    }
}

/// Validate the message and compute all three hashes
pub fn pre_image(message: &TypedMessage) -> SignerResult<PreImage> {
    message.validate_presence()?;

    let types = types_with_domain(&message.types);
    validate_types(&types, &message.primary_type)?;

    let domain_separator = hash_struct_at(DOMAIN_TYPE, &message.domain.to_value()?, &types, "domain")?;
    let struct_hash = hash_struct_at(&message.primary_type, &message.message, &types, "message")?;
    let digest = keccak256_concat(&[EIP712_PREFIX, &domain_separator, &struct_hash]);

    Ok(PreImage {
        domain_separator,
        struct_hash,
        digest,
    })
}

/// domainSeparator = hashStruct(eip712Domain)
pub fn domain_separator(message: &TypedMessage) -> SignerResult<[u8; 32]> {
    if message.domain.is_empty() {
        return Err(SignerError::malformed("domain", "missing or empty"));
    }
    let types = types_with_domain(&message.types);
    hash_struct_at(DOMAIN_TYPE, &message.domain.to_value()?, &types, "domain")
}

/// keccak256(0x19 0x01 || domainSeparator || hashStruct(message))
pub fn hash_typed_data(message: &TypedMessage) -> SignerResult<[u8; 32]> {
    Ok(pre_image(message)?.digest)
}
