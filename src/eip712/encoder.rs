//! EIP-712 Type Encoding
//!
//! Implements `encodeType` and `encodeData`. Every member encodes to one
//! 32-byte word:
//! - atomic values are padded in place
//! - `string` and `bytes` are keccak-hashed
//! - nested structs contribute their `hashStruct`
//! - arrays contribute the keccak of their concatenated element words

use super::hasher::hash_struct_at;
use super::types::*;
use crate::error::{SignerError, SignerResult};
use crate::types::Address;
use crate::utils::{decode_hex, keccak256, strip_hex_prefix};
use serde_json::Value;
use std::collections::BTreeSet;

type Word = [u8; 32];

/// Encode a type string for a struct type.
///
/// Format: `Primary(type1 name1,...)Dep1(...)Dep2(...)` with the primary type
/// first and every referenced struct type after it in alphabetical order.
pub fn encode_type(type_name: &str, types: &TypeMap) -> SignerResult<String> {
    let fields = types.get(type_name).ok_or_else(|| {
        SignerError::malformed("types", format!("{} is not declared", type_name))
    })?;

    let mut result = format_type_string(type_name, fields);

    for dep in find_type_dependencies(type_name, types) {
        if let Some(dep_fields) = types.get(&dep) {
            result.push_str(&format_type_string(&dep, dep_fields));
        }
    }

    Ok(result)
}

/// Format a single type string
fn format_type_string(type_name: &str, fields: &[TypedDataField]) -> String {
    let field_strs: Vec<String> = fields
        .iter()
        .map(|f| format!("{} {}", f.type_name, f.name))
        .collect();

    format!("{}({})", type_name, field_strs.join(","))
}

/// All struct types reachable from `type_name`, excluding itself, sorted
pub fn find_type_dependencies(type_name: &str, types: &TypeMap) -> BTreeSet<String> {
    let mut seen = BTreeSet::new();
    let mut to_visit = vec![type_name.to_string()];

    while let Some(current) = to_visit.pop() {
        if let Some(fields) = types.get(&current) {
            for field in fields {
                let referenced = base_type(&field.type_name);
                if types.contains_key(referenced) && seen.insert(referenced.to_string()) {
                    to_visit.push(referenced.to_string());
                }
            }
        }
    }

    seen.remove(type_name);
    seen
}

/// typeHash = keccak256(encodeType(typeOf(s)))
pub fn type_hash(type_name: &str, types: &TypeMap) -> SignerResult<Word> {
    let encoded = encode_type(type_name, types)?;
    Ok(keccak256(encoded.as_bytes()))
}

/// `typeHash || encodeData(value)` for a struct value
pub fn encode_struct(
    type_name: &str,
    value: &Value,
    types: &TypeMap,
    path: &str,
) -> SignerResult<Vec<u8>> {
    let obj = value
        .as_object()
        .ok_or_else(|| SignerError::malformed(path, format!("expected {} object", type_name)))?;

    let fields = types.get(type_name).ok_or_else(|| {
        SignerError::malformed("types", format!("{} is not declared", type_name))
    })?;

    let mut encoded = Vec::with_capacity(32 * (fields.len() + 1));
    encoded.extend_from_slice(&type_hash(type_name, types)?);

    for field in fields {
        let field_path = format!("{}.{}", path, field.name);
        let field_value = match obj.get(&field.name) {
            None | Some(Value::Null) => {
                return Err(SignerError::malformed(field_path, "missing value"));
            }
            Some(v) => v,
        };
        encoded.extend_from_slice(&encode_field(&field.type_name, field_value, types, &field_path)?);
    }

    Ok(encoded)
}

/// Encode one member value to its 32-byte word
pub fn encode_field(
    type_name: &str,
    value: &Value,
    types: &TypeMap,
    path: &str,
) -> SignerResult<Word> {
    if type_name.ends_with(']') {
        return encode_array(type_name, value, types, path);
    }

    if types.contains_key(type_name) {
        return hash_struct_at(type_name, value, types, path);
    }

    match type_name {
        "string" => {
            let s = value
                .as_str()
                .ok_or_else(|| SignerError::malformed(path, format!("expected string, got {}", value)))?;
            Ok(keccak256(s.as_bytes()))
        }
        "bytes" => {
            let bytes = parse_hex_value(value, path)?;
            Ok(keccak256(&bytes))
        }
        _ => encode_atomic(type_name, value, path),
    }
}

/// Encode an array value (dynamic `T[]` or fixed `T[N]`, possibly nested)
fn encode_array(type_name: &str, value: &Value, types: &TypeMap, path: &str) -> SignerResult<Word> {
    let arr = value
        .as_array()
        .ok_or_else(|| SignerError::malformed(path, format!("expected array, got {}", value)))?;

    let bracket_pos = type_name
        .rfind('[')
        .ok_or_else(|| SignerError::malformed(path, format!("invalid array type {}", type_name)))?;
    let element_type = &type_name[..bracket_pos];
    let length = &type_name[bracket_pos + 1..type_name.len() - 1];

    if !length.is_empty() {
        let expected: usize = length
            .parse()
            .map_err(|_| SignerError::malformed(path, format!("invalid array type {}", type_name)))?;
        if arr.len() != expected {
            return Err(SignerError::malformed(
                path,
                format!("expected {} elements, got {}", expected, arr.len()),
            ));
        }
    }

    let mut encoded = Vec::with_capacity(32 * arr.len());
    for (i, item) in arr.iter().enumerate() {
        let item_path = format!("{}[{}]", path, i);
        encoded.extend_from_slice(&encode_field(element_type, item, types, &item_path)?);
    }

    Ok(keccak256(&encoded))
}

/// Encode an atomic (fixed-size) value
fn encode_atomic(type_name: &str, value: &Value, path: &str) -> SignerResult<Word> {
    let mut result = [0u8; 32];

    // address - 20 bytes, left-padded to 32
    if type_name == "address" {
        let addr = value
            .as_str()
            .ok_or_else(|| SignerError::malformed(path, format!("expected address, got {}", value)))?;
        let addr: Address = addr
            .parse()
            .map_err(|e: SignerError| SignerError::malformed(path, e.to_string()))?;
        result[12..].copy_from_slice(addr.as_bytes());
        return Ok(result);
    }

    if type_name == "bool" {
        let b = match value {
            Value::Bool(b) => *b,
            Value::String(s) if s == "true" => true,
            Value::String(s) if s == "false" => false,
            other => {
                return Err(SignerError::malformed(path, format!("expected bool, got {}", other)));
            }
        };
        result[31] = u8::from(b);
        return Ok(result);
    }

    if let Some(bits) = type_name.strip_prefix("uint") {
        let bits = parse_bits(bits, type_name, path)?;
        let (negative, magnitude) = parse_integer(value, path)?;
        if negative && magnitude != [0u8; 32] {
            return Err(SignerError::malformed(path, format!("negative value for {}", type_name)));
        }
        if bit_len(&magnitude) > bits {
            return Err(SignerError::malformed(path, format!("value overflows {}", type_name)));
        }
        return Ok(magnitude);
    }

    if let Some(bits) = type_name.strip_prefix("int") {
        let bits = parse_bits(bits, type_name, path)?;
        let (negative, magnitude) = parse_integer(value, path)?;
        let len = bit_len(&magnitude);
        let fits = if negative {
            // -2^(bits-1) is the smallest value
            len < bits || (len == bits && count_ones(&magnitude) == 1)
        } else {
            len < bits
        };
        if !fits {
            return Err(SignerError::malformed(path, format!("value overflows {}", type_name)));
        }
        return Ok(if negative { negate(&magnitude) } else { magnitude });
    }

    // bytesN (fixed-size bytes, right-padded)
    if let Some(size) = type_name.strip_prefix("bytes") {
        let size: usize = size
            .parse()
            .map_err(|_| SignerError::malformed(path, format!("unknown type {}", type_name)))?;
        let bytes = parse_hex_value(value, path)?;
        if bytes.len() > size {
            return Err(SignerError::malformed(
                path,
                format!("bytes too long: {} > {}", bytes.len(), size),
            ));
        }
        result[..bytes.len()].copy_from_slice(&bytes);
        return Ok(result);
    }

    Err(SignerError::malformed(path, format!("unknown type {}", type_name)))
}

fn parse_bits(bits: &str, type_name: &str, path: &str) -> SignerResult<usize> {
    match bits.parse::<usize>() {
        Ok(n) if n > 0 && n <= 256 && n % 8 == 0 => Ok(n),
        _ => Err(SignerError::malformed(path, format!("unknown type {}", type_name))),
    }
}

fn parse_hex_value(value: &Value, path: &str) -> SignerResult<Vec<u8>> {
    let s = value
        .as_str()
        .ok_or_else(|| SignerError::malformed(path, format!("expected hex string, got {}", value)))?;
    decode_hex(s).map_err(|e| SignerError::malformed(path, format!("invalid hex: {}", e)))
}

/// Parse an integer value into (is_negative, 256-bit magnitude).
///
/// Accepts JSON numbers, decimal strings and `0x` hex strings, each with an
/// optional leading `-`.
fn parse_integer(value: &Value, path: &str) -> SignerResult<(bool, Word)> {
    let invalid = || SignerError::malformed(path, format!("invalid integer {}", value));

    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                Ok((false, word_from_u128(u as u128)))
            } else if let Some(i) = n.as_i64() {
                Ok((i < 0, word_from_u128(i.unsigned_abs() as u128)))
            } else {
                // Floats, or integers beyond 64 bits that lost precision
                Err(invalid())
            }
        }
        Value::String(s) => {
            let s = s.trim();
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s),
            };
            let magnitude = if digits.starts_with("0x") || digits.starts_with("0X") {
                parse_u256_hex(strip_hex_prefix(digits))
            } else {
                parse_u256_decimal(digits)
            };
            magnitude.map(|m| (negative, m)).ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

fn word_from_u128(n: u128) -> Word {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&n.to_be_bytes());
    out
}

fn parse_u256_decimal(s: &str) -> Option<Word> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut out = [0u8; 32];
    for digit in s.bytes().map(|b| b - b'0') {
        let mut carry = u16::from(digit);
        for byte in out.iter_mut().rev() {
            let v = u16::from(*byte) * 10 + carry;
            *byte = (v & 0xff) as u8;
            carry = v >> 8;
        }
        if carry != 0 {
            return None;
        }
    }
    Some(out)
}

fn parse_u256_hex(s: &str) -> Option<Word> {
    if s.is_empty() {
        return None;
    }
    let digits = s.trim_start_matches('0');
    if digits.len() > 64 {
        return None;
    }

    let bytes = hex::decode(format!("{:0>64}", digits)).ok()?;
    let mut out = [0u8; 32];
    out.copy_from_slice(&bytes);
    Some(out)
}

fn bit_len(word: &Word) -> usize {
    for (i, b) in word.iter().enumerate() {
        if *b != 0 {
            return (32 - i) * 8 - b.leading_zeros() as usize;
        }
    }
    0
}

fn count_ones(word: &Word) -> u32 {
    word.iter().map(|b| b.count_ones()).sum()
}

/// Two's complement negation over 256 bits
fn negate(word: &Word) -> Word {
    let mut out = [0u8; 32];
    let mut carry = 1u16;
    for i in (0..32).rev() {
        let v = u16::from(!word[i]) + carry;
        out[i] = (v & 0xff) as u8;
        carry = v >> 8;
    }
    out
}

#[cfg(test)]
mod encoder_tests {
    use super::*;
    use serde_json::json;

    fn mail_types() -> TypeMap {
        let mut types = TypeMap::new();
        types.insert(
            "Mail".to_string(),
            vec![
                TypedDataField::new("from", "Person"),
                TypedDataField::new("to", "Person"),
                TypedDataField::new("contents", "string"),
            ],
        );
        types.insert(
            "Person".to_string(),
            vec![
                TypedDataField::new("name", "string"),
                TypedDataField::new("wallet", "address"),
            ],
        );
        types
    }

    #[test]
    fn test_encode_type_simple() {
        let types = mail_types();
        let encoded = encode_type("Person", &types).unwrap();
        assert_eq!(encoded, "Person(string name,address wallet)");
    }

    #[test]
    fn test_encode_type_with_dependencies() {
        let types = mail_types();
        let encoded = encode_type("Mail", &types).unwrap();
        assert_eq!(
            encoded,
            "Mail(Person from,Person to,string contents)Person(string name,address wallet)"
        );
    }

    #[test]
    fn test_encode_type_sorts_dependencies() {
        let mut types = TypeMap::new();
        types.insert(
            "Order".into(),
            vec![
                TypedDataField::new("zeta", "Zeta"),
                TypedDataField::new("items", "Item[]"),
            ],
        );
        types.insert("Zeta".into(), vec![TypedDataField::new("alpha", "Alpha")]);
        types.insert("Item".into(), vec![TypedDataField::new("id", "uint256")]);
        types.insert("Alpha".into(), vec![TypedDataField::new("x", "bool")]);

        assert_eq!(
            encode_type("Order", &types).unwrap(),
            "Order(Zeta zeta,Item[] items)Alpha(bool x)Item(uint256 id)Zeta(Alpha alpha)"
        );
    }

    #[test]
    fn test_mail_type_hash() {
        let types = mail_types();
        assert_eq!(
            hex::encode(type_hash("Mail", &types).unwrap()),
            "a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2"
        );
    }

    #[test]
    fn test_encode_uint_forms() {
        let types = TypeMap::new();
        let dec = encode_field("uint256", &json!("255"), &types, "v").unwrap();
        let hex = encode_field("uint256", &json!("0xff"), &types, "v").unwrap();
        let num = encode_field("uint256", &json!(255), &types, "v").unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec, num);
        assert_eq!(dec[31], 0xff);
        assert!(dec[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_encode_uint256_max() {
        let types = TypeMap::new();
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let word = encode_field("uint256", &json!(max), &types, "v").unwrap();
        assert_eq!(word, [0xff; 32]);

        let too_big = "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(encode_field("uint256", &json!(too_big), &types, "v").is_err());
    }

    #[test]
    fn test_encode_uint_range() {
        let types = TypeMap::new();
        assert!(encode_field("uint8", &json!(255), &types, "v").is_ok());
        assert!(encode_field("uint8", &json!(256), &types, "v").is_err());
        assert!(encode_field("uint8", &json!(-1), &types, "v").is_err());
    }

    #[test]
    fn test_encode_negative_int() {
        let types = TypeMap::new();
        let word = encode_field("int256", &json!(-1), &types, "v").unwrap();
        assert_eq!(word, [0xff; 32]);

        let word = encode_field("int8", &json!("-128"), &types, "v").unwrap();
        assert_eq!(word[31], 0x80);
        assert!(word[..31].iter().all(|b| *b == 0xff));

        assert!(encode_field("int8", &json!(-129), &types, "v").is_err());
        assert!(encode_field("int8", &json!(128), &types, "v").is_err());
    }

    #[test]
    fn test_encode_bool_and_bytes() {
        let types = TypeMap::new();
        assert_eq!(encode_field("bool", &json!(true), &types, "v").unwrap()[31], 1);
        assert_eq!(encode_field("bool", &json!("false"), &types, "v").unwrap()[31], 0);

        let word = encode_field("bytes4", &json!("0xdeadbeef"), &types, "v").unwrap();
        assert_eq!(&word[..4], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(word[4..].iter().all(|b| *b == 0));
        assert!(encode_field("bytes2", &json!("0xdeadbeef"), &types, "v").is_err());

        let dynamic = encode_field("bytes", &json!("0xdeadbeef"), &types, "v").unwrap();
        assert_eq!(dynamic, keccak256(&[0xde, 0xad, 0xbe, 0xef]));
    }

    #[test]
    fn test_encode_address_errors_name_path() {
        let types = TypeMap::new();
        let err = encode_field("address", &json!("0x1234"), &types, "message.to").unwrap_err();
        assert!(matches!(
            err,
            SignerError::MalformedTypedMessage { ref field, .. } if field == "message.to"
        ));
    }

    #[test]
    fn test_encode_arrays() {
        let types = TypeMap::new();
        let a = encode_field("uint256", &json!(1), &types, "v").unwrap();
        let b = encode_field("uint256", &json!(2), &types, "v").unwrap();

        let word = encode_field("uint256[]", &json!([1, 2]), &types, "v").unwrap();
        assert_eq!(word, keccak256(&[a, b].concat()));

        let fixed = encode_field("uint256[2]", &json!([1, 2]), &types, "v").unwrap();
        assert_eq!(fixed, word);
        assert!(encode_field("uint256[3]", &json!([1, 2]), &types, "v").is_err());
    }

    #[test]
    fn test_encode_nested_arrays() {
        let types = TypeMap::new();
        let inner_a = encode_field("uint8[]", &json!([1]), &types, "v").unwrap();
        let inner_b = encode_field("uint8[]", &json!([2, 3]), &types, "v").unwrap();

        let word = encode_field("uint8[][]", &json!([[1], [2, 3]]), &types, "v").unwrap();
        assert_eq!(word, keccak256(&[inner_a, inner_b].concat()));
    }

    #[test]
    fn test_missing_struct_field() {
        let types = mail_types();
        let err = encode_struct(
            "Person",
            &json!({ "name": "Cow" }),
            &types,
            "message.from",
        )
        .unwrap_err();
        assert_eq!(err, SignerError::malformed("message.from.wallet", "missing value"));
    }
}
