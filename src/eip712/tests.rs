//! EIP-712 Integration Tests
//!
//! Test vectors from the EIP-712 specification.

use super::*;
use crate::crypto::MockScheme;
use crate::error::SignerError;
use crate::keys::KeyHolder;
use crate::utils::keccak256;
use crate::verify::SignatureVerifier;
use serde_json::json;

/// keccak256("cow"), the key behind the EIP-712 example's Cow
const COW_KEY: &str = "c85ef7d79691fe79573b1a7064c19c1a9819ebdbd1faaab1a8ec92344438aaf4";

fn mail_json() -> serde_json::Value {
    json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ],
            "Mail": [
                { "name": "from", "type": "Person" },
                { "name": "to", "type": "Person" },
                { "name": "contents", "type": "string" }
            ]
        },
        "primaryType": "Mail",
        "domain": {
            "name": "Ether Mail",
            "version": "1",
            "chainId": 1,
            "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
        },
        "message": {
            "from": {
                "name": "Cow",
                "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
            },
            "to": {
                "name": "Bob",
                "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"
            },
            "contents": "Hello, Bob!"
        }
    })
}

fn mail_message() -> TypedMessage {
    TypedMessage::from_value(mail_json()).unwrap()
}

/// Same message without a declared domain type, so the default gets inserted
fn mail_message_default_domain() -> TypedMessage {
    let mut value = mail_json();
    value["types"].as_object_mut().unwrap().remove("EIP712Domain");
    value["domain"].as_object_mut().unwrap().remove("version");
    TypedMessage::from_value(value).unwrap()
}

#[test]
fn test_eip712_mail_example() {
    let message = mail_message();
    let pre = pre_image(&message).unwrap();

    assert_eq!(
        hex::encode(pre.domain_separator),
        "f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f"
    );
    assert_eq!(
        hex::encode(pre.struct_hash),
        "c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e"
    );
    assert_eq!(
        hex::encode(hash_typed_data(&message).unwrap()),
        "be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2"
    );
}

#[test]
fn test_eip712_mail_signature_vector() {
    let key = KeyHolder::from_hex(COW_KEY).unwrap();
    assert_eq!(
        key.derive_address().to_string(),
        "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"
    );

    let signed = StructuredDataSigner::new(&key).sign(&mail_message()).unwrap();
    assert_eq!(
        signed.to_hex(),
        "0x4355c47d63924e8a72e509b65029052eb6c299d53a04e167c5775fd466751c9d\
         07299936d304c153f6443dfa05f40ff007d72911b6f72307f996231605b915621c"
    );
    assert_eq!(signed.signer, key.derive_address());
}

#[test]
fn test_default_domain_type_inserted() {
    let message = mail_message_default_domain();
    assert!(!message.types.contains_key(DOMAIN_TYPE));

    let pre = pre_image(&message).unwrap();

    let domain_type = b"EIP712Domain(string name,uint256 chainId,address verifyingContract)";
    let mut chain_id = [0u8; 32];
    chain_id[31] = 1;
    let mut contract = [0u8; 32];
    contract[12..].copy_from_slice(&[0xcc; 20]);

    let expected = keccak256(
        &[
            keccak256(domain_type).as_slice(),
            keccak256(b"Ether Mail").as_slice(),
            chain_id.as_slice(),
            contract.as_slice(),
        ]
        .concat(),
    );
    assert_eq!(pre.domain_separator, expected);

    // Struct hash does not depend on the domain
    assert_eq!(pre.struct_hash, pre_image(&mail_message()).unwrap().struct_hash);
}

#[test]
fn test_existing_domain_type_left_untouched() {
    // Declared domain type names only `name`; the other domain keys are ignored
    let mut value = mail_json();
    value["types"]["EIP712Domain"] = json!([{ "name": "name", "type": "string" }]);
    let message = TypedMessage::from_value(value).unwrap();

    let normalized = types_with_domain(&message.types);
    assert_eq!(normalized[DOMAIN_TYPE].len(), 1);

    let expected = keccak256(
        &[
            keccak256(b"EIP712Domain(string name)").as_slice(),
            keccak256(b"Ether Mail").as_slice(),
        ]
        .concat(),
    );
    assert_eq!(domain_separator(&message).unwrap(), expected);
}

#[test]
fn test_field_order_changes_hash() {
    let original = mail_message();

    let mut value = mail_json();
    value["types"]["Person"] = json!([
        { "name": "wallet", "type": "address" },
        { "name": "name", "type": "string" }
    ]);
    let reordered = TypedMessage::from_value(value).unwrap();

    assert_ne!(
        hash_typed_data(&original).unwrap(),
        hash_typed_data(&reordered).unwrap()
    );
}

#[test]
fn test_hash_is_deterministic() {
    let message = mail_message();
    assert_eq!(
        hash_typed_data(&message).unwrap(),
        hash_typed_data(&message.clone()).unwrap()
    );
}

#[test]
fn test_eip712_permit() {
    let message = TypedMessage::from_value(json!({
        "types": {
            "EIP712Domain": [
                { "name": "name", "type": "string" },
                { "name": "version", "type": "string" },
                { "name": "chainId", "type": "uint256" },
                { "name": "verifyingContract", "type": "address" }
            ],
            "Permit": [
                { "name": "owner", "type": "address" },
                { "name": "spender", "type": "address" },
                { "name": "value", "type": "uint256" },
                { "name": "nonce", "type": "uint256" },
                { "name": "deadline", "type": "uint256" }
            ]
        },
        "primaryType": "Permit",
        "domain": {
            "name": "USD Coin",
            "version": "2",
            "chainId": "0x89",
            "verifyingContract": "0x2791Bca1f2de4661ED88A30C99A7a9449Aa84174"
        },
        "message": {
            "owner": "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23",
            "spender": "0x1111111254EEB25477B68fb85Ed929f73A960582",
            "value": "115792089237316195423570985008687907853269984665640564039457584007913129639935",
            "nonce": 0,
            "deadline": "1700000000"
        }
    }))
    .unwrap();

    let key = KeyHolder::from_hex(COW_KEY).unwrap();
    let signed = StructuredDataSigner::new(&key).sign(&message).unwrap();

    assert_eq!(signed.to_bytes().len(), 65);
    assert!(signed.to_bytes()[64] == 27 || signed.to_bytes()[64] == 28);
    assert_eq!(signed.digest, hash_typed_data(&message).unwrap());
}

#[test]
fn test_eip712_struct_arrays() {
    let message = TypedMessage::from_value(json!({
        "types": {
            "Group": [
                { "name": "name", "type": "string" },
                { "name": "members", "type": "Person[]" }
            ],
            "Person": [
                { "name": "name", "type": "string" },
                { "name": "wallet", "type": "address" }
            ]
        },
        "primaryType": "Group",
        "domain": {
            "name": "Groups",
            "chainId": 10,
            "verifyingContract": "0x0000000000000000000000000000000000000042"
        },
        "message": {
            "name": "friends",
            "members": [
                { "name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826" },
                { "name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB" }
            ]
        }
    }))
    .unwrap();

    let types = types_with_domain(&message.types);
    let cow = hash_struct("Person", &message.message["members"][0], &types).unwrap();
    let bob = hash_struct("Person", &message.message["members"][1], &types).unwrap();

    let expected = keccak256(
        &[
            type_hash("Group", &types).unwrap().as_slice(),
            keccak256(b"friends").as_slice(),
            keccak256(&[cow, bob].concat()).as_slice(),
        ]
        .concat(),
    );
    assert_eq!(pre_image(&message).unwrap().struct_hash, expected);
}

#[test]
fn test_empty_message_is_malformed() {
    let mut value = mail_json();
    value["message"] = json!({});
    let message = TypedMessage::from_value(value).unwrap();

    let key = KeyHolder::from_hex(COW_KEY).unwrap();
    assert_eq!(
        StructuredDataSigner::new(&key).sign(&message),
        Err(SignerError::malformed("message", "missing or empty"))
    );
}

#[test]
fn test_missing_parts_are_malformed() {
    for part in ["domain", "types", "primaryType", "message"] {
        let mut value = mail_json();
        value.as_object_mut().unwrap().remove(part);
        let message = TypedMessage::from_value(value).unwrap();

        match hash_typed_data(&message) {
            Err(SignerError::MalformedTypedMessage { field, .. }) => assert_eq!(field, part),
            other => panic!("expected malformed {}, got {:?}", part, other),
        }
    }
}

#[test]
fn test_eip712_invalid_primary_type() {
    let mut value = mail_json();
    value["primaryType"] = json!("Letter");
    let message = TypedMessage::from_value(value).unwrap();

    assert!(matches!(
        hash_typed_data(&message),
        Err(SignerError::MalformedTypedMessage { field, .. }) if field == "primaryType"
    ));
}

#[test]
fn test_bad_field_value_names_path() {
    let mut value = mail_json();
    value["message"]["to"]["wallet"] = json!("0xnothex");
    let message = TypedMessage::from_value(value).unwrap();

    assert!(matches!(
        hash_typed_data(&message),
        Err(SignerError::MalformedTypedMessage { field, .. }) if field == "message.to.wallet"
    ));
}

#[test]
fn test_signature_recovers_to_signer() {
    let key = KeyHolder::from_hex(COW_KEY).unwrap();
    let signed = StructuredDataSigner::new(&key).sign(&mail_message()).unwrap();

    let verifier = SignatureVerifier::<crate::crypto::Secp256k1Scheme>::default();
    let published = crate::types::Signature::from_bytes(&signed.to_bytes()).unwrap();
    assert!(verifier
        .confirm(&signed.digest, &published, &key.derive_address())
        .unwrap());
}

#[test]
fn test_mock_scheme_sign_and_verify() {
    let key = KeyHolder::with_scheme(&[9u8; 32], MockScheme::new()).unwrap();
    let signed = StructuredDataSigner::new(&key).sign(&mail_message()).unwrap();
    assert_eq!(signed.signature.recovery_id, 0);
    assert_eq!(signed.to_bytes()[64], 27);
}

#[test]
fn test_corrupted_recovery_fails_verification() {
    let key = KeyHolder::with_scheme(&[9u8; 32], MockScheme::new()).unwrap();
    let signer = StructuredDataSigner::with_verifier(
        &key,
        SignatureVerifier::new(MockScheme::with_corrupted_recovery()),
    );

    assert!(matches!(
        signer.sign(&mail_message()),
        Err(SignerError::SignatureVerificationFailed { expected, .. }) if expected == key.derive_address()
    ));
}
