use super::*;
use crate::crypto::Secp256k1Scheme;
use crate::tx::decode_signed_transaction;
use crate::types::Signature;
use crate::verify::SignatureVerifier;
use serde_json::json;

const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
const TEST_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

fn typed_data() -> Value {
    json!({
        "types": {
            "Order": [
                { "name": "id", "type": "uint256" },
                { "name": "owner", "type": "address" }
            ]
        },
        "primaryType": "Order",
        "domain": {
            "name": "Relay",
            "chainId": 1,
            "verifyingContract": "0x0000000000000000000000000000000000000042"
        },
        "message": {
            "id": "7",
            "owner": TEST_ADDRESS
        }
    })
}

fn typed_operation(data: Value) -> Operation {
    Operation {
        op_type: "SWAP".into(),
        format: "TYPED_DATA".into(),
        data,
        chain_id: "eip155-1".into(),
        from: TEST_ADDRESS.into(),
        to: String::new(),
    }
}

fn transaction_operation(data: Value) -> Operation {
    Operation {
        op_type: "TRANSFER".into(),
        format: "TRANSACTION".into(),
        data,
        chain_id: "eip155-137".into(),
        from: TEST_ADDRESS.into(),
        to: "0x0000000000000000000000000000000000000001".into(),
    }
}

#[test]
fn test_operation_deserializes_service_json() {
    let op: Operation = serde_json::from_value(json!({
        "type": "SWAP",
        "format": "TRANSACTION",
        "data": "0xa9059cbb",
        "chainId": "eip155-10",
        "from": TEST_ADDRESS,
        "to": "0x0000000000000000000000000000000000000001",
        "txRpcUrl": "https://example.invalid"
    }))
    .unwrap();

    assert_eq!(op.op_type, "SWAP");
    assert_eq!(op.format(), OperationFormat::Transaction);
    assert_eq!(op.chain_id, "eip155-10");
}

#[test]
fn test_sign_typed_data_operation() {
    let key = KeyHolder::from_hex(TEST_KEY).unwrap();
    let signer = OperationSigner::new(&key);

    // The service sends typed data as a JSON string
    let op = typed_operation(Value::String(typed_data().to_string()));
    let signed = signer.sign(&op).unwrap();

    assert_eq!(signed.op_type, "SWAP");
    assert_eq!(signed.chain_id, "eip155-1");
    assert_eq!(signed.from, TEST_ADDRESS);
    assert_eq!(signed.data, op.data);

    let signature = Signature::from_hex(&signed.signature).unwrap();
    let digest = crate::eip712::hash_typed_data(&TypedMessage::from_value(typed_data()).unwrap()).unwrap();
    let verifier = SignatureVerifier::<Secp256k1Scheme>::default();
    assert!(verifier.confirm(&digest, &signature, &key.derive_address()).unwrap());

    // Inline JSON gives the same signature
    let inline = signer.sign(&typed_operation(typed_data())).unwrap();
    assert_eq!(inline.signature, signed.signature);
}

#[test]
fn test_sign_transaction_operation_json_and_raw() {
    let key = KeyHolder::from_hex(TEST_KEY).unwrap();
    let signer = OperationSigner::new(&key);

    let structured = transaction_operation(Value::String(
        json!({ "nonce": "0x3", "gasLimit": "0x5208", "maxFeePerGas": "0x6fc23ac00" }).to_string(),
    ));
    let signed = signer.sign(&structured).unwrap();
    let raw = crate::utils::decode_hex(&signed.signature).unwrap();
    let (spec, _) = decode_signed_transaction(&raw).unwrap();
    assert_eq!(spec.chain_id, 137);
    assert_eq!(spec.nonce, 3);
    assert_eq!(spec.gas_limit, 21000);
    assert!(spec.is_fee_market());

    let raw_op = transaction_operation(json!("0xa9059cbb"));
    let signed = signer.sign(&raw_op).unwrap();
    let raw = crate::utils::decode_hex(&signed.signature).unwrap();
    let (spec, _) = decode_signed_transaction(&raw).unwrap();
    assert_eq!(spec.data, vec![0xa9, 0x05, 0x9c, 0xbb]);
    assert_eq!(spec.gas_limit, crate::tx::DEFAULT_GAS_LIMIT);
    assert!(!spec.is_fee_market());
}

#[test]
fn test_classify_transaction() {
    assert!(matches!(
        classify_transaction(&json!({ "nonce": "0x1" })).unwrap(),
        TransactionInput::Structured(TransactionFields { nonce: Some(1), .. })
    ));
    assert_eq!(
        classify_transaction(&json!("0xdead")).unwrap(),
        TransactionInput::RawPayload(vec![0xde, 0xad])
    );
    assert_eq!(
        classify_transaction(&json!("")).unwrap(),
        TransactionInput::RawPayload(vec![])
    );
    assert!(classify_transaction(&json!("not hex")).is_err());
    assert!(classify_transaction(&json!(42)).is_err());
}

#[test]
fn test_unknown_format_rejected() {
    let key = KeyHolder::from_hex(TEST_KEY).unwrap();
    let mut op = typed_operation(typed_data());
    op.format = "PERSONAL_SIGN".into();

    assert_eq!(op.format(), OperationFormat::Unknown);
    assert_eq!(
        OperationSigner::new(&key).sign(&op),
        Err(SignerError::UnsupportedOperationFormat("PERSONAL_SIGN".into()))
    );
}

#[test]
fn test_sign_all_collects_failures() {
    let key = KeyHolder::from_hex(TEST_KEY).unwrap();
    let mut bad_chain = transaction_operation(json!("0x"));
    bad_chain.chain_id = "notanumber".into();

    let mut empty_message = typed_data();
    empty_message["message"] = json!({});

    let operations = vec![
        typed_operation(typed_data()),
        bad_chain,
        typed_operation(empty_message),
        transaction_operation(json!("0x")),
    ];

    let batch = OperationSigner::new(&key).sign_all(&operations);
    assert_eq!(batch.signed.len(), 2);
    assert_eq!(batch.failures.len(), 2);
    assert_eq!(batch.failures[0].index, 1);
    assert_eq!(batch.failures[0].code, ErrorCode::InvalidChainId);
    assert_eq!(batch.failures[1].index, 2);
    assert_eq!(batch.failures[1].code, ErrorCode::MalformedTypedMessage);

    let json = serde_json::to_value(&batch).unwrap();
    assert_eq!(json["signed"][0]["chainId"], json!("eip155-1"));
    assert_eq!(json["failures"][0]["code"], json!("invalid_chain_id"));
}
