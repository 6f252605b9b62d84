//! Signed Transaction Decoding
//!
//! Parses a serialized signed transaction back into its `TransactionSpec` and signature so
//! the sender can be recovered from the exact bytes that would be broadcast.

use super::encoding::{signing_hash, split_eip155_v};
use super::rlp::{self, RlpItem};
use super::types::{FeeParams, TransactionSpec, FEE_MARKET_TX_TYPE};
use crate::crypto::SignatureScheme;
use crate::error::{SignerError, SignerResult};
use crate::types::{Address, Signature};
use crate::verify::SignatureVerifier;

const LEGACY_FIELDS: usize = 9;
const FEE_MARKET_FIELDS: usize = 12;

/// Split a signed transaction into the `TransactionSpec` it commits to and its signature
pub fn decode_signed_transaction(raw: &[u8]) -> SignerResult<(TransactionSpec, Signature)> {
    match raw.first() {
        None => Err(SignerError::MalformedTransaction("empty input".into())),
        // An RLP list prefix means no envelope
        Some(&prefix) if prefix >= 0xc0 => decode_legacy(raw),
        Some(&FEE_MARKET_TX_TYPE) => decode_fee_market(&raw[1..]),
        Some(&other) => Err(SignerError::MalformedTransaction(format!(
            "unsupported transaction type 0x{:02x}",
            other
        ))),
    }
}

/// Recover the address that signed `raw`
pub fn recover_sender<S: SignatureScheme>(
    raw: &[u8],
    verifier: &SignatureVerifier<S>,
) -> SignerResult<Address> {
    let (spec, signature) = decode_signed_transaction(raw)?;
    verifier.recover_address(&signing_hash(&spec), &signature)
}

fn decode_legacy(raw: &[u8]) -> SignerResult<(TransactionSpec, Signature)> {
    let item = rlp::decode(raw)?;
    let fields = expect_fields(&item, LEGACY_FIELDS)?;

    let v = fields[6].as_u64("v")?;
    let (recovery_id, chain_id) = split_eip155_v(v)?;

    let spec = TransactionSpec {
        chain_id,
        nonce: fields[0].as_u64("nonce")?,
        to: decode_to(&fields[3])?,
        value: fields[4].as_u128("value")?,
        gas_limit: fields[2].as_u64("gasLimit")?,
        data: fields[5].as_bytes("data")?.to_vec(),
        fees: FeeParams::Legacy {
            gas_price: fields[1].as_u128("gasPrice")?,
        },
    };
    let signature = Signature::new(fields[7].as_word("r")?, fields[8].as_word("s")?, recovery_id);

    Ok((spec, signature))
}

fn decode_fee_market(payload: &[u8]) -> SignerResult<(TransactionSpec, Signature)> {
    let item = rlp::decode(payload)?;
    let fields = expect_fields(&item, FEE_MARKET_FIELDS)?;

    if !fields[8].as_list("accessList")?.is_empty() {
        return Err(SignerError::MalformedTransaction(
            "non-empty access lists are not supported".into(),
        ));
    }

    let y_parity = fields[9].as_u64("yParity")?;
    if y_parity > 1 {
        return Err(SignerError::MalformedTransaction(format!(
            "yParity must be 0 or 1, got {}",
            y_parity
        )));
    }

    let spec = TransactionSpec {
        chain_id: fields[0].as_u64("chainId")?,
        nonce: fields[1].as_u64("nonce")?,
        to: decode_to(&fields[5])?,
        value: fields[6].as_u128("value")?,
        gas_limit: fields[4].as_u64("gasLimit")?,
        data: fields[7].as_bytes("data")?.to_vec(),
        fees: FeeParams::FeeMarket {
            max_fee_per_gas: fields[3].as_u128("maxFeePerGas")?,
            max_priority_fee_per_gas: fields[2].as_u128("maxPriorityFeePerGas")?,
        },
    };
    let signature = Signature::new(
        fields[10].as_word("r")?,
        fields[11].as_word("s")?,
        y_parity as u8,
    );

    Ok((spec, signature))
}

fn expect_fields<'i, 'a>(item: &'i RlpItem<'a>, expected: usize) -> SignerResult<&'i [RlpItem<'a>]> {
    let fields = item.as_list("transaction")?;
    if fields.len() != expected {
        return Err(SignerError::MalformedTransaction(format!(
            "expected {} fields, got {}",
            expected,
            fields.len()
        )));
    }
    Ok(fields)
}

/// Contract creation is out of scope, so `to` is always 20 bytes
fn decode_to(item: &RlpItem<'_>) -> SignerResult<Address> {
    let bytes = item.as_bytes("to")?;
    Address::from_slice(bytes)
        .map_err(|_| SignerError::MalformedTransaction(format!("to: expected 20 bytes, got {}", bytes.len())))
}
