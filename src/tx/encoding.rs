//! Transaction Encoding
//!
//! Canonical signing payloads and signed serializations for the two supported
//! transaction types.
//!
//! Legacy (EIP-155):
//! - signing payload `rlp([nonce, gasPrice, gas, to, value, data, chainId, 0, 0])`
//! - signed form `rlp([nonce, gasPrice, gas, to, value, data, v, r, s])`
//!
//! Fee market (EIP-1559):
//! - signing payload `0x02 || rlp([chainId, nonce, tip, maxFee, gas, to, value, data, []])`
//! - signed form `0x02 || rlp([..., yParity, r, s])`

use super::rlp;
use super::types::{FeeParams, TransactionSpec, FEE_MARKET_TX_TYPE};
use crate::error::{SignerError, SignerResult};
use crate::types::Signature;
use crate::utils::keccak256;

/// Offset in `v = recovery_id + chain_id * 2 + 35`
pub const EIP155_V_OFFSET: u64 = 35;

/// EIP-155 `v` for a raw recovery id
pub fn eip155_v(recovery_id: u8, chain_id: u64) -> SignerResult<u64> {
    chain_id
        .checked_mul(2)
        .and_then(|v| v.checked_add(EIP155_V_OFFSET + u64::from(recovery_id)))
        .ok_or_else(|| SignerError::InvalidChainId(chain_id.to_string()))
}

/// Invert [`eip155_v`] into `(recovery_id, chain_id)`
pub fn split_eip155_v(v: u64) -> SignerResult<(u8, u64)> {
    if v < EIP155_V_OFFSET {
        return Err(SignerError::RecoveryFailed(format!(
            "v = {} carries no EIP-155 chain id",
            v
        )));
    }
    let offset = v - EIP155_V_OFFSET;
    Ok(((offset % 2) as u8, offset / 2))
}

/// The transaction fields shared by the signing payload and the signed form
fn body_items(spec: &TransactionSpec) -> Vec<Vec<u8>> {
    match spec.fees {
        FeeParams::Legacy { gas_price } => vec![
            rlp::encode_u64(spec.nonce),
            rlp::encode_u128(gas_price),
            rlp::encode_u64(spec.gas_limit),
            rlp::encode_bytes(spec.to.as_bytes()),
            rlp::encode_u128(spec.value),
            rlp::encode_bytes(&spec.data),
        ],
        FeeParams::FeeMarket {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        } => vec![
            rlp::encode_u64(spec.chain_id),
            rlp::encode_u64(spec.nonce),
            rlp::encode_u128(max_priority_fee_per_gas),
            rlp::encode_u128(max_fee_per_gas),
            rlp::encode_u64(spec.gas_limit),
            rlp::encode_bytes(spec.to.as_bytes()),
            rlp::encode_u128(spec.value),
            rlp::encode_bytes(&spec.data),
            // Access list, always empty
            rlp::encode_list(&[]),
        ],
    }
}

fn with_envelope(tx_type: u8, list: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + list.len());
    out.push(tx_type);
    out.extend(list);
    out
}

/// The bytes whose keccak256 gets signed
pub fn signing_payload(spec: &TransactionSpec) -> Vec<u8> {
    let mut items = body_items(spec);
    match spec.fees {
        FeeParams::Legacy { .. } => {
            items.push(rlp::encode_u64(spec.chain_id));
            items.push(rlp::encode_u64(0));
            items.push(rlp::encode_u64(0));
            rlp::encode_list(&items)
        }
        FeeParams::FeeMarket { .. } => with_envelope(FEE_MARKET_TX_TYPE, rlp::encode_list(&items)),
    }
}

pub fn signing_hash(spec: &TransactionSpec) -> [u8; 32] {
    keccak256(&signing_payload(spec))
}

/// Serialize a signed transaction for broadcast
pub fn encode_signed(spec: &TransactionSpec, signature: &Signature) -> SignerResult<Vec<u8>> {
    let mut items = body_items(spec);
    match spec.fees {
        FeeParams::Legacy { .. } => {
            items.push(rlp::encode_u64(eip155_v(signature.recovery_id, spec.chain_id)?));
            items.push(rlp::encode_uint_bytes(&signature.r));
            items.push(rlp::encode_uint_bytes(&signature.s));
            Ok(rlp::encode_list(&items))
        }
        FeeParams::FeeMarket { .. } => {
            items.push(rlp::encode_u64(u64::from(signature.recovery_id)));
            items.push(rlp::encode_uint_bytes(&signature.r));
            items.push(rlp::encode_uint_bytes(&signature.s));
            Ok(with_envelope(FEE_MARKET_TX_TYPE, rlp::encode_list(&items)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip155_v_values() {
        assert_eq!(eip155_v(0, 1).unwrap(), 37);
        assert_eq!(eip155_v(1, 1).unwrap(), 38);
        assert_eq!(eip155_v(0, 137).unwrap(), 309);
        assert_eq!(eip155_v(1, 10).unwrap(), 56);
    }

    #[test]
    fn test_eip155_v_round_trip() {
        for chain_id in [1u64, 137, 10] {
            for recovery_id in [0u8, 1] {
                let v = eip155_v(recovery_id, chain_id).unwrap();
                assert_eq!(split_eip155_v(v).unwrap(), (recovery_id, chain_id));
            }
        }
    }

    #[test]
    fn test_eip155_v_overflow() {
        assert!(eip155_v(1, u64::MAX).is_err());
    }

    #[test]
    fn test_pre_eip155_v_rejected() {
        assert!(matches!(split_eip155_v(27), Err(SignerError::RecoveryFailed(_))));
    }
}
