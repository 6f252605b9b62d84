//! Chain Identifiers
//!
//! The orchestration service names chains as `eip155-<id>`. The signer needs
//! the bare numeric id for EIP-155 `v` values and fee-market payloads.

use crate::error::{SignerError, SignerResult};

/// Prefix used by the operation service
pub const EXTERNAL_PREFIX: &str = "eip155-";

/// CAIP-2 namespace prefix
pub const CAIP2_PREFIX: &str = "eip155:";

/// EVM Chain IDs
pub mod chain_ids {
    pub const ETHEREUM: u64 = 1;
    pub const OPTIMISM: u64 = 10;
    pub const BSC: u64 = 56;
    pub const POLYGON: u64 = 137;
    pub const BASE: u64 = 8453;
    pub const ARBITRUM: u64 = 42161;
    pub const SEPOLIA: u64 = 11155111;
}

/// Parse `eip155-137`, `eip155:137` or `137` into 137
pub fn parse_chain_id(external: &str) -> SignerResult<u64> {
    let trimmed = external.trim();
    let digits = trimmed
        .strip_prefix(EXTERNAL_PREFIX)
        .or_else(|| trimmed.strip_prefix(CAIP2_PREFIX))
        .unwrap_or(trimmed);

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SignerError::InvalidChainId(external.to_string()));
    }

    digits
        .parse::<u64>()
        .map_err(|_| SignerError::InvalidChainId(external.to_string()))
}

/// Inverse of [`parse_chain_id`]. Chain 0 maps to the empty string.
pub fn to_external_chain_id(chain_id: u64) -> String {
    if chain_id == 0 {
        return String::new();
    }
    format!("{}{}", EXTERNAL_PREFIX, chain_id)
}
