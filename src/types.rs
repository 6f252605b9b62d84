//! Shared types for the signing pipelines

use crate::eip712::SignedTypedData;
use crate::error::{SignerError, SignerResult};
use crate::tx::SignedTransaction;
use crate::utils::{decode_hex, keccak256, to_checksum_address};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Offset added to a raw recovery id for Ethereum-style `v`
pub const ETH_V_OFFSET: u8 = 27;

// =============================================================================
// Address
// =============================================================================

/// A 20-byte EVM account address
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    /// Derive an address from an uncompressed public key (x || y, no 0x04 tag)
    pub fn from_public_key(public_key: &[u8; 64]) -> Self {
        let hash = keccak256(public_key);
        let mut address = [0u8; 20];
        address.copy_from_slice(&hash[12..]);
        Self(address)
    }

    pub fn from_slice(bytes: &[u8]) -> SignerResult<Self> {
        let address: [u8; 20] = bytes.try_into().map_err(|_| {
            SignerError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(address))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// EIP-55 mixed-case form
    pub fn to_checksum(&self) -> String {
        to_checksum_address(&self.0)
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = SignerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.len() != 40 {
            return Err(SignerError::InvalidAddress(format!(
                "expected 40 hex chars, got {} in {:?}",
                body.len(),
                s
            )));
        }

        let bytes = hex::decode(body)
            .map_err(|e| SignerError::InvalidAddress(format!("invalid hex in {:?}: {}", s, e)))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Signature
// =============================================================================

/// Recoverable ECDSA signature with a raw recovery id (0 or 1 in practice)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub recovery_id: u8,
}

impl Signature {
    pub fn new(r: [u8; 32], s: [u8; 32], recovery_id: u8) -> Self {
        Self { r, s, recovery_id }
    }

    /// Parse a 65-byte signature (r || s || v).
    ///
    /// A trailing byte of 27 or above is treated as Ethereum-style `v` and
    /// shifted back to a raw recovery id. Anything else is kept as-is and
    /// left for the verifier to reject.
    pub fn from_bytes(bytes: &[u8]) -> SignerResult<Self> {
        if bytes.len() != 65 {
            return Err(SignerError::RecoveryFailed(format!(
                "expected 65 signature bytes, got {}",
                bytes.len()
            )));
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[0..32]);
        s.copy_from_slice(&bytes[32..64]);

        let v = bytes[64];
        let recovery_id = if v >= ETH_V_OFFSET { v - ETH_V_OFFSET } else { v };

        Ok(Self { r, s, recovery_id })
    }

    pub fn from_hex(s: &str) -> SignerResult<Self> {
        let bytes = decode_hex(s).map_err(|e| SignerError::RecoveryFailed(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// r || s (64 bytes)
    pub fn compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// r || s || recovery_id, with the raw recovery id
    pub fn to_raw_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[..64].copy_from_slice(&self.compact());
        out[64] = self.recovery_id;
        out
    }

    /// Ethereum-convention `v` (27/28 for recovery ids 0/1)
    pub fn eth_v(&self) -> u8 {
        if self.recovery_id < ETH_V_OFFSET {
            self.recovery_id + ETH_V_OFFSET
        } else {
            self.recovery_id
        }
    }

    /// r || s || v with Ethereum-convention `v`
    pub fn to_eth_bytes(&self) -> [u8; 65] {
        let mut out = self.to_raw_bytes();
        out[64] = self.eth_v();
        out
    }

    pub fn to_eth_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_eth_bytes()))
    }
}

// =============================================================================
// Signed artifacts
// =============================================================================

/// Output of a sign-and-verify call, ready for the network layer
#[derive(Debug, Clone)]
pub enum SignedArtifact {
    TypedData(SignedTypedData),
    Transaction(SignedTransaction),
}

impl SignedArtifact {
    /// `0x`-prefixed hex: the 65-byte signature, or the full signed transaction
    pub fn to_hex(&self) -> String {
        match self {
            Self::TypedData(signed) => signed.to_hex(),
            Self::Transaction(signed) => signed.to_hex(),
        }
    }
}
