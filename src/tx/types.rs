//! Transaction Types
//!
//! `TransactionSpec` is the fully resolved transaction. Inputs arrive either as
//! a structured JSON descriptor with optional fields or as a bare calldata
//! payload, and both resolve into a `TransactionSpec` with defaults filled in.

use super::chain_id::parse_chain_id;
use crate::error::{SignerError, SignerResult};
use crate::types::Address;
use crate::utils::{decode_hex, get_json_bytes, get_json_u128, get_json_u64};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_GAS_LIMIT: u64 = 300_000;
/// 1 gwei
pub const DEFAULT_GAS_PRICE: u128 = 1_000_000_000;
pub const DEFAULT_NONCE: u64 = 0;
pub const DEFAULT_VALUE: u128 = 0;

/// EIP-2718 envelope type of fee-market transactions
pub const FEE_MARKET_TX_TYPE: u8 = 0x02;

/// Fee model of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FeeParams {
    /// Pre-EIP-1559 single gas price, signed with EIP-155 replay protection
    #[serde(rename_all = "camelCase")]
    Legacy {
        #[serde(with = "quantity")]
        gas_price: u128,
    },
    /// EIP-1559 (type 0x02)
    #[serde(rename_all = "camelCase")]
    FeeMarket {
        #[serde(with = "quantity")]
        max_fee_per_gas: u128,
        #[serde(with = "quantity")]
        max_priority_fee_per_gas: u128,
    },
}

impl Default for FeeParams {
    fn default() -> Self {
        FeeParams::Legacy {
            gas_price: DEFAULT_GAS_PRICE,
        }
    }
}

/// A fully resolved transaction, ready to encode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSpec {
    pub chain_id: u64,
    pub nonce: u64,
    pub to: Address,
    #[serde(with = "quantity")]
    pub value: u128,
    pub gas_limit: u64,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
    pub fees: FeeParams,
}

impl TransactionSpec {
    /// A legacy transfer with every default applied
    pub fn new(chain_id: u64, to: Address) -> Self {
        Self {
            chain_id,
            nonce: DEFAULT_NONCE,
            to,
            value: DEFAULT_VALUE,
            gas_limit: DEFAULT_GAS_LIMIT,
            data: Vec::new(),
            fees: FeeParams::default(),
        }
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = nonce;
        self
    }

    pub fn value(mut self, value: u128) -> Self {
        self.value = value;
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn data(mut self, data: Vec<u8>) -> Self {
        self.data = data;
        self
    }

    /// Legacy fees with an explicit gas price
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.fees = FeeParams::Legacy { gas_price };
        self
    }

    /// Switch to EIP-1559 fees
    pub fn fee_market(mut self, max_fee_per_gas: u128, max_priority_fee_per_gas: u128) -> Self {
        self.fees = FeeParams::FeeMarket {
            max_fee_per_gas,
            max_priority_fee_per_gas,
        };
        self
    }

    pub fn is_fee_market(&self) -> bool {
        matches!(self.fees, FeeParams::FeeMarket { .. })
    }
}

/// Optional fields of a structured transaction descriptor.
///
/// Quantities are hex strings (`0x` optional) or JSON integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    pub nonce: Option<u64>,
    pub value: Option<u128>,
    pub gas_limit: Option<u64>,
    pub gas_price: Option<u128>,
    pub max_fee_per_gas: Option<u128>,
    pub max_priority_fee_per_gas: Option<u128>,
    pub data: Option<Vec<u8>>,
}

impl TransactionFields {
    /// Read the descriptor keys the operation service sends
    pub fn from_json(value: &Value) -> SignerResult<Self> {
        if !value.is_object() {
            return Err(SignerError::invalid_field(
                "transaction",
                format!("expected a JSON object, got {}", value),
            ));
        }

        Ok(Self {
            nonce: get_json_u64(value, "nonce")?,
            value: get_json_u128(value, "value")?,
            gas_limit: get_json_u64(value, "gasLimit")?,
            gas_price: get_json_u128(value, "gasPrice")?,
            max_fee_per_gas: get_json_u128(value, "maxFeePerGas")?,
            max_priority_fee_per_gas: get_json_u128(value, "maxPriorityFeePerGas")?,
            data: get_json_bytes(value, "data")?,
        })
    }

    /// Fill in defaults. A present `maxFeePerGas` selects EIP-1559.
    pub fn resolve(&self, chain_id: u64, to: Address) -> TransactionSpec {
        let fees = match self.max_fee_per_gas {
            Some(max_fee_per_gas) => FeeParams::FeeMarket {
                max_fee_per_gas,
                max_priority_fee_per_gas: self.max_priority_fee_per_gas.unwrap_or(0),
            },
            None => FeeParams::Legacy {
                gas_price: self.gas_price.unwrap_or(DEFAULT_GAS_PRICE),
            },
        };

        TransactionSpec {
            chain_id,
            nonce: self.nonce.unwrap_or(DEFAULT_NONCE),
            to,
            value: self.value.unwrap_or(DEFAULT_VALUE),
            // Zero means "not set" upstream
            gas_limit: self.gas_limit.filter(|g| *g > 0).unwrap_or(DEFAULT_GAS_LIMIT),
            data: self.data.clone().unwrap_or_default(),
            fees,
        }
    }
}

/// What the caller hands the transaction signer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionInput {
    /// Descriptor with optional fields; defaults fill the gaps
    Structured(TransactionFields),
    /// Bare calldata; every other field takes its default
    RawPayload(Vec<u8>),
}

impl TransactionInput {
    /// Decode a hex calldata payload (`0x` optional, empty allowed)
    pub fn raw_hex(payload: &str) -> SignerResult<Self> {
        decode_hex(payload)
            .map(TransactionInput::RawPayload)
            .map_err(|e| SignerError::invalid_field("data", format!("{}: {}", payload, e)))
    }

    pub fn resolve(&self, chain_id: u64, to: Address) -> TransactionSpec {
        match self {
            TransactionInput::Structured(fields) => fields.resolve(chain_id, to),
            TransactionInput::RawPayload(data) => TransactionSpec::new(chain_id, to).data(data.clone()),
        }
    }
}

/// A signing request as it arrives from outside: external chain id,
/// destination and the classified input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub chain_id: String,
    pub to: String,
    pub input: TransactionInput,
}

impl TransactionRequest {
    pub fn new(chain_id: impl Into<String>, to: impl Into<String>, input: TransactionInput) -> Self {
        Self {
            chain_id: chain_id.into(),
            to: to.into(),
            input,
        }
    }

    /// Parse the chain id and destination, then apply defaults
    pub fn resolve(&self) -> SignerResult<TransactionSpec> {
        let chain_id = parse_chain_id(&self.chain_id)?;
        let to: Address = self.to.parse()?;
        Ok(self.input.resolve(chain_id, to))
    }
}

/// u128 quantities as `0x` hex strings, the JSON-RPC convention
mod quantity {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{:x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::utils::parse_hex_u128(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex quantity {}", s)))
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(bytes)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::utils::decode_hex(&s).map_err(serde::de::Error::custom)
    }
}
