//! Transaction Module
//!
//! EVM transaction signing: legacy EIP-155 and EIP-1559 fee-market
//! transactions, RLP encoded, with a recover-from-bytes self-check.

pub mod chain_id;
pub mod rlp;

mod decode;
mod encoding;
mod signer;
mod types;

pub use chain_id::{parse_chain_id, to_external_chain_id};
pub use decode::*;
pub use encoding::*;
pub use signer::*;
pub use types::*;
