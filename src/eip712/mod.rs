//! EIP-712 Typed Data Signing
//!
//! Implementation of EIP-712 typed structured data hashing and signing.
//!
//! # Reference
//! - <https://eips.ethereum.org/EIPS/eip-712>
//!
//! # Example
//! ```rust,ignore
//! use evm_signer::eip712::{StructuredDataSigner, TypedMessage};
//! use evm_signer::keys::KeyHolder;
//!
//! let key = KeyHolder::from_hex(&private_key_hex)?;
//! let message = TypedMessage::from_json(json_string)?;
//! let signed = StructuredDataSigner::new(&key).sign(&message)?;
//! println!("{}", signed.to_hex());
//! ```

pub mod types;
pub mod encoder;
pub mod hasher;
pub mod signer;

pub use types::*;
pub use encoder::*;
pub use hasher::*;
pub use signer::*;

#[cfg(test)]
mod tests;
