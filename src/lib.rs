//! EVM Signer Core Library
//!
//! Sign-and-verify for EVM accounts: one key holder signs EIP-712 typed data
//! and EIP-155 / EIP-1559 transactions, and every signature is recovered and
//! checked against the key's own address before it is handed out.
//!
//! # Architecture
//!
//! This crate provides:
//! - **keys**: the key holder (address derivation, digest signing)
//! - **eip712**: typed structured data hashing and signing
//! - **tx**: transaction encoding, signing and decoding
//! - **verify**: signature recovery and comparison
//! - **operation**: signing of orchestration-service operations
//! - **crypto**: the elliptic-curve backends behind `SignatureScheme`
//!
//! # Security
//!
//! The secret scalar lives in a `zeroize` buffer inside [`KeyHolder`] and is
//! never logged or returned. Log fields named like keys are redacted.
//!
//! # Example
//!
//! ```rust,ignore
//! use evm_signer::{KeyHolder, TransactionSigner, TransactionSpec};
//!
//! let key = KeyHolder::from_hex(&private_key_hex)?;
//! let spec = TransactionSpec::new(1, "0x0000000000000000000000000000000000000001".parse()?);
//! let signed = TransactionSigner::new(&key).sign(&spec)?;
//! println!("{}", signed.to_hex());
//! ```

pub mod config;
pub mod crypto;
pub mod eip712;
pub mod error;
pub mod keys;
pub mod operation;
pub mod tx;
pub mod types;
pub mod utils;
pub mod verify;

pub use config::SignerConfig;
pub use crypto::{MockScheme, Secp256k1Scheme, SignatureScheme};
pub use eip712::{SignedTypedData, StructuredDataSigner, TypedMessage};
pub use error::{ErrorCode, ErrorReport, SignerError, SignerResult};
pub use keys::KeyHolder;
pub use operation::{Operation, OperationBatch, OperationSigner, SignedOperation};
pub use tx::{
    SignedTransaction, TransactionInput, TransactionRequest, TransactionSigner, TransactionSpec,
};
pub use types::{Address, Signature, SignedArtifact};
pub use utils::{keccak256, to_checksum_address};
pub use verify::SignatureVerifier;
