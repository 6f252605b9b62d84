//! Transaction Signer
//!
//! Resolves a request into a transaction, signs its EIP-155 or EIP-1559
//! payload and proves the serialized result recovers to the key's address
//! before returning it.

use super::decode::decode_signed_transaction;
use super::encoding::{encode_signed, signing_hash};
use super::types::{TransactionRequest, TransactionSpec};
use crate::crypto::{Secp256k1Scheme, SignatureScheme};
use crate::error::{SignerError, SignerResult};
use crate::keys::KeyHolder;
use crate::types::{Address, Signature};
use crate::utils::keccak256;
use crate::verify::SignatureVerifier;
use crate::{log_debug, log_info, log_warn};

/// A signed, self-checked transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    pub spec: TransactionSpec,
    /// Signature with the raw recovery id
    pub signature: Signature,
    /// Broadcast-ready serialization
    pub raw: Vec<u8>,
    /// keccak256 of `raw`, the transaction hash
    pub hash: [u8; 32],
    pub sender: Address,
}

impl SignedTransaction {
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.raw))
    }

    pub fn hash_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

/// Signs transactions with one key holder
pub struct TransactionSigner<'a, S: SignatureScheme = Secp256k1Scheme> {
    key: &'a KeyHolder<S>,
    verifier: SignatureVerifier<S>,
}

impl<'a, S: SignatureScheme> TransactionSigner<'a, S> {
    pub fn new(key: &'a KeyHolder<S>) -> Self {
        Self {
            key,
            verifier: SignatureVerifier::new(key.scheme().clone()),
        }
    }

    pub fn with_verifier(key: &'a KeyHolder<S>, verifier: SignatureVerifier<S>) -> Self {
        Self { key, verifier }
    }

    /// Parse the external chain id and destination, apply defaults, then sign
    pub fn sign_request(&self, request: &TransactionRequest) -> SignerResult<SignedTransaction> {
        let spec = request.resolve()?;
        self.sign(&spec)
    }

    pub fn sign(&self, spec: &TransactionSpec) -> SignerResult<SignedTransaction> {
        if spec.chain_id == 0 {
            return Err(SignerError::InvalidChainId("0".into()));
        }

        let digest = signing_hash(spec);
        log_debug!(
            "tx",
            "transaction payload hashed",
            scheme = self.key.scheme().name(),
            chain_id = spec.chain_id,
            nonce = spec.nonce,
            fee_market = spec.is_fee_market(),
            digest = hex::encode(digest),
        );

        let signature = self.key.sign_digest(&digest)?;
        let raw = encode_signed(spec, &signature)?;
        let sender = self.key.derive_address();

        self.check_serialized(spec, &raw, &sender)?;

        let hash = keccak256(&raw);
        log_info!(
            "tx",
            "transaction signature verified",
            chain_id = spec.chain_id,
            sender = sender,
            hash = hex::encode(hash),
        );

        Ok(SignedTransaction {
            spec: spec.clone(),
            signature,
            raw,
            hash,
            sender,
        })
    }

    /// Decode the bytes about to be returned and recover their sender
    fn check_serialized(
        &self,
        spec: &TransactionSpec,
        raw: &[u8],
        expected: &Address,
    ) -> SignerResult<()> {
        let (decoded, signature) = decode_signed_transaction(raw)?;

        if decoded.chain_id != spec.chain_id {
            log_warn!(
                "tx",
                "serialized chain id differs",
                expected = spec.chain_id,
                decoded = decoded.chain_id,
            );
            return Err(SignerError::RecoveryFailed(format!(
                "serialized transaction carries chain {} instead of {}",
                decoded.chain_id, spec.chain_id
            )));
        }

        self.verifier
            .ensure(&signing_hash(&decoded), &signature, expected)
    }
}
