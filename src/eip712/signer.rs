//! EIP-712 Signing
//!
//! Hash, sign, then prove the signature recovers to our own address before
//! handing it out.

use super::hasher::pre_image;
use super::types::TypedMessage;
use crate::crypto::{Secp256k1Scheme, SignatureScheme};
use crate::error::SignerResult;
use crate::keys::KeyHolder;
use crate::types::{Address, Signature};
use crate::verify::SignatureVerifier;
use crate::{log_debug, log_info};

/// A verified typed-data signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTypedData {
    /// The EIP-712 digest that was signed
    pub digest: [u8; 32],
    /// Signature with the raw recovery id
    pub signature: Signature,
    pub signer: Address,
}

impl SignedTypedData {
    /// r || s || v with `v` in the 27/28 range
    pub fn to_bytes(&self) -> [u8; 65] {
        self.signature.to_eth_bytes()
    }

    /// Publishable `0x` hex signature (65 bytes)
    pub fn to_hex(&self) -> String {
        self.signature.to_eth_hex()
    }

    pub fn digest_hex(&self) -> String {
        format!("0x{}", hex::encode(self.digest))
    }
}

/// Signs typed messages with one key holder
pub struct StructuredDataSigner<'a, S: SignatureScheme = Secp256k1Scheme> {
    key: &'a KeyHolder<S>,
    verifier: SignatureVerifier<S>,
}

impl<'a, S: SignatureScheme> StructuredDataSigner<'a, S> {
    /// Verify with the key holder's own scheme
    pub fn new(key: &'a KeyHolder<S>) -> Self {
        Self {
            key,
            verifier: SignatureVerifier::new(key.scheme().clone()),
        }
    }

    pub fn with_verifier(key: &'a KeyHolder<S>, verifier: SignatureVerifier<S>) -> Self {
        Self { key, verifier }
    }

    /// Sign `message` and confirm the signature recovers to the key's address
    pub fn sign(&self, message: &TypedMessage) -> SignerResult<SignedTypedData> {
        let pre = pre_image(message)?;

        log_debug!(
            "eip712",
            "typed data hashed",
            scheme = self.key.scheme().name(),
            primary_type = message.primary_type,
            domain_hash = hex::encode(pre.domain_separator),
            digest = hex::encode(pre.digest),
        );

        let signature = self.key.sign_digest(&pre.digest)?;
        let signer = self.key.derive_address();

        self.verifier.ensure(&pre.digest, &signature, &signer)?;

        log_info!(
            "eip712",
            "typed data signature verified",
            signer = signer,
            primary_type = message.primary_type,
        );

        Ok(SignedTypedData {
            digest: pre.digest,
            signature,
            signer,
        })
    }
}
