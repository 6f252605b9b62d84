//! Signature Verifier
//!
//! Recovers the signing address from a digest and signature and compares it to
//! the address the caller expects. "Could not check" (`RecoveryFailed`) and
//! "checked and it is someone else" (`Ok(false)` or
//! `SignatureVerificationFailed`) are kept apart.

use crate::crypto::{Secp256k1Scheme, SignatureScheme};
use crate::error::{SignerError, SignerResult};
use crate::types::{Address, Signature};

/// Highest recovery id a secp256k1 signature can carry
pub const MAX_RECOVERY_ID: u8 = 3;

#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier<S: SignatureScheme = Secp256k1Scheme> {
    scheme: S,
}

impl<S: SignatureScheme> SignatureVerifier<S> {
    pub fn new(scheme: S) -> Self {
        Self { scheme }
    }

    /// Recover the address that signed `digest`
    pub fn recover_address(&self, digest: &[u8; 32], signature: &Signature) -> SignerResult<Address> {
        if signature.recovery_id > MAX_RECOVERY_ID {
            return Err(SignerError::RecoveryFailed(format!(
                "recovery id {} out of range",
                signature.recovery_id
            )));
        }

        let public_key =
            self.scheme
                .recover_public_key(digest, &signature.compact(), signature.recovery_id)?;
        Ok(Address::from_public_key(&public_key))
    }

    /// `Ok(true)` if `signature` over `digest` recovers to `expected`
    pub fn confirm(
        &self,
        digest: &[u8; 32],
        signature: &Signature,
        expected: &Address,
    ) -> SignerResult<bool> {
        let recovered = self.recover_address(digest, signature)?;
        Ok(recovered == *expected)
    }

    /// Like [`confirm`](Self::confirm), but a mismatch is an error
    pub fn ensure(
        &self,
        digest: &[u8; 32],
        signature: &Signature,
        expected: &Address,
    ) -> SignerResult<()> {
        let recovered = self.recover_address(digest, signature)?;
        if recovered != *expected {
            return Err(SignerError::SignatureVerificationFailed {
                expected: *expected,
                recovered,
            });
        }
        Ok(())
    }
}
