//! Signature Scheme Trait
//!
//! Defines the curve interface the key holder and verifier are written against.

use super::CurveError;

/// Recoverable ECDSA over 32-byte digests.
///
/// Public keys are the uncompressed point without its `0x04` tag (x || y).
/// Implementations are immutable once built and may be shared across threads.
pub trait SignatureScheme: Clone + Send + Sync {
    /// Short backend name for logs
    fn name(&self) -> &'static str;

    /// Derive the public key for a secret scalar
    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 64], CurveError>;

    /// Sign a digest, returning `r || s` and the raw recovery id
    fn sign_recoverable(
        &self,
        secret: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CurveError>;

    /// Recover the public key that produced `signature` over `digest`
    fn recover_public_key(
        &self,
        digest: &[u8; 32],
        signature: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 64], CurveError>;
}
