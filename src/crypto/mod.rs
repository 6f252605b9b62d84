//! Elliptic-curve backends for recoverable ECDSA
//!
//! Signing and recovery go through the [`SignatureScheme`] trait:
//! - `secp256k1`: production backend (libsecp256k1, RFC6979 nonces)
//! - `mock`: deterministic stand-in for tests
//!
//! Hashing is not part of the seam. Every backend signs the same keccak256
//! digests, so encodings and test vectors do not depend on the scheme.

pub mod mock;
pub mod secp256k1;
pub mod traits;

pub use self::mock::MockScheme;
pub use self::secp256k1::Secp256k1Scheme;
pub use self::traits::SignatureScheme;

use crate::error::SignerError;

// MARK: - Curve Errors

/// Errors that can occur during curve operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("public key recovery failed: {0}")]
    RecoveryFailed(String),
}

impl From<CurveError> for SignerError {
    fn from(e: CurveError) -> Self {
        match e {
            CurveError::InvalidPrivateKey(_) => SignerError::InvalidKey(e.to_string()),
            CurveError::SigningFailed(_) => SignerError::SigningFailed(e.to_string()),
            CurveError::InvalidSignature(_)
            | CurveError::InvalidRecoveryId(_)
            | CurveError::RecoveryFailed(_) => SignerError::RecoveryFailed(e.to_string()),
        }
    }
}
