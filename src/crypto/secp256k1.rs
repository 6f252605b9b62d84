//! secp256k1 Backend
//!
//! Deterministic (RFC6979) recoverable ECDSA via libsecp256k1.

use super::{CurveError, SignatureScheme};
use ::secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use ::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};

/// Production secp256k1 scheme
#[derive(Clone)]
pub struct Secp256k1Scheme {
    secp: Secp256k1<All>,
}

impl Secp256k1Scheme {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }
}

impl Default for Secp256k1Scheme {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Secp256k1Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secp256k1Scheme")
    }
}

fn strip_tag(uncompressed: [u8; 65]) -> [u8; 64] {
    let mut out = [0u8; 64];
    out.copy_from_slice(&uncompressed[1..]);
    out
}

impl SignatureScheme for Secp256k1Scheme {
    fn name(&self) -> &'static str {
        "secp256k1"
    }

    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 64], CurveError> {
        let sk = SecretKey::from_slice(secret)
            .map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))?;
        let pk = PublicKey::from_secret_key(&self.secp, &sk);
        Ok(strip_tag(pk.serialize_uncompressed()))
    }

    fn sign_recoverable(
        &self,
        secret: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CurveError> {
        let sk = SecretKey::from_slice(secret)
            .map_err(|e| CurveError::InvalidPrivateKey(e.to_string()))?;

        let msg = Message::from_digest(*digest);
        let sig = self.secp.sign_ecdsa_recoverable(&msg, &sk);
        let (recovery_id, compact) = sig.serialize_compact();

        let recovery_id = u8::try_from(recovery_id.to_i32())
            .map_err(|e| CurveError::SigningFailed(e.to_string()))?;

        Ok((compact, recovery_id))
    }

    fn recover_public_key(
        &self,
        digest: &[u8; 32],
        signature: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 64], CurveError> {
        let rec_id = RecoveryId::from_i32(i32::from(recovery_id))
            .map_err(|_| CurveError::InvalidRecoveryId(recovery_id))?;

        let sig = RecoverableSignature::from_compact(signature, rec_id)
            .map_err(|e| CurveError::InvalidSignature(e.to_string()))?;

        let msg = Message::from_digest(*digest);
        let pk = self
            .secp
            .recover_ecdsa(&msg, &sig)
            .map_err(|e| CurveError::RecoveryFailed(e.to_string()))?;

        Ok(strip_tag(pk.serialize_uncompressed()))
    }
}
