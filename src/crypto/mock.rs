//! Deterministic mock backend
//!
//! Not a real signature scheme. The "public key" is a keccak chain of the
//! secret and a signature is the public key masked with the digest, so
//! recovery simply unmasks it. `with_corrupted_recovery` makes recovery hand
//! back a different key, which lets tests drive the mismatch path.

use super::{CurveError, SignatureScheme};
use crate::utils::keccak256;

#[derive(Debug, Clone, Default)]
pub struct MockScheme {
    corrupt_recovery: bool,
}

impl MockScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recovery returns a key that differs from the signer's
    pub fn with_corrupted_recovery() -> Self {
        Self {
            corrupt_recovery: true,
        }
    }
}

fn xor32(a: &[u8], b: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = a[i] ^ b[i];
    }
    out
}

impl SignatureScheme for MockScheme {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn public_key(&self, secret: &[u8; 32]) -> Result<[u8; 64], CurveError> {
        if secret.iter().all(|b| *b == 0) {
            return Err(CurveError::InvalidPrivateKey("zero scalar".into()));
        }

        let x = keccak256(secret);
        let y = keccak256(&x);

        let mut pk = [0u8; 64];
        pk[..32].copy_from_slice(&x);
        pk[32..].copy_from_slice(&y);
        Ok(pk)
    }

    fn sign_recoverable(
        &self,
        secret: &[u8; 32],
        digest: &[u8; 32],
    ) -> Result<([u8; 64], u8), CurveError> {
        let pk = self.public_key(secret)?;

        let mut sig = [0u8; 64];
        sig[..32].copy_from_slice(&xor32(&pk[..32], digest));
        sig[32..].copy_from_slice(&xor32(&pk[32..], digest));
        Ok((sig, 0))
    }

    fn recover_public_key(
        &self,
        digest: &[u8; 32],
        signature: &[u8; 64],
        recovery_id: u8,
    ) -> Result<[u8; 64], CurveError> {
        if recovery_id > 1 {
            return Err(CurveError::InvalidRecoveryId(recovery_id));
        }

        let mut pk = [0u8; 64];
        pk[..32].copy_from_slice(&xor32(&signature[..32], digest));
        pk[32..].copy_from_slice(&xor32(&signature[32..], digest));

        if self.corrupt_recovery {
            pk[0] ^= 0xff;
        }
        Ok(pk)
    }
}
