//! Key Holder
//!
//! Owns the one signing key of a session. The secret scalar is zeroized on drop
//! and never leaves this module: callers only get the derived address and
//! signatures over 32-byte digests.

use crate::crypto::{Secp256k1Scheme, SignatureScheme};
use crate::error::{SignerError, SignerResult};
use crate::types::{Address, Signature};
use crate::utils::decode_hex;
use std::fmt;
use zeroize::Zeroizing;

pub struct KeyHolder<S: SignatureScheme = Secp256k1Scheme> {
    secret: Zeroizing<[u8; 32]>,
    public_key: [u8; 64],
    address: Address,
    scheme: S,
}

impl KeyHolder<Secp256k1Scheme> {
    /// Load a hex private key (`0x` optional)
    pub fn from_hex(private_key_hex: &str) -> SignerResult<Self> {
        Self::from_hex_with_scheme(private_key_hex, Secp256k1Scheme::new())
    }

    pub fn from_bytes(bytes: &[u8]) -> SignerResult<Self> {
        Self::with_scheme(bytes, Secp256k1Scheme::new())
    }
}

impl<S: SignatureScheme> KeyHolder<S> {
    pub fn from_hex_with_scheme(private_key_hex: &str, scheme: S) -> SignerResult<Self> {
        let trimmed = private_key_hex.trim();
        if trimmed.is_empty() {
            return Err(SignerError::InvalidKey("no key material supplied".into()));
        }

        let bytes = Zeroizing::new(
            decode_hex(trimmed).map_err(|e| SignerError::InvalidKey(format!("not hex: {}", e)))?,
        );
        Self::with_scheme(&bytes, scheme)
    }

    /// Build a key holder on an explicit backend
    pub fn with_scheme(bytes: &[u8], scheme: S) -> SignerResult<Self> {
        if bytes.is_empty() {
            return Err(SignerError::InvalidKey("no key material supplied".into()));
        }
        if bytes.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }

        let mut secret = Zeroizing::new([0u8; 32]);
        secret.copy_from_slice(bytes);

        let public_key = scheme.public_key(&secret)?;
        let address = Address::from_public_key(&public_key);

        Ok(Self {
            secret,
            public_key,
            address,
            scheme,
        })
    }

    /// The account address controlled by this key
    pub fn derive_address(&self) -> Address {
        self.address
    }

    /// Uncompressed public key (x || y)
    pub fn public_key(&self) -> &[u8; 64] {
        &self.public_key
    }

    pub fn scheme(&self) -> &S {
        &self.scheme
    }

    /// Sign a 32-byte digest.
    ///
    /// The returned signature carries the raw recovery id. Callers apply the
    /// `v` convention of their target encoding.
    pub fn sign_digest(&self, digest: &[u8]) -> SignerResult<Signature> {
        let digest: &[u8; 32] = digest
            .try_into()
            .map_err(|_| SignerError::InvalidDigestLength(digest.len()))?;

        let (compact, recovery_id) = self.scheme.sign_recoverable(&self.secret, digest)?;

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);

        Ok(Signature::new(r, s, recovery_id))
    }
}

impl<S: SignatureScheme> fmt::Debug for KeyHolder<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyHolder")
            .field("address", &self.address)
            .field("scheme", &self.scheme.name())
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
