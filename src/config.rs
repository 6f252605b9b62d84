//! Signer Configuration
//!
//! The signer needs two settings:
//! - `PRIVATE_KEY`: hex secp256k1 key, `0x` optional
//! - `VERBOSE`: `1` or `true` turns on debug logging

use crate::error::{SignerError, SignerResult};
use crate::keys::KeyHolder;
use secrecy::{ExposeSecret, SecretString};

pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";
pub const VERBOSE_ENV: &str = "VERBOSE";

#[derive(Debug)]
pub struct SignerConfig {
    /// Hex key without the `0x` prefix
    private_key: SecretString,
    pub verbose: bool,
}

impl SignerConfig {
    pub fn new(private_key: &str, verbose: bool) -> SignerResult<Self> {
        let trimmed = private_key.trim();
        let body = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if body.is_empty() {
            return Err(SignerError::InvalidKey(format!("{} is not set", PRIVATE_KEY_ENV)));
        }

        Ok(Self {
            private_key: SecretString::from(body.to_string()),
            verbose,
        })
    }

    /// Read the process environment
    pub fn from_env() -> SignerResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read settings through `lookup`, e.g. a map in tests
    pub fn from_lookup<F>(lookup: F) -> SignerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let private_key = lookup(PRIVATE_KEY_ENV)
            .ok_or_else(|| SignerError::InvalidKey(format!("{} is not set", PRIVATE_KEY_ENV)))?;
        let verbose = lookup(VERBOSE_ENV).map(|v| parse_flag(&v)).unwrap_or(false);

        Self::new(&private_key, verbose)
    }

    /// Build the session's key holder
    pub fn key_holder(&self) -> SignerResult<KeyHolder> {
        KeyHolder::from_hex(self.private_key.expose_secret())
    }
}

pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_vars() {
        let config = SignerConfig::from_lookup(lookup(&[
            (PRIVATE_KEY_ENV, TEST_KEY),
            (VERBOSE_ENV, "true"),
        ]))
        .unwrap();

        assert!(config.verbose);
        assert_eq!(
            config.key_holder().unwrap().derive_address().to_string(),
            "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23"
        );
    }

    #[test]
    fn test_missing_key_is_invalid_key() {
        assert!(matches!(
            SignerConfig::from_lookup(lookup(&[])),
            Err(SignerError::InvalidKey(_))
        ));
        assert!(matches!(
            SignerConfig::from_lookup(lookup(&[(PRIVATE_KEY_ENV, "0x")])),
            Err(SignerError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_bad_key_fails_at_key_holder() {
        let config = SignerConfig::new("abcd", false).unwrap();
        assert!(matches!(config.key_holder(), Err(SignerError::InvalidKey(_))));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = SignerConfig::new(TEST_KEY, false).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("4c0883a6"));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
