//! Unified error types for the signing core
//!
//! Every failure in the sign-and-verify pipelines flows through
//! [`SignerError`]. Each variant maps onto a stable [`ErrorCode`] so outer
//! layers (CLI, orchestration) can report the kind without string matching.

use crate::types::Address;
use serde::{Deserialize, Serialize};

/// Main error type for all signing operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignerError {
    /// A required typed-data part is missing or a value does not fit its type
    #[error("malformed typed message: {field}: {reason}")]
    MalformedTypedMessage { field: String, reason: String },

    #[error("invalid chain id: {0}")]
    InvalidChainId(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("invalid digest length: expected 32 bytes, got {0}")]
    InvalidDigestLength(usize),

    /// The signature could not be checked at all (bad recovery id, bad scalar, no point)
    #[error("signature recovery failed: {0}")]
    RecoveryFailed(String),

    /// The signature was checked and belongs to someone else
    #[error("signature verification failed: recovered {recovered} does not match expected {expected}")]
    SignatureVerificationFailed { expected: Address, recovered: Address },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid transaction field {field}: {value}")]
    InvalidTransactionField { field: String, value: String },

    #[error("malformed transaction encoding: {0}")]
    MalformedTransaction(String),

    #[error("signing failed: {0}")]
    SigningFailed(String),

    #[error("unsupported operation format: {0}")]
    UnsupportedOperationFormat(String),
}

impl SignerError {
    pub fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedTypedMessage {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_field(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidTransactionField {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Stable category for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MalformedTypedMessage { .. } => ErrorCode::MalformedTypedMessage,
            Self::InvalidChainId(_) => ErrorCode::InvalidChainId,
            Self::InvalidKey(_) => ErrorCode::InvalidKey,
            Self::InvalidDigestLength(_) => ErrorCode::InvalidDigestLength,
            Self::RecoveryFailed(_) => ErrorCode::RecoveryFailed,
            Self::SignatureVerificationFailed { .. } => ErrorCode::SignatureVerificationFailed,
            Self::InvalidAddress(_) => ErrorCode::InvalidAddress,
            Self::InvalidTransactionField { .. } => ErrorCode::InvalidTransactionField,
            Self::MalformedTransaction(_) => ErrorCode::MalformedTransaction,
            Self::SigningFailed(_) => ErrorCode::SigningFailed,
            Self::UnsupportedOperationFormat(_) => ErrorCode::UnsupportedOperationFormat,
        }
    }

    /// Serializable form for outer surfaces
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            code: self.code(),
            message: self.to_string(),
        }
    }
}

/// Error codes for categorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    // Input errors
    MalformedTypedMessage,
    InvalidChainId,
    InvalidAddress,
    InvalidTransactionField,
    MalformedTransaction,
    UnsupportedOperationFormat,

    // Key holder misuse
    InvalidKey,
    InvalidDigestLength,

    // Crypto errors
    SigningFailed,
    RecoveryFailed,
    SignatureVerificationFailed,
}

/// Error as surfaced to the CLI and other callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub code: ErrorCode,
    pub message: String,
}

/// Result type alias for signing operations
pub type SignerResult<T> = Result<T, SignerError>;

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::malformed("json", e.to_string())
    }
}
