//! Operation Signing
//!
//! The orchestration service hands out operations tagged with a format.
//! `TYPED_DATA` operations carry an EIP-712 message, `TRANSACTION` operations
//! carry either a JSON transaction descriptor or a hex calldata payload. This
//! is the only place where that payload gets classified.

use crate::crypto::{Secp256k1Scheme, SignatureScheme};
use crate::eip712::{StructuredDataSigner, TypedMessage};
use crate::error::{ErrorCode, SignerError, SignerResult};
use crate::keys::KeyHolder;
use crate::tx::{TransactionFields, TransactionInput, TransactionRequest, TransactionSigner};
use crate::types::{Address, SignedArtifact};
use crate::{log_error, log_info, log_warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operation formats the signer understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationFormat {
    TypedData,
    Transaction,
    Unknown,
}

impl OperationFormat {
    pub fn parse(format: &str) -> Self {
        match format {
            "TYPED_DATA" => Self::TypedData,
            "TRANSACTION" => Self::Transaction,
            _ => Self::Unknown,
        }
    }
}

/// One operation as sent by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(rename = "type", default)]
    pub op_type: String,
    pub format: String,
    /// A JSON string or an inline JSON value
    pub data: Value,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
}

impl Operation {
    pub fn format(&self) -> OperationFormat {
        OperationFormat::parse(&self.format)
    }
}

/// What gets sent back to the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedOperation {
    #[serde(rename = "type")]
    pub op_type: String,
    /// `0x` hex: a 65-byte signature or a signed raw transaction
    pub signature: String,
    pub data: Value,
    pub chain_id: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationFailure {
    pub index: usize,
    #[serde(rename = "type")]
    pub op_type: String,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperationBatch {
    pub signed: Vec<SignedOperation>,
    pub failures: Vec<OperationFailure>,
}

/// Signs service operations with one key holder
pub struct OperationSigner<'a, S: SignatureScheme = Secp256k1Scheme> {
    key: &'a KeyHolder<S>,
}

impl<'a, S: SignatureScheme> OperationSigner<'a, S> {
    pub fn new(key: &'a KeyHolder<S>) -> Self {
        Self { key }
    }

    /// Sign one operation according to its format
    pub fn sign_artifact(&self, operation: &Operation) -> SignerResult<SignedArtifact> {
        self.check_from(operation);

        match operation.format() {
            OperationFormat::TypedData => {
                let message = typed_message(&operation.data)?;
                let signed = StructuredDataSigner::new(self.key).sign(&message)?;
                Ok(SignedArtifact::TypedData(signed))
            }
            OperationFormat::Transaction => {
                let request = TransactionRequest::new(
                    operation.chain_id.as_str(),
                    operation.to.as_str(),
                    classify_transaction(&operation.data)?,
                );
                let signed = TransactionSigner::new(self.key).sign_request(&request)?;
                Ok(SignedArtifact::Transaction(signed))
            }
            OperationFormat::Unknown => {
                Err(SignerError::UnsupportedOperationFormat(operation.format.clone()))
            }
        }
    }

    pub fn sign(&self, operation: &Operation) -> SignerResult<SignedOperation> {
        let artifact = self.sign_artifact(operation)?;
        Ok(SignedOperation {
            op_type: operation.op_type.clone(),
            signature: artifact.to_hex(),
            data: operation.data.clone(),
            chain_id: operation.chain_id.clone(),
            from: operation.from.clone(),
        })
    }

    /// Sign every operation. A failed item is recorded and skipped.
    pub fn sign_all(&self, operations: &[Operation]) -> OperationBatch {
        let mut batch = OperationBatch::default();

        for (index, operation) in operations.iter().enumerate() {
            match self.sign(operation) {
                Ok(signed) => batch.signed.push(signed),
                Err(e) => {
                    log_error!(
                        "operation",
                        "operation not signed",
                        index = index,
                        format = operation.format,
                        error = e,
                    );
                    batch.failures.push(OperationFailure {
                        index,
                        op_type: operation.op_type.clone(),
                        code: e.code(),
                        message: e.to_string(),
                    });
                }
            }
        }

        log_info!(
            "operation",
            "batch signed",
            signed = batch.signed.len(),
            failed = batch.failures.len(),
        );
        batch
    }

    fn check_from(&self, operation: &Operation) {
        if operation.from.is_empty() {
            return;
        }
        let ours = self.key.derive_address();
        match operation.from.parse::<Address>() {
            Ok(from) if from == ours => {}
            _ => log_warn!(
                "operation",
                "operation sender is not this key",
                from = operation.from,
                signer = ours,
            ),
        }
    }
}

fn typed_message(data: &Value) -> SignerResult<TypedMessage> {
    match data {
        Value::String(s) => TypedMessage::from_json(s),
        other => TypedMessage::from_value(other.clone()),
    }
}

/// A JSON object is a descriptor; anything else is hex calldata
pub fn classify_transaction(data: &Value) -> SignerResult<TransactionInput> {
    match data {
        Value::Object(_) => Ok(TransactionInput::Structured(TransactionFields::from_json(data)?)),
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(parsed @ Value::Object(_)) => {
                Ok(TransactionInput::Structured(TransactionFields::from_json(&parsed)?))
            }
            _ => TransactionInput::raw_hex(s),
        },
        Value::Null => Ok(TransactionInput::RawPayload(Vec::new())),
        other => Err(SignerError::invalid_field("data", other.to_string())),
    }
}

#[cfg(test)]
mod tests;
