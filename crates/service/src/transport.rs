//! Wire shapes for an inter-process transport collaborator.
//!
//! Keyward itself is process-local; a transport collaborator (a socket
//! server, an FFI shim) carries requests in and results out. This module
//! fixes the JSON wire contract so every collaborator agrees on it:
//! binary payloads travel hex-encoded, operation kinds by their snake_case
//! names, and failures as the stable `(code, message)` pair.
//!
//! Decoding is strict. A payload that names both a stored key and embedded
//! key bytes, or carries malformed hex, is rejected with
//! `SerializationFailed` before it reaches the orchestrator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use keyward_core::{
    mapping, KeyRef, OperationKind, OperationRequest, OperationResult, SecureBuffer,
    TransportError, TransportResult,
};

/// A security operation request as it crosses the process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireRequest {
    /// Operation to perform, by its snake_case name
    pub operation: OperationKind,
    /// Hex-encoded primary input payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_hex: Option<String>,
    /// Stored-key identifier; mutually exclusive with `key_hex`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_id: Option<String>,
    /// Hex-encoded embedded key bytes; mutually exclusive with `key_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_hex: Option<String>,
    /// Hex-encoded MAC or signature for verification operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_hex: Option<String>,
    /// Hex-encoded caller-supplied IV; carried so the orchestrator can
    /// reject it explicitly rather than a lenient decoder dropping it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iv_hex: Option<String>,
    /// Hex-encoded additional authenticated data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aad_hex: Option<String>,
    /// Requested key size in bits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_size_bits: Option<u32>,
    /// Free-form operation options
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub options: HashMap<String, String>,
}

impl WireRequest {
    /// Start a wire request for the given operation.
    pub fn new(operation: OperationKind) -> Self {
        Self {
            operation,
            input_hex: None,
            key_id: None,
            key_hex: None,
            verification_hex: None,
            iv_hex: None,
            aad_hex: None,
            key_size_bits: None,
            options: HashMap::new(),
        }
    }

    /// Encode an in-process request into its wire shape.
    pub fn from_request(request: &OperationRequest) -> Self {
        let (key_id, key_hex) = match &request.key {
            Some(KeyRef::Stored(id)) => (Some(id.clone()), None),
            Some(KeyRef::Embedded(bytes)) => (None, Some(hex::encode(bytes.as_bytes()))),
            None => (None, None),
        };
        Self {
            operation: request.kind,
            input_hex: request.input.as_ref().map(encode_hex),
            key_id,
            key_hex,
            verification_hex: request.verification.as_ref().map(encode_hex),
            iv_hex: request.iv.as_ref().map(encode_hex),
            aad_hex: request.aad.as_ref().map(encode_hex),
            key_size_bits: request.key_size_bits,
            options: request.options.clone(),
        }
    }

    /// Decode the wire shape into an in-process request.
    pub fn into_request(self) -> TransportResult<OperationRequest> {
        let key = match (self.key_id, self.key_hex) {
            (Some(_), Some(_)) => {
                return Err(TransportError::SerializationFailed(
                    "request names both a stored key and embedded key bytes".to_string(),
                ));
            }
            (Some(id), None) => Some(KeyRef::Stored(id)),
            (None, Some(hex)) => Some(KeyRef::Embedded(decode_hex("key_hex", &hex)?)),
            (None, None) => None,
        };

        Ok(OperationRequest {
            kind: self.operation,
            input: decode_opt_hex("input_hex", self.input_hex)?,
            key,
            verification: decode_opt_hex("verification_hex", self.verification_hex)?,
            iv: decode_opt_hex("iv_hex", self.iv_hex)?,
            aad: decode_opt_hex("aad_hex", self.aad_hex)?,
            key_size_bits: self.key_size_bits,
            options: self.options,
        })
    }
}

/// An operation result as it crosses the process boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireResult {
    /// True when the operation succeeded
    pub success: bool,
    /// Hex-encoded output payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hex: Option<String>,
    /// Verification verdict, for verify-style operations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    /// Stable failure code, present exactly when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,
    /// Failure description, present exactly when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl WireResult {
    /// Encode an in-process result into its wire shape.
    pub fn from_result(result: &OperationResult) -> Self {
        match result {
            OperationResult::Success { data, verified } => Self {
                success: true,
                data_hex: data.as_ref().map(encode_hex),
                verified: *verified,
                code: None,
                message: None,
            },
            OperationResult::Failure { code, message } => Self {
                success: false,
                data_hex: None,
                verified: None,
                code: Some(*code),
                message: Some(message.clone()),
            },
        }
    }

    /// Decode the wire shape back into an in-process result.
    pub fn into_result(self) -> TransportResult<OperationResult> {
        if self.success {
            let data = decode_opt_hex("data_hex", self.data_hex)?;
            Ok(OperationResult::Success {
                data,
                verified: self.verified,
            })
        } else {
            let code = self.code.ok_or_else(|| {
                TransportError::SerializationFailed(
                    "failure result is missing its code".to_string(),
                )
            })?;
            Ok(OperationResult::Failure {
                code,
                message: self.message.unwrap_or_default(),
            })
        }
    }
}

/// Normalize a transport-layer failure into an operation result, so a
/// collaborator that could not even deliver the request still answers with
/// the standard failure shape.
pub fn failure_from_transport(err: TransportError) -> OperationResult {
    OperationResult::from_error(&mapping::transport_to_core(err))
}

fn encode_hex(buffer: &SecureBuffer) -> String {
    hex::encode(buffer.as_bytes())
}

fn decode_hex(field: &str, value: &str) -> TransportResult<SecureBuffer> {
    hex::decode(value)
        .map(SecureBuffer::from_vec)
        .map_err(|e| TransportError::SerializationFailed(format!("bad hex in {field}: {e}")))
}

fn decode_opt_hex(field: &str, value: Option<String>) -> TransportResult<Option<SecureBuffer>> {
    value.map(|v| decode_hex(field, &v)).transpose()
}
