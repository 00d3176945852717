//! Operation request and result DTOs.
//!
//! Every call into the orchestrator is a tagged [`OperationRequest`]; every
//! answer is an [`OperationResult`]. Both are transient values created and
//! discarded per call. Success and failure are mutually exclusive by
//! construction: the result is an enum, not a pair of optional fields.
//!
//! Sensitive payloads travel as [`SecureBuffer`]s and therefore never leak
//! through `Debug` formatting or accidental serialization; the hex-encoded
//! wire shape lives in the service crate's transport module.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::SecureBuffer;

/// The operation a caller wants performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Encrypt,
    Decrypt,
    Hash,
    Hmac,
    VerifyHmac,
    Sign,
    Verify,
    GenerateKey,
    GenerateRandom,
    RotateKey,
    DeleteKey,
    ExportKey,
    ImportKey,
    ListKeys,
    EncryptAsymmetric,
    DecryptAsymmetric,
}

impl OperationKind {
    /// Stable snake_case name used in logs and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Encrypt => "encrypt",
            OperationKind::Decrypt => "decrypt",
            OperationKind::Hash => "hash",
            OperationKind::Hmac => "hmac",
            OperationKind::VerifyHmac => "verify_hmac",
            OperationKind::Sign => "sign",
            OperationKind::Verify => "verify",
            OperationKind::GenerateKey => "generate_key",
            OperationKind::GenerateRandom => "generate_random",
            OperationKind::RotateKey => "rotate_key",
            OperationKind::DeleteKey => "delete_key",
            OperationKind::ExportKey => "export_key",
            OperationKind::ImportKey => "import_key",
            OperationKind::ListKeys => "list_keys",
            OperationKind::EncryptAsymmetric => "encrypt_asymmetric",
            OperationKind::DecryptAsymmetric => "decrypt_asymmetric",
        }
    }
}

/// Reference to key material: either embedded in the request or an
/// identifier resolved against the key store.
#[derive(Debug, Clone)]
pub enum KeyRef {
    /// Raw key bytes supplied by the caller
    Embedded(SecureBuffer),
    /// Identifier of key material held by the key store
    Stored(String),
}

/// A single security operation request.
#[derive(Debug, Clone)]
pub struct OperationRequest {
    /// Operation to perform
    pub kind: OperationKind,
    /// Primary input payload (plaintext, ciphertext, data to hash or sign)
    pub input: Option<SecureBuffer>,
    /// Key material reference
    pub key: Option<KeyRef>,
    /// MAC or signature to check for verification operations
    pub verification: Option<SecureBuffer>,
    /// Caller-supplied IV. The engine always generates its own IV; a
    /// populated field is rejected with `InvalidInput` rather than ignored.
    pub iv: Option<SecureBuffer>,
    /// Additional authenticated data for AEAD operations
    pub aad: Option<SecureBuffer>,
    /// Requested key size in bits for key generation
    pub key_size_bits: Option<u32>,
    /// Free-form operation options
    pub options: HashMap<String, String>,
}

impl OperationRequest {
    /// Start a request for the given operation.
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            input: None,
            key: None,
            verification: None,
            iv: None,
            aad: None,
            key_size_bits: None,
            options: HashMap::new(),
        }
    }

    /// Attach the primary input payload.
    pub fn with_input(mut self, input: SecureBuffer) -> Self {
        self.input = Some(input);
        self
    }

    /// Attach a key reference.
    pub fn with_key(mut self, key: KeyRef) -> Self {
        self.key = Some(key);
        self
    }

    /// Attach a stored-key identifier.
    pub fn with_key_id(self, id: impl Into<String>) -> Self {
        self.with_key(KeyRef::Stored(id.into()))
    }

    /// Attach a MAC or signature for verification.
    pub fn with_verification(mut self, verification: SecureBuffer) -> Self {
        self.verification = Some(verification);
        self
    }

    /// Attach additional authenticated data.
    pub fn with_aad(mut self, aad: SecureBuffer) -> Self {
        self.aad = Some(aad);
        self
    }

    /// Set the requested key size in bits.
    pub fn with_key_size_bits(mut self, bits: u32) -> Self {
        self.key_size_bits = Some(bits);
        self
    }

    /// Set a free-form option.
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(name.into(), value.into());
        self
    }
}

/// The outcome of a security operation.
#[derive(Debug, Clone)]
pub enum OperationResult {
    /// Operation completed
    Success {
        /// Output payload, when the operation produces one
        data: Option<SecureBuffer>,
        /// Verification verdict, for verify-style operations
        verified: Option<bool>,
    },
    /// Operation failed with a stable code and a human-readable message
    Failure {
        /// Stable numeric code (see the error taxonomy)
        code: i32,
        /// Failure description; never contains key material
        message: String,
    },
}

impl OperationResult {
    /// Success with no payload.
    pub fn ok() -> Self {
        OperationResult::Success {
            data: None,
            verified: None,
        }
    }

    /// Success carrying an output payload.
    pub fn with_data(data: SecureBuffer) -> Self {
        OperationResult::Success {
            data: Some(data),
            verified: None,
        }
    }

    /// Success carrying a verification verdict.
    pub fn with_verified(verified: bool) -> Self {
        OperationResult::Success {
            data: None,
            verified: Some(verified),
        }
    }

    /// Failure from a typed core error, using its stable code.
    pub fn from_error(err: &CoreError) -> Self {
        OperationResult::Failure {
            code: err.code(),
            message: err.to_string(),
        }
    }

    /// True if the operation succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    /// Output payload, if any.
    pub fn data(&self) -> Option<&SecureBuffer> {
        match self {
            OperationResult::Success { data, .. } => data.as_ref(),
            OperationResult::Failure { .. } => None,
        }
    }

    /// Verification verdict, if any.
    pub fn verified(&self) -> Option<bool> {
        match self {
            OperationResult::Success { verified, .. } => *verified,
            OperationResult::Failure { .. } => None,
        }
    }

    /// Failure code and message, if the operation failed.
    pub fn failure(&self) -> Option<(i32, &str)> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { code, message } => Some((*code, message.as_str())),
        }
    }
}
