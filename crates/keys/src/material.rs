//! Key material and its lifecycle metadata.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

use keyward_core::SecureBuffer;

/// Algorithm a key is intended for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
    /// 256-bit symmetric AEAD key
    ChaCha20Poly1305,
    /// X25519 key-exchange secret
    X25519,
    /// Ed25519 signing seed
    Ed25519,
    /// HMAC-SHA256 authentication key
    HmacSha256,
}

impl KeyAlgorithm {
    /// Stable name used in logs and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyAlgorithm::ChaCha20Poly1305 => "chacha20-poly1305",
            KeyAlgorithm::X25519 => "x25519",
            KeyAlgorithm::Ed25519 => "ed25519",
            KeyAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }
}

/// Lifecycle status of key material.
///
/// At most one `Active` key exists per identifier at any instant. Rotation
/// never edits bytes in place: it creates new `Active` material and demotes
/// the prior version to `Rotated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStatus {
    /// Usable for new cryptographic operations
    Active,
    /// Superseded by a newer version; retained for audit
    Rotated,
    /// Administratively disabled; unusable
    Revoked,
}

/// Stored key material.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    /// Identifier the key is stored under
    pub id: String,
    /// Raw key bytes, zeroized on drop
    pub bytes: SecureBuffer,
    /// Intended algorithm
    pub algorithm: KeyAlgorithm,
    /// Creation time, unix milliseconds
    pub created_at: u64,
    /// Lifecycle status
    pub status: KeyStatus,
    /// Monotonic version, bumped by rotation
    pub version: u32,
}

impl KeyMaterial {
    /// Create fresh `Active` version-1 material.
    pub fn new(id: impl Into<String>, bytes: SecureBuffer, algorithm: KeyAlgorithm) -> Self {
        Self {
            id: id.into(),
            bytes,
            algorithm,
            created_at: current_timestamp_ms(),
            status: KeyStatus::Active,
            version: 1,
        }
    }

    /// Metadata view without the key bytes.
    pub fn info(&self) -> KeyInfo {
        KeyInfo {
            id: self.id.clone(),
            algorithm: self.algorithm,
            status: self.status,
            version: self.version,
            created_at: self.created_at,
        }
    }
}

/// Key metadata exposed to callers; never carries key bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInfo {
    pub id: String,
    pub algorithm: KeyAlgorithm,
    pub status: KeyStatus,
    pub version: u32,
    pub created_at: u64,
}

/// Current timestamp in milliseconds since the unix epoch.
pub(crate) fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .min(u64::MAX as u128) as u64
}
