//! Layered error taxonomy for the Keyward security service.
//!
//! Three closed domains cover every failure the service can surface:
//!
//! - [`CoreError`]: crypto engine and key lifecycle failures
//! - [`ProtocolError`]: capability-protocol surface failures
//! - [`TransportError`]: inter-process transport collaborator failures
//!
//! Each variant carries a stable numeric code that survives serialization
//! across a process boundary; codes never change meaning between releases.
//! The [`mapping`] module provides explicit, compiler-checked conversions
//! between every pair of domains. Matches are exhaustive by construction:
//! adding a variant without extending the mappings is a compile error.
//!
//! Expected failures (bad input, missing key, authentication mismatch) are
//! returned as typed `Err` values, never panics. An internal invariant
//! violation degrades to a generic internal failure in release builds; see
//! [`mapping::internal_failure`].

use thiserror::Error;

/// Errors produced by the crypto engine and key manager.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Request shape or parameter is invalid
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Symmetric or asymmetric encryption failed
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption failed: truncated frame, wrong key, or tag mismatch
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Hash or MAC computation failed
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    /// No key material under the requested identifier
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    /// Key generation failed
    #[error("Key generation failed: {0}")]
    KeyGenerationFailed(String),

    /// OS random source failed or the requested length was invalid
    #[error("Random generation failed: {0}")]
    RandomGenerationFailed(String),

    /// Key store rejected the operation
    #[error("Storage failed: {0}")]
    StorageFailed(String),

    /// Operation is not supported by the backing implementation
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl CoreError {
    /// Stable numeric code for this error kind.
    ///
    /// Codes are fixed per variant so they remain meaningful after
    /// serialization across a transport boundary.
    pub fn code(&self) -> i32 {
        match self {
            CoreError::InvalidInput(_) => 1001,
            CoreError::EncryptionFailed(_) => 1002,
            CoreError::DecryptionFailed(_) => 1003,
            CoreError::HashingFailed(_) => 1004,
            CoreError::KeyNotFound(_) => 1005,
            CoreError::KeyGenerationFailed(_) => 1006,
            CoreError::RandomGenerationFailed(_) => 1007,
            CoreError::StorageFailed(_) => 1008,
            CoreError::NotImplemented(_) => 1009,
        }
    }
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced at the capability-protocol boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// Caller is not permitted to perform the operation
    #[error("Operation rejected: {0}")]
    OperationRejected(String),

    /// Request failed validation at the protocol surface
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The underlying operation failed
    #[error("Operation failed: {0}")]
    OperationFailed(String),

    /// Referenced key material is unavailable
    #[error("Key unavailable: {0}")]
    KeyUnavailable(String),

    /// Operation is outside the caller's capability tier
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Internal protocol failure
    #[error("Internal protocol error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> i32 {
        match self {
            ProtocolError::OperationRejected(_) => 2001,
            ProtocolError::InvalidRequest(_) => 2002,
            ProtocolError::OperationFailed(_) => 2003,
            ProtocolError::KeyUnavailable(_) => 2004,
            ProtocolError::NotSupported(_) => 2005,
            ProtocolError::Internal(_) => 2006,
        }
    }
}

/// Result type for capability-protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised by the inter-process transport collaborator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Connection to the peer was lost
    #[error("Transport disconnected: {0}")]
    Disconnected(String),

    /// Operation did not complete within the deadline
    #[error("Transport timeout: {0}")]
    Timeout(String),

    /// Request or response could not be (de)serialized
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Remote service is not available
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Internal transport failure
    #[error("Internal transport error: {0}")]
    Internal(String),
}

impl TransportError {
    /// Stable numeric code for this error kind.
    pub fn code(&self) -> i32 {
        match self {
            TransportError::Disconnected(_) => 3001,
            TransportError::Timeout(_) => 3002,
            TransportError::SerializationFailed(_) => 3003,
            TransportError::ServiceUnavailable(_) => 3004,
            TransportError::Internal(_) => 3005,
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Total mappings between the three error domains.
///
/// Every function matches exhaustively with no wildcard arm, so the
/// compiler rejects any taxonomy change that is not reflected here. Lossy
/// collapses are deliberate and always preserve the message text.
pub mod mapping {
    use super::{CoreError, ProtocolError, TransportError};

    /// Map a core failure onto the capability-protocol domain.
    pub fn core_to_protocol(err: CoreError) -> ProtocolError {
        match err {
            CoreError::InvalidInput(msg) => ProtocolError::InvalidRequest(msg),
            CoreError::EncryptionFailed(msg) => ProtocolError::OperationFailed(msg),
            CoreError::DecryptionFailed(msg) => ProtocolError::OperationFailed(msg),
            CoreError::HashingFailed(msg) => ProtocolError::OperationFailed(msg),
            CoreError::KeyNotFound(msg) => ProtocolError::KeyUnavailable(msg),
            CoreError::KeyGenerationFailed(msg) => ProtocolError::OperationFailed(msg),
            CoreError::RandomGenerationFailed(msg) => ProtocolError::OperationFailed(msg),
            CoreError::StorageFailed(msg) => ProtocolError::Internal(msg),
            CoreError::NotImplemented(msg) => ProtocolError::NotSupported(msg),
        }
    }

    /// Map a protocol failure back onto the core domain.
    pub fn protocol_to_core(err: ProtocolError) -> CoreError {
        match err {
            ProtocolError::OperationRejected(msg) => CoreError::InvalidInput(msg),
            ProtocolError::InvalidRequest(msg) => CoreError::InvalidInput(msg),
            ProtocolError::OperationFailed(msg) => CoreError::StorageFailed(msg),
            ProtocolError::KeyUnavailable(msg) => CoreError::KeyNotFound(msg),
            ProtocolError::NotSupported(msg) => CoreError::NotImplemented(msg),
            ProtocolError::Internal(msg) => CoreError::StorageFailed(msg),
        }
    }

    /// Map a core failure onto the transport domain.
    pub fn core_to_transport(err: CoreError) -> TransportError {
        match err {
            CoreError::InvalidInput(msg) => TransportError::SerializationFailed(msg),
            CoreError::EncryptionFailed(msg) => TransportError::Internal(msg),
            CoreError::DecryptionFailed(msg) => TransportError::Internal(msg),
            CoreError::HashingFailed(msg) => TransportError::Internal(msg),
            CoreError::KeyNotFound(msg) => TransportError::Internal(msg),
            CoreError::KeyGenerationFailed(msg) => TransportError::Internal(msg),
            CoreError::RandomGenerationFailed(msg) => TransportError::Internal(msg),
            CoreError::StorageFailed(msg) => TransportError::Internal(msg),
            CoreError::NotImplemented(msg) => TransportError::Internal(msg),
        }
    }

    /// Map a transport failure back onto the core domain.
    pub fn transport_to_core(err: TransportError) -> CoreError {
        match err {
            TransportError::Disconnected(msg) => CoreError::StorageFailed(msg),
            TransportError::Timeout(msg) => CoreError::StorageFailed(msg),
            TransportError::SerializationFailed(msg) => CoreError::InvalidInput(msg),
            TransportError::ServiceUnavailable(msg) => CoreError::StorageFailed(msg),
            TransportError::Internal(msg) => CoreError::StorageFailed(msg),
        }
    }

    /// Map a protocol failure onto the transport domain.
    pub fn protocol_to_transport(err: ProtocolError) -> TransportError {
        match err {
            ProtocolError::OperationRejected(msg) => TransportError::Internal(msg),
            ProtocolError::InvalidRequest(msg) => TransportError::SerializationFailed(msg),
            ProtocolError::OperationFailed(msg) => TransportError::Internal(msg),
            ProtocolError::KeyUnavailable(msg) => TransportError::Internal(msg),
            ProtocolError::NotSupported(msg) => TransportError::Internal(msg),
            ProtocolError::Internal(msg) => TransportError::Internal(msg),
        }
    }

    /// Map a transport failure onto the capability-protocol domain.
    pub fn transport_to_protocol(err: TransportError) -> ProtocolError {
        match err {
            TransportError::Disconnected(msg) => ProtocolError::Internal(msg),
            TransportError::Timeout(msg) => ProtocolError::Internal(msg),
            TransportError::SerializationFailed(msg) => ProtocolError::InvalidRequest(msg),
            TransportError::ServiceUnavailable(msg) => ProtocolError::Internal(msg),
            TransportError::Internal(msg) => ProtocolError::Internal(msg),
        }
    }

    /// Degrade an internal invariant violation to a generic core failure.
    ///
    /// Release builds must keep serving rather than crash; debug and test
    /// builds abort so the gap is found early.
    pub fn internal_failure(context: &str) -> CoreError {
        debug_assert!(false, "internal invariant violated: {context}");
        tracing::error!(context, "internal invariant violated");
        CoreError::StorageFailed(format!("internal error: {context}"))
    }
}
