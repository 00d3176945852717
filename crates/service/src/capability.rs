//! Capability tiers over the security orchestrator.
//!
//! Callers are granted one of three nested tiers. Each tier is a trait; the
//! supertrait chain means a `CompleteCapability` value can always be used
//! where a narrower tier is expected:
//!
//! - [`BasicCapability`]: liveness check and key-metadata synchronization
//! - [`StandardCapability`]: symmetric crypto, hashing, signatures, key and
//!   random generation
//! - [`CompleteCapability`]: generic result-typed dispatch, key
//!   export/import, and asymmetric operations
//!
//! Every method has a total default body that fails with `NotSupported`
//! (or a `NotImplemented`-coded result for [`CompleteCapability::execute`]).
//! An implementation backing only part of a tier therefore degrades to a
//! typed failure instead of a missing-method compile break rippling through
//! embedders, and a narrow backend exposed through a wide trait object
//! never panics.

use std::sync::Arc;

use async_trait::async_trait;

use keyward_core::{
    mapping, CoreError, KeyRef, OperationKind, OperationRequest, OperationResult, ProtocolError,
    ProtocolResult, SecureBuffer,
};
use keyward_keys::KeyInfo;

use crate::orchestrator::SecurityOrchestrator;

/// Capability tier granted to a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CapabilityTier {
    Basic,
    Standard,
    Complete,
}

impl CapabilityTier {
    /// True if this tier permits the given operation.
    pub fn supports(&self, kind: OperationKind) -> bool {
        let required = match kind {
            OperationKind::ListKeys => CapabilityTier::Basic,
            OperationKind::Encrypt
            | OperationKind::Decrypt
            | OperationKind::Hash
            | OperationKind::Hmac
            | OperationKind::VerifyHmac
            | OperationKind::Sign
            | OperationKind::Verify
            | OperationKind::GenerateKey
            | OperationKind::GenerateRandom => CapabilityTier::Standard,
            OperationKind::RotateKey
            | OperationKind::DeleteKey
            | OperationKind::ExportKey
            | OperationKind::ImportKey
            | OperationKind::EncryptAsymmetric
            | OperationKind::DecryptAsymmetric => CapabilityTier::Complete,
        };
        *self >= required
    }

    /// Stable name used in logs and wire payloads.
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityTier::Basic => "basic",
            CapabilityTier::Standard => "standard",
            CapabilityTier::Complete => "complete",
        }
    }
}

fn not_supported(operation: &str) -> ProtocolError {
    ProtocolError::NotSupported(format!(
        "operation '{operation}' is not supported by this implementation"
    ))
}

/// Entry tier: liveness and key-metadata synchronization.
#[async_trait]
pub trait BasicCapability: Send + Sync {
    /// Liveness check.
    async fn ping(&self) -> ProtocolResult<()> {
        Ok(())
    }

    /// Metadata for every key the caller may reference, for cache
    /// synchronization. Never returns key material.
    async fn synchronize_keys(&self) -> ProtocolResult<Vec<KeyInfo>> {
        Err(not_supported("synchronize_keys"))
    }
}

/// Adds symmetric crypto, hashing, signatures, and generation.
#[async_trait]
pub trait StandardCapability: BasicCapability {
    async fn encrypt(
        &self,
        _plaintext: SecureBuffer,
        _key: KeyRef,
        _aad: Option<SecureBuffer>,
    ) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("encrypt"))
    }

    async fn decrypt(
        &self,
        _ciphertext: SecureBuffer,
        _key: KeyRef,
        _aad: Option<SecureBuffer>,
    ) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("decrypt"))
    }

    async fn hash(&self, _data: SecureBuffer) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("hash"))
    }

    async fn sign(&self, _data: SecureBuffer, _key: KeyRef) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("sign"))
    }

    async fn verify(
        &self,
        _data: SecureBuffer,
        _signature: SecureBuffer,
        _public_key: KeyRef,
    ) -> ProtocolResult<bool> {
        Err(not_supported("verify"))
    }

    async fn generate_key(&self, _id: &str, _bits: u32) -> ProtocolResult<()> {
        Err(not_supported("generate_key"))
    }

    async fn generate_random(&self, _length: usize) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("generate_random"))
    }
}

/// Full surface: generic dispatch, key export/import, asymmetric crypto.
#[async_trait]
pub trait CompleteCapability: StandardCapability {
    /// Generic result-typed dispatch for any operation kind.
    async fn execute(&self, request: OperationRequest) -> OperationResult {
        OperationResult::from_error(&CoreError::NotImplemented(format!(
            "operation '{}' is not implemented by this backend",
            request.kind.as_str()
        )))
    }

    async fn export_key(&self, _id: &str) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("export_key"))
    }

    async fn import_key(&self, _id: &str, _bytes: SecureBuffer) -> ProtocolResult<()> {
        Err(not_supported("import_key"))
    }

    async fn encrypt_asymmetric(
        &self,
        _plaintext: SecureBuffer,
        _recipient_public: SecureBuffer,
    ) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("encrypt_asymmetric"))
    }

    async fn decrypt_asymmetric(
        &self,
        _sealed: SecureBuffer,
        _secret: SecureBuffer,
    ) -> ProtocolResult<SecureBuffer> {
        Err(not_supported("decrypt_asymmetric"))
    }
}

/// Tier-gated view over a [`SecurityOrchestrator`].
///
/// Implements all three capability traits; operations outside the granted
/// tier fail with `NotSupported` before reaching the orchestrator.
pub struct CapabilityProvider {
    orchestrator: Arc<SecurityOrchestrator>,
    tier: CapabilityTier,
}

impl CapabilityProvider {
    pub fn new(orchestrator: Arc<SecurityOrchestrator>, tier: CapabilityTier) -> Self {
        Self { orchestrator, tier }
    }

    /// The tier this provider was granted.
    pub fn tier(&self) -> CapabilityTier {
        self.tier
    }

    async fn run(&self, request: OperationRequest) -> ProtocolResult<OperationResult> {
        if !self.tier.supports(request.kind) {
            return Err(ProtocolError::NotSupported(format!(
                "operation '{}' requires a higher capability tier than '{}'",
                request.kind.as_str(),
                self.tier.as_str()
            )));
        }
        Ok(self.orchestrator.operation(request).await)
    }

    async fn run_data(&self, request: OperationRequest) -> ProtocolResult<SecureBuffer> {
        match self.run(request).await? {
            OperationResult::Success {
                data: Some(data), ..
            } => Ok(data),
            OperationResult::Success { data: None, .. } => Err(ProtocolError::Internal(
                "operation produced no output payload".to_string(),
            )),
            OperationResult::Failure { code, message } => Err(failure_to_protocol(code, message)),
        }
    }

    async fn run_verified(&self, request: OperationRequest) -> ProtocolResult<bool> {
        match self.run(request).await? {
            OperationResult::Success {
                verified: Some(verdict),
                ..
            } => Ok(verdict),
            OperationResult::Success { verified: None, .. } => Err(ProtocolError::Internal(
                "operation produced no verification verdict".to_string(),
            )),
            OperationResult::Failure { code, message } => Err(failure_to_protocol(code, message)),
        }
    }

    async fn run_unit(&self, request: OperationRequest) -> ProtocolResult<()> {
        match self.run(request).await? {
            OperationResult::Success { .. } => Ok(()),
            OperationResult::Failure { code, message } => Err(failure_to_protocol(code, message)),
        }
    }
}

/// Lift a normalized `(code, message)` failure back into the protocol
/// domain, mirroring [`mapping::core_to_protocol`].
fn failure_to_protocol(code: i32, message: String) -> ProtocolError {
    match code {
        1001 => ProtocolError::InvalidRequest(message),
        1005 => ProtocolError::KeyUnavailable(message),
        1009 => ProtocolError::NotSupported(message),
        1008 => ProtocolError::Internal(message),
        1002..=1007 => ProtocolError::OperationFailed(message),
        2001..=2006 | 3001..=3005 => ProtocolError::Internal(message),
        _ => ProtocolError::Internal(format!("unrecognized failure code {code}: {message}")),
    }
}

#[async_trait]
impl BasicCapability for CapabilityProvider {
    async fn ping(&self) -> ProtocolResult<()> {
        Ok(())
    }

    async fn synchronize_keys(&self) -> ProtocolResult<Vec<KeyInfo>> {
        self.orchestrator
            .key_manager()
            .list_keys()
            .await
            .map_err(mapping::core_to_protocol)
    }
}

#[async_trait]
impl StandardCapability for CapabilityProvider {
    async fn encrypt(
        &self,
        plaintext: SecureBuffer,
        key: KeyRef,
        aad: Option<SecureBuffer>,
    ) -> ProtocolResult<SecureBuffer> {
        let mut request = OperationRequest::new(OperationKind::Encrypt)
            .with_input(plaintext)
            .with_key(key);
        request.aad = aad;
        self.run_data(request).await
    }

    async fn decrypt(
        &self,
        ciphertext: SecureBuffer,
        key: KeyRef,
        aad: Option<SecureBuffer>,
    ) -> ProtocolResult<SecureBuffer> {
        let mut request = OperationRequest::new(OperationKind::Decrypt)
            .with_input(ciphertext)
            .with_key(key);
        request.aad = aad;
        self.run_data(request).await
    }

    async fn hash(&self, data: SecureBuffer) -> ProtocolResult<SecureBuffer> {
        self.run_data(OperationRequest::new(OperationKind::Hash).with_input(data))
            .await
    }

    async fn sign(&self, data: SecureBuffer, key: KeyRef) -> ProtocolResult<SecureBuffer> {
        self.run_data(
            OperationRequest::new(OperationKind::Sign)
                .with_input(data)
                .with_key(key),
        )
        .await
    }

    async fn verify(
        &self,
        data: SecureBuffer,
        signature: SecureBuffer,
        public_key: KeyRef,
    ) -> ProtocolResult<bool> {
        self.run_verified(
            OperationRequest::new(OperationKind::Verify)
                .with_input(data)
                .with_verification(signature)
                .with_key(public_key),
        )
        .await
    }

    async fn generate_key(&self, id: &str, bits: u32) -> ProtocolResult<()> {
        self.run_unit(
            OperationRequest::new(OperationKind::GenerateKey)
                .with_key_id(id)
                .with_key_size_bits(bits),
        )
        .await
    }

    async fn generate_random(&self, length: usize) -> ProtocolResult<SecureBuffer> {
        self.run_data(
            OperationRequest::new(OperationKind::GenerateRandom)
                .with_option("length", length.to_string()),
        )
        .await
    }
}

#[async_trait]
impl CompleteCapability for CapabilityProvider {
    async fn execute(&self, request: OperationRequest) -> OperationResult {
        match self.run(request).await {
            Ok(result) => result,
            Err(err) => OperationResult::Failure {
                code: err.code(),
                message: err.to_string(),
            },
        }
    }

    async fn export_key(&self, id: &str) -> ProtocolResult<SecureBuffer> {
        self.run_data(OperationRequest::new(OperationKind::ExportKey).with_key_id(id))
            .await
    }

    async fn import_key(&self, id: &str, bytes: SecureBuffer) -> ProtocolResult<()> {
        self.run_unit(
            OperationRequest::new(OperationKind::ImportKey)
                .with_key_id(id)
                .with_input(bytes),
        )
        .await
    }

    async fn encrypt_asymmetric(
        &self,
        plaintext: SecureBuffer,
        recipient_public: SecureBuffer,
    ) -> ProtocolResult<SecureBuffer> {
        self.run_data(
            OperationRequest::new(OperationKind::EncryptAsymmetric)
                .with_input(plaintext)
                .with_key(KeyRef::Embedded(recipient_public)),
        )
        .await
    }

    async fn decrypt_asymmetric(
        &self,
        sealed: SecureBuffer,
        secret: SecureBuffer,
    ) -> ProtocolResult<SecureBuffer> {
        self.run_data(
            OperationRequest::new(OperationKind::DecryptAsymmetric)
                .with_input(sealed)
                .with_key(KeyRef::Embedded(secret)),
        )
        .await
    }
}
