//! Single dispatch entry point for security operations.
//!
//! [`SecurityOrchestrator::operation`] validates the request shape per
//! operation kind, resolves key references, routes to the crypto engine or
//! key manager, and normalizes every typed failure into the stable
//! `(code, message)` form of [`OperationResult::Failure`]; codes survive
//! serialization across a transport boundary.
//!
//! # Lock Discipline
//!
//! Stored key references are resolved by copying material out of the key
//! store; no per-identifier lock is held while the (potentially expensive)
//! cryptographic computation runs. Cancelling the returned future before a
//! rotation commit leaves the store in its pre-rotation state; after the
//! commit the rotation is fully visible.
//!
//! # Error Handling
//!
//! Failures are reported through an injected [`ErrorReporter`] rather than
//! a process-global handler, so tests and embedders control the sink.

use std::sync::Arc;

use keyward_core::{
    Config, CoreError, CoreResult, KeyRef, OperationKind, OperationRequest, OperationResult,
    SecureBuffer,
};
use keyward_crypto::{CryptoEngine, DEFAULT_KEY_BITS};
use keyward_keys::{KeyAlgorithm, KeyManager, KeyStatus};

/// Failure sink injected into the orchestrator.
///
/// Logs the operation kind and stable code; messages never contain key
/// material because they originate from the typed error taxonomy.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    service: String,
}

impl ErrorReporter {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    /// Record a failed operation.
    pub fn report(&self, kind: OperationKind, err: &CoreError) {
        tracing::warn!(
            service = %self.service,
            operation = kind.as_str(),
            code = err.code(),
            error = %err,
            "operation failed"
        );
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new("keyward")
    }
}

/// Validates, routes, and normalizes security operation requests.
pub struct SecurityOrchestrator {
    engine: CryptoEngine,
    keys: Arc<KeyManager>,
    reporter: ErrorReporter,
    default_key_bits: u32,
}

impl SecurityOrchestrator {
    pub fn new(engine: CryptoEngine, keys: Arc<KeyManager>, reporter: ErrorReporter) -> Self {
        Self {
            engine,
            keys,
            reporter,
            default_key_bits: DEFAULT_KEY_BITS,
        }
    }

    /// Orchestrator honoring configured defaults.
    pub fn with_config(
        engine: CryptoEngine,
        keys: Arc<KeyManager>,
        reporter: ErrorReporter,
        config: &Config,
    ) -> Self {
        Self {
            engine,
            keys,
            reporter,
            default_key_bits: config.service.default_key_bits,
        }
    }

    /// Orchestrator backed by an in-memory key store, for embedding and tests.
    pub fn in_memory() -> Self {
        Self::new(
            CryptoEngine::new(),
            Arc::new(KeyManager::in_memory()),
            ErrorReporter::default(),
        )
    }

    /// The key manager backing this orchestrator.
    pub fn key_manager(&self) -> &Arc<KeyManager> {
        &self.keys
    }

    /// Execute one security operation.
    ///
    /// Never panics on malformed requests; every failure path produces a
    /// `Failure` result with a stable code.
    pub async fn operation(&self, request: OperationRequest) -> OperationResult {
        match self.dispatch(&request).await {
            Ok(result) => result,
            Err(err) => {
                self.reporter.report(request.kind, &err);
                OperationResult::from_error(&err)
            }
        }
    }

    async fn dispatch(&self, request: &OperationRequest) -> CoreResult<OperationResult> {
        if request.iv.is_some() {
            // The engine always generates the IV; a caller-supplied one is
            // rejected rather than silently ignored.
            return Err(CoreError::InvalidInput(
                "caller-supplied IV is not supported; the engine generates the IV".to_string(),
            ));
        }

        match request.kind {
            OperationKind::Encrypt => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                let framed =
                    self.engine
                        .encrypt_symmetric(input.as_bytes(), &key, aad_bytes(request))?;
                Ok(OperationResult::with_data(framed))
            }
            OperationKind::Decrypt => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                let plaintext =
                    self.engine
                        .decrypt_symmetric(input.as_bytes(), &key, aad_bytes(request))?;
                Ok(OperationResult::with_data(plaintext))
            }
            OperationKind::Hash => {
                let input = required_input(request)?;
                Ok(OperationResult::with_data(
                    self.engine.hash(input.as_bytes())?,
                ))
            }
            OperationKind::Hmac => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                Ok(OperationResult::with_data(
                    self.engine.hmac(input.as_bytes(), &key)?,
                ))
            }
            OperationKind::VerifyHmac => {
                let input = required_input(request)?;
                let mac = required_verification(request)?;
                let key = self.resolve_key(request).await?;
                let verified = self.engine.verify_hmac(mac, input.as_bytes(), &key)?;
                Ok(OperationResult::with_verified(verified))
            }
            OperationKind::Sign => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                Ok(OperationResult::with_data(
                    self.engine.sign(input.as_bytes(), &key)?,
                ))
            }
            OperationKind::Verify => {
                let input = required_input(request)?;
                let signature = required_verification(request)?;
                let key = self.resolve_key(request).await?;
                let verified =
                    self.engine
                        .verify(signature.as_bytes(), input.as_bytes(), key.as_bytes())?;
                Ok(OperationResult::with_verified(verified))
            }
            OperationKind::GenerateKey => {
                let id = stored_key_id(request)?;
                let bits = request.key_size_bits.unwrap_or(self.default_key_bits);
                self.keys.generate_key(id, bits).await?;
                Ok(OperationResult::ok())
            }
            OperationKind::GenerateRandom => {
                let len = random_length(request)?;
                Ok(OperationResult::with_data(
                    self.engine.generate_random_bytes(len)?,
                ))
            }
            OperationKind::RotateKey => {
                let id = stored_key_id(request)?;
                let reencrypt = request.input.as_ref().map(|b| b.as_bytes());
                let outcome = self.keys.rotate_key(id, reencrypt).await?;
                Ok(OperationResult::Success {
                    data: outcome.reencrypted,
                    verified: None,
                })
            }
            OperationKind::DeleteKey => {
                let id = stored_key_id(request)?;
                self.keys.delete_key(id).await?;
                Ok(OperationResult::ok())
            }
            OperationKind::ExportKey => {
                let id = stored_key_id(request)?;
                Ok(OperationResult::with_data(self.keys.export_key(id).await?))
            }
            OperationKind::ImportKey => {
                let id = stored_key_id(request)?;
                let input = required_input(request)?;
                self.keys.import_key(id, input.clone()).await?;
                Ok(OperationResult::ok())
            }
            OperationKind::ListKeys => {
                let infos = self.keys.list_keys().await?;
                let json = serde_json::to_vec(&infos).map_err(|e| {
                    keyward_core::mapping::internal_failure(&format!(
                        "key listing serialization: {e}"
                    ))
                })?;
                Ok(OperationResult::with_data(SecureBuffer::from_vec(json)))
            }
            OperationKind::EncryptAsymmetric => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                Ok(OperationResult::with_data(
                    self.engine
                        .encrypt_asymmetric(input.as_bytes(), key.as_bytes())?,
                ))
            }
            OperationKind::DecryptAsymmetric => {
                let input = required_input(request)?;
                let key = self.resolve_key(request).await?;
                Ok(OperationResult::with_data(
                    self.engine.decrypt_asymmetric(input.as_bytes(), &key)?,
                ))
            }
        }
    }

    /// Copy key material out of the request or the store.
    ///
    /// The store's per-identifier lock is released before this returns, so
    /// no lock spans the cryptographic computation. Stored material must be
    /// usable (`Active` or `Rotated`) and its algorithm must fit the
    /// requested operation; a symmetric key never doubles as a signing seed.
    async fn resolve_key(&self, request: &OperationRequest) -> CoreResult<SecureBuffer> {
        match &request.key {
            None => Err(CoreError::InvalidInput(format!(
                "operation '{}' requires key material",
                request.kind.as_str()
            ))),
            Some(KeyRef::Embedded(bytes)) => Ok(bytes.clone()),
            Some(KeyRef::Stored(id)) => {
                let material = self.keys.get_key(id).await?;
                match material.status {
                    KeyStatus::Active | KeyStatus::Rotated => {}
                    KeyStatus::Revoked => {
                        return Err(CoreError::StorageFailed(format!(
                            "key '{id}' is revoked"
                        )));
                    }
                }
                if !operation_accepts(request.kind, material.algorithm) {
                    return Err(CoreError::InvalidInput(format!(
                        "key '{id}' holds {} material and cannot serve '{}'",
                        material.algorithm.as_str(),
                        request.kind.as_str()
                    )));
                }
                Ok(material.bytes.clone())
            }
        }
    }
}

/// Whether stored material of the given algorithm may back the operation.
///
/// Only operation kinds that resolve key material consult this; the
/// remaining kinds accept anything so the match stays exhaustive.
fn operation_accepts(kind: OperationKind, algorithm: KeyAlgorithm) -> bool {
    match kind {
        OperationKind::Encrypt | OperationKind::Decrypt => {
            algorithm == KeyAlgorithm::ChaCha20Poly1305
        }
        OperationKind::Hmac | OperationKind::VerifyHmac => matches!(
            algorithm,
            KeyAlgorithm::ChaCha20Poly1305 | KeyAlgorithm::HmacSha256
        ),
        OperationKind::Sign | OperationKind::Verify => algorithm == KeyAlgorithm::Ed25519,
        OperationKind::EncryptAsymmetric | OperationKind::DecryptAsymmetric => {
            algorithm == KeyAlgorithm::X25519
        }
        OperationKind::Hash
        | OperationKind::GenerateKey
        | OperationKind::GenerateRandom
        | OperationKind::RotateKey
        | OperationKind::DeleteKey
        | OperationKind::ExportKey
        | OperationKind::ImportKey
        | OperationKind::ListKeys => true,
    }
}

fn required_input(request: &OperationRequest) -> CoreResult<&SecureBuffer> {
    request.input.as_ref().ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "operation '{}' requires input data",
            request.kind.as_str()
        ))
    })
}

fn required_verification(request: &OperationRequest) -> CoreResult<&SecureBuffer> {
    request.verification.as_ref().ok_or_else(|| {
        CoreError::InvalidInput(format!(
            "operation '{}' requires a MAC or signature to verify",
            request.kind.as_str()
        ))
    })
}

fn stored_key_id(request: &OperationRequest) -> CoreResult<&str> {
    match &request.key {
        Some(KeyRef::Stored(id)) => Ok(id.as_str()),
        Some(KeyRef::Embedded(_)) | None => Err(CoreError::InvalidInput(format!(
            "operation '{}' requires a stored-key identifier",
            request.kind.as_str()
        ))),
    }
}

fn aad_bytes(request: &OperationRequest) -> Option<&[u8]> {
    request.aad.as_ref().map(|b| b.as_bytes())
}

fn random_length(request: &OperationRequest) -> CoreResult<usize> {
    if let Some(value) = request.options.get("length") {
        return value.parse::<usize>().map_err(|_| {
            CoreError::InvalidInput(format!("invalid random length option: '{value}'"))
        });
    }
    if let Some(bits) = request.key_size_bits {
        if bits == 0 || bits % 8 != 0 {
            return Err(CoreError::InvalidInput(format!(
                "random bit length must be a positive multiple of 8, got {bits}"
            )));
        }
        return Ok((bits / 8) as usize);
    }
    Err(CoreError::InvalidInput(
        "generate_random requires a 'length' option or key_size_bits".to_string(),
    ))
}
