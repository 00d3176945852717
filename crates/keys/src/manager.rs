//! Key lifecycle orchestration: generation, import, rotation, deletion.
//!
//! # Rotation Atomicity
//!
//! `rotate_key` is all-or-nothing. It reads a copy of the active material,
//! releases every lock, performs the expensive work (new key generation and
//! the optional decrypt/re-encrypt of caller data) outside any lock, then
//! commits with a compare-and-swap on the key version. If the re-encryption
//! fails, or the version moved underneath the rotation, nothing is
//! committed and the old key stays `Active`. Readers see either the old key
//! or the new key, never a mixture.

use std::sync::Arc;

use keyward_core::{CoreError, CoreResult, SecureBuffer};
use keyward_crypto::CryptoEngine;

use crate::material::{KeyAlgorithm, KeyInfo, KeyMaterial, KeyStatus};
use crate::store::{KeyStore, MemoryKeyStore};

/// Separator reserved for rotation shadow identifiers (`id@vN`).
const SHADOW_SEPARATOR: char = '@';

/// Outcome of a committed rotation.
#[derive(Debug)]
pub struct RotationOutcome {
    /// Version of the newly active key
    pub version: u32,
    /// Caller data re-encrypted under the new key, when requested
    pub reencrypted: Option<SecureBuffer>,
}

/// Orchestrates the key store and crypto engine for key lifecycle operations.
pub struct KeyManager {
    store: Arc<dyn KeyStore>,
    engine: CryptoEngine,
}

impl KeyManager {
    pub fn new(store: Arc<dyn KeyStore>, engine: CryptoEngine) -> Self {
        Self { store, engine }
    }

    /// Manager backed by the in-memory reference store.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryKeyStore::new()), CryptoEngine::new())
    }

    /// Generate and store a fresh symmetric key under `id`.
    pub async fn generate_key(&self, id: &str, bits: u32) -> CoreResult<KeyInfo> {
        validate_identifier(id)?;
        let bytes = self.engine.generate_symmetric_key(bits)?;
        let material = KeyMaterial::new(id, bytes, KeyAlgorithm::ChaCha20Poly1305);
        let info = material.info();
        self.store.store(material).await?;
        tracing::info!(key_id = %id, bits, "generated key");
        Ok(info)
    }

    /// Import caller-supplied key bytes under `id`.
    pub async fn import_key(&self, id: &str, bytes: SecureBuffer) -> CoreResult<KeyInfo> {
        validate_identifier(id)?;
        if !matches!(bytes.len(), 16 | 24 | 32) {
            return Err(CoreError::InvalidInput(format!(
                "imported key must be 16, 24 or 32 bytes, got {}",
                bytes.len()
            )));
        }
        let material = KeyMaterial::new(id, bytes, KeyAlgorithm::ChaCha20Poly1305);
        let info = material.info();
        self.store.store(material).await?;
        tracing::info!(key_id = %id, "imported key");
        Ok(info)
    }

    /// Copy of the material under `id`.
    pub async fn get_key(&self, id: &str) -> CoreResult<KeyMaterial> {
        self.store.retrieve(id).await
    }

    /// Copy of the active key bytes under `id`, for export across the
    /// capability boundary.
    pub async fn export_key(&self, id: &str) -> CoreResult<SecureBuffer> {
        let material = self.store.retrieve(id).await?;
        if material.status != KeyStatus::Active {
            return Err(CoreError::StorageFailed(format!(
                "key '{id}' is not active"
            )));
        }
        Ok(material.bytes.clone())
    }

    /// Metadata for every stored key, rotation shadows included.
    pub async fn list_keys(&self) -> CoreResult<Vec<KeyInfo>> {
        self.store.list().await
    }

    /// Remove the key under `id` together with its rotation shadows.
    pub async fn delete_key(&self, id: &str) -> CoreResult<()> {
        self.store.delete(id).await?;

        let shadow_prefix = format!("{id}{SHADOW_SEPARATOR}v");
        for info in self.store.list().await? {
            if info.id.starts_with(&shadow_prefix) {
                // A concurrent delete of the same shadow is not an error.
                match self.store.delete(&info.id).await {
                    Ok(()) | Err(CoreError::KeyNotFound(_)) => {}
                    Err(e) => return Err(e),
                }
            }
        }
        tracing::info!(key_id = %id, "deleted key");
        Ok(())
    }

    /// Mark the key under `id` as revoked; it remains stored but unusable.
    pub async fn revoke_key(&self, id: &str) -> CoreResult<()> {
        self.store.set_status(id, KeyStatus::Revoked).await?;
        tracing::warn!(key_id = %id, "revoked key");
        Ok(())
    }

    /// Rotate the key under `id`, optionally re-encrypting `reencrypt`
    /// (ciphertext under the old key) so it remains readable afterwards.
    pub async fn rotate_key(
        &self,
        id: &str,
        reencrypt: Option<&[u8]>,
    ) -> CoreResult<RotationOutcome> {
        let old = self.store.retrieve(id).await?;
        if old.status != KeyStatus::Active {
            return Err(CoreError::StorageFailed(format!(
                "key '{id}' is not active and cannot be rotated"
            )));
        }

        // Expensive work happens outside any store lock.
        let new_bytes = self
            .engine
            .generate_symmetric_key((old.bytes.len() * 8) as u32)?;

        let reencrypted = match reencrypt {
            Some(ciphertext) => {
                let plaintext = self
                    .engine
                    .decrypt_symmetric(ciphertext, &old.bytes, None)?;
                let rewrapped = self
                    .engine
                    .encrypt_symmetric(plaintext.as_bytes(), &new_bytes, None)?;
                // plaintext is zeroized when the SecureBuffer drops here
                Some(rewrapped)
            }
            None => None,
        };

        let mut replacement = KeyMaterial::new(id, new_bytes, old.algorithm);
        replacement.version = old.version + 1;
        let version = replacement.version;

        self.store.update(id, old.version, replacement).await?;
        tracing::info!(key_id = %id, version, "rotated key");

        Ok(RotationOutcome {
            version,
            reencrypted,
        })
    }
}

fn validate_identifier(id: &str) -> CoreResult<()> {
    if id.is_empty() {
        return Err(CoreError::InvalidInput(
            "key identifier must not be empty".to_string(),
        ));
    }
    if id.contains(SHADOW_SEPARATOR) {
        return Err(CoreError::InvalidInput(format!(
            "key identifier must not contain '{SHADOW_SEPARATOR}'"
        )));
    }
    Ok(())
}
