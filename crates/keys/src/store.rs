//! Key store abstraction and the in-memory reference implementation.
//!
//! The [`KeyStore`] trait keeps raw key material behind an async boundary so
//! durable backends (an encrypted file store, an OS keychain bridge) can be
//! plugged in without touching the manager. Implementations must honor the
//! per-identifier single-writer discipline and the compare-and-swap
//! semantics of [`KeyStore::update`], which carry the atomic-rotation
//! guarantee.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use keyward_core::{CoreError, CoreResult};

use crate::material::{KeyInfo, KeyMaterial, KeyStatus};

/// Async identifier-keyed repository of key material.
#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Store fresh material under its identifier.
    ///
    /// Fails with `StorageFailed` if the identifier is already occupied.
    async fn store(&self, material: KeyMaterial) -> CoreResult<()>;

    /// Retrieve a copy of the material under `id`, or `KeyNotFound`.
    async fn retrieve(&self, id: &str) -> CoreResult<KeyMaterial>;

    /// Remove the material under `id`, or `KeyNotFound`.
    async fn delete(&self, id: &str) -> CoreResult<()>;

    /// Enumerate metadata for every stored key, shadow versions included.
    async fn list(&self) -> CoreResult<Vec<KeyInfo>>;

    /// Commit a rotation: replace the material under `id` if its version
    /// still equals `expected_version`.
    ///
    /// The displaced material is demoted to `Rotated` and retained under a
    /// versioned shadow identifier (`id@vN`). A version mismatch means the
    /// rotation lost a race and fails with `StorageFailed`, leaving the
    /// store untouched.
    async fn update(
        &self,
        id: &str,
        expected_version: u32,
        replacement: KeyMaterial,
    ) -> CoreResult<()>;

    /// Change the lifecycle status of the material under `id`.
    async fn set_status(&self, id: &str, status: KeyStatus) -> CoreResult<()>;

    /// True if material exists under `id`.
    async fn contains(&self, id: &str) -> bool {
        self.retrieve(id).await.is_ok()
    }
}

/// In-memory key store.
///
/// Each identifier maps to its own `RwLock`ed slot, giving
/// single-writer/multi-reader semantics per identifier; the outer map lock
/// is held only long enough to locate a slot. `update` acquires the outer
/// write lock for the whole commit so the swap and the shadow insert land
/// as one critical section with no await point between them. A rotation
/// future dropped before the commit leaves no trace; one dropped after it
/// is fully visible.
pub struct MemoryKeyStore {
    slots: RwLock<HashMap<String, Arc<RwLock<KeyMaterial>>>>,
    max_keys: usize,
}

impl MemoryKeyStore {
    /// Create a store with the default capacity bound.
    pub fn new() -> Self {
        Self::with_capacity(keyward_core::Config::default_config().service.max_stored_keys)
    }

    /// Create a store bounded to `max_keys` entries, shadows included.
    pub fn with_capacity(max_keys: usize) -> Self {
        Self {
            slots: RwLock::new(HashMap::new()),
            max_keys,
        }
    }
}

impl Default for MemoryKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KeyStore for MemoryKeyStore {
    async fn store(&self, material: KeyMaterial) -> CoreResult<()> {
        let mut slots = self.slots.write().await;
        if slots.contains_key(&material.id) {
            return Err(CoreError::StorageFailed(format!(
                "key '{}' already exists",
                material.id
            )));
        }
        if slots.len() >= self.max_keys {
            return Err(CoreError::StorageFailed(format!(
                "key store capacity reached ({} keys)",
                self.max_keys
            )));
        }
        slots.insert(material.id.clone(), Arc::new(RwLock::new(material)));
        Ok(())
    }

    async fn retrieve(&self, id: &str) -> CoreResult<KeyMaterial> {
        let slot = {
            let slots = self.slots.read().await;
            slots
                .get(id)
                .cloned()
                .ok_or_else(|| CoreError::KeyNotFound(id.to_string()))?
        };
        let material = slot.read().await;
        Ok(material.clone())
    }

    async fn delete(&self, id: &str) -> CoreResult<()> {
        let mut slots = self.slots.write().await;
        slots
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::KeyNotFound(id.to_string()))
    }

    async fn list(&self) -> CoreResult<Vec<KeyInfo>> {
        let slots = self.slots.read().await;
        let mut infos = Vec::with_capacity(slots.len());
        for slot in slots.values() {
            let material = slot.read().await;
            infos.push(material.info());
        }
        infos.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(infos)
    }

    async fn update(
        &self,
        id: &str,
        expected_version: u32,
        replacement: KeyMaterial,
    ) -> CoreResult<()> {
        let mut slots = self.slots.write().await;
        let slot = slots
            .get(id)
            .cloned()
            .ok_or_else(|| CoreError::KeyNotFound(id.to_string()))?;

        let mut current = slot.write().await;
        if current.version != expected_version {
            return Err(CoreError::StorageFailed(format!(
                "rotation superseded: key '{id}' is at version {}, expected {expected_version}",
                current.version
            )));
        }

        // Commit: swap in the replacement and shelve the old material under
        // a versioned shadow identifier. No await between these steps.
        let mut old = std::mem::replace(&mut *current, replacement);
        old.status = KeyStatus::Rotated;
        let shadow_id = format!("{id}@v{}", old.version);
        old.id = shadow_id.clone();
        drop(current);
        slots.insert(shadow_id, Arc::new(RwLock::new(old)));
        Ok(())
    }

    async fn set_status(&self, id: &str, status: KeyStatus) -> CoreResult<()> {
        let slot = {
            let slots = self.slots.read().await;
            slots
                .get(id)
                .cloned()
                .ok_or_else(|| CoreError::KeyNotFound(id.to_string()))?
        };
        let mut material = slot.write().await;
        material.status = status;
        Ok(())
    }
}
