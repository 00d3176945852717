//! Capability tier gating across the full stack.
//!
//! A provider granted a narrow tier must refuse wider operations with the
//! stable `NotSupported` code, while the same orchestrator serves a wider
//! provider without restriction.

use std::sync::Arc;

use keyward_core::{OperationKind, OperationRequest, ProtocolError, SecureBuffer};
use keyward_service::{
    BasicCapability, CapabilityProvider, CapabilityTier, CompleteCapability, StandardCapability,
};

use crate::test_utils::{orchestrator, provider};

#[tokio::test]
async fn test_basic_tier_sees_metadata_but_no_crypto() {
    let orch = orchestrator();
    orch.key_manager().generate_key("k1", 256).await.unwrap();
    let basic = CapabilityProvider::new(Arc::clone(&orch), CapabilityTier::Basic);

    basic.ping().await.unwrap();
    let infos = basic.synchronize_keys().await.unwrap();
    assert_eq!(infos.len(), 1);

    assert!(matches!(
        basic.hash(SecureBuffer::from_bytes(b"data")).await,
        Err(ProtocolError::NotSupported(_))
    ));
    assert!(matches!(
        basic.export_key("k1").await,
        Err(ProtocolError::NotSupported(_))
    ));
}

#[tokio::test]
async fn test_standard_tier_cannot_extract_key_material() {
    let standard = provider(CapabilityTier::Standard);
    standard.generate_key("k1", 256).await.unwrap();

    // Standard callers can use the key but never read it.
    let ciphertext = standard
        .encrypt(
            SecureBuffer::from_bytes(b"data"),
            keyward_core::KeyRef::Stored("k1".to_string()),
            None,
        )
        .await
        .unwrap();
    assert!(!ciphertext.is_empty());

    assert!(matches!(
        standard.export_key("k1").await,
        Err(ProtocolError::NotSupported(_))
    ));
    let gated = standard
        .execute(OperationRequest::new(OperationKind::ExportKey).with_key_id("k1"))
        .await;
    assert_eq!(gated.failure().unwrap().0, 2005);
}

#[tokio::test]
async fn test_complete_tier_spans_every_operation() {
    let complete = provider(CapabilityTier::Complete);
    complete.generate_key("k1", 256).await.unwrap();

    let exported = complete.export_key("k1").await.unwrap();
    complete.import_key("k1-copy", exported).await.unwrap();

    let rotated = complete
        .execute(OperationRequest::new(OperationKind::RotateKey).with_key_id("k1"))
        .await;
    assert!(rotated.is_success());

    let infos = complete.synchronize_keys().await.unwrap();
    // k1 (now v2), its rotation shadow, and the copy.
    assert_eq!(infos.len(), 3);
}

#[tokio::test]
async fn test_same_orchestrator_serves_multiple_tiers() {
    let orch = orchestrator();
    let admin = CapabilityProvider::new(Arc::clone(&orch), CapabilityTier::Complete);
    let reader = CapabilityProvider::new(Arc::clone(&orch), CapabilityTier::Basic);

    admin.generate_key("shared", 256).await.unwrap();

    // The basic caller observes the key the complete caller created, but
    // only as metadata.
    let infos = reader.synchronize_keys().await.unwrap();
    assert_eq!(infos[0].id, "shared");
    assert!(matches!(
        reader.export_key("shared").await,
        Err(ProtocolError::NotSupported(_))
    ));
}

#[tokio::test]
async fn test_tier_widening_is_monotonic() {
    let all_kinds = [
        OperationKind::Encrypt,
        OperationKind::Decrypt,
        OperationKind::Hash,
        OperationKind::Hmac,
        OperationKind::VerifyHmac,
        OperationKind::Sign,
        OperationKind::Verify,
        OperationKind::GenerateKey,
        OperationKind::GenerateRandom,
        OperationKind::RotateKey,
        OperationKind::DeleteKey,
        OperationKind::ExportKey,
        OperationKind::ImportKey,
        OperationKind::ListKeys,
        OperationKind::EncryptAsymmetric,
        OperationKind::DecryptAsymmetric,
    ];

    // Whatever a tier supports, every wider tier supports too.
    for kind in all_kinds {
        if CapabilityTier::Basic.supports(kind) {
            assert!(CapabilityTier::Standard.supports(kind));
        }
        if CapabilityTier::Standard.supports(kind) {
            assert!(CapabilityTier::Complete.supports(kind));
        }
        assert!(CapabilityTier::Complete.supports(kind));
    }
}
