//! Key rotation atomicity under concurrent callers.

use std::sync::Arc;

use keyward_core::{CoreError, OperationKind, OperationRequest, SecureBuffer};

use crate::test_utils::orchestrator;

#[tokio::test]
async fn test_rotation_keeps_old_ciphertext_readable_via_shadow() {
    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    let ciphertext = orch
        .operation(
            OperationRequest::new(OperationKind::Encrypt)
                .with_input(SecureBuffer::from_bytes(b"pre-rotation data"))
                .with_key_id("vault"),
        )
        .await
        .data()
        .unwrap()
        .clone();

    orch.key_manager().rotate_key("vault", None).await.unwrap();

    // The active key changed, so the old frame no longer opens under it.
    let stale = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(ciphertext.clone())
                .with_key_id("vault"),
        )
        .await;
    assert_eq!(stale.failure().unwrap().0, 1003);

    // The rotation shadow still opens it.
    let shadowed = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(ciphertext)
                .with_key_id("vault@v1"),
        )
        .await;
    assert_eq!(shadowed.data().unwrap().as_bytes(), b"pre-rotation data");
}

#[tokio::test]
async fn test_rotation_with_reencryption_moves_data_forward() {
    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    let ciphertext = orch
        .operation(
            OperationRequest::new(OperationKind::Encrypt)
                .with_input(SecureBuffer::from_bytes(b"long-lived record"))
                .with_key_id("vault"),
        )
        .await
        .data()
        .unwrap()
        .clone();

    let rewrapped = orch
        .operation(
            OperationRequest::new(OperationKind::RotateKey)
                .with_input(ciphertext)
                .with_key_id("vault"),
        )
        .await
        .data()
        .unwrap()
        .clone();

    let plaintext = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(rewrapped)
                .with_key_id("vault"),
        )
        .await;
    assert_eq!(plaintext.data().unwrap().as_bytes(), b"long-lived record");
}

#[tokio::test]
async fn test_concurrent_rotations_through_dispatch_commit_once_per_version() {
    const CALLERS: usize = 8;

    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..CALLERS {
        let orch = Arc::clone(&orch);
        handles.push(tokio::spawn(async move {
            orch.operation(OperationRequest::new(OperationKind::RotateKey).with_key_id("vault"))
                .await
        }));
    }

    let mut committed = 0;
    for handle in handles {
        let result = handle.await.unwrap();
        match result.failure() {
            None => committed += 1,
            Some((1008, _)) => {} // lost the compare-and-swap race
            Some((code, message)) => panic!("unexpected rotation failure {code}: {message}"),
        }
    }
    assert!(committed >= 1, "at least one rotation must commit");

    // Every commit bumped the version by exactly one; losers left no trace.
    let infos = orch.key_manager().list_keys().await.unwrap();
    let active = infos.iter().find(|i| i.id == "vault").unwrap();
    assert_eq!(active.version as usize, 1 + committed);

    let shadows = infos.iter().filter(|i| i.id.starts_with("vault@")).count();
    assert_eq!(shadows, committed);
}

#[tokio::test]
async fn test_failed_rotation_leaves_key_usable() {
    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    // A rotation asked to re-encrypt garbage must abort without committing.
    let aborted = orch
        .key_manager()
        .rotate_key("vault", Some(b"garbage"))
        .await;
    assert!(matches!(aborted, Err(CoreError::DecryptionFailed(_))));

    let round_trip = orch
        .operation(
            OperationRequest::new(OperationKind::Encrypt)
                .with_input(SecureBuffer::from_bytes(b"still fine"))
                .with_key_id("vault"),
        )
        .await;
    assert!(round_trip.is_success());

    let infos = orch.key_manager().list_keys().await.unwrap();
    assert_eq!(infos.len(), 1);
    assert_eq!(infos[0].version, 1);
}
