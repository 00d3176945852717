//! End-to-end dispatch through the orchestrator.
//!
//! Exercises the full pipeline per operation kind: request validation, key
//! resolution against the store, the crypto engine, and result
//! normalization with stable failure codes.

use keyward_core::{KeyRef, OperationKind, OperationRequest, SecureBuffer};
use keyward_crypto::{CryptoEngine, MIN_FRAME_SIZE};

use crate::test_utils::orchestrator;

#[tokio::test]
async fn test_symmetric_round_trip_with_aad() {
    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    let ciphertext = orch
        .operation(
            OperationRequest::new(OperationKind::Encrypt)
                .with_input(SecureBuffer::from_bytes(b"document body"))
                .with_aad(SecureBuffer::from_bytes(b"document-id:42"))
                .with_key_id("vault"),
        )
        .await
        .data()
        .unwrap()
        .clone();

    // The frame carries nonce and tag on top of the plaintext.
    assert_eq!(ciphertext.len(), b"document body".len() + MIN_FRAME_SIZE);

    let plaintext = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(ciphertext.clone())
                .with_aad(SecureBuffer::from_bytes(b"document-id:42"))
                .with_key_id("vault"),
        )
        .await;
    assert_eq!(plaintext.data().unwrap().as_bytes(), b"document body");

    // Same frame, wrong AAD: authentication must fail with the decryption code.
    let wrong_aad = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(ciphertext)
                .with_aad(SecureBuffer::from_bytes(b"document-id:43"))
                .with_key_id("vault"),
        )
        .await;
    assert_eq!(wrong_aad.failure().unwrap().0, 1003);
}

#[tokio::test]
async fn test_empty_plaintext_produces_minimum_frame() {
    let orch = orchestrator();
    orch.key_manager().generate_key("vault", 256).await.unwrap();

    let ciphertext = orch
        .operation(
            OperationRequest::new(OperationKind::Encrypt)
                .with_input(SecureBuffer::empty())
                .with_key_id("vault"),
        )
        .await
        .data()
        .unwrap()
        .clone();
    assert_eq!(ciphertext.len(), MIN_FRAME_SIZE);

    let plaintext = orch
        .operation(
            OperationRequest::new(OperationKind::Decrypt)
                .with_input(ciphertext)
                .with_key_id("vault"),
        )
        .await;
    assert!(plaintext.data().unwrap().is_empty());
}

#[tokio::test]
async fn test_hash_matches_known_vector() {
    let orch = orchestrator();

    let digest = orch
        .operation(
            OperationRequest::new(OperationKind::Hash).with_input(SecureBuffer::from_bytes(b"abc")),
        )
        .await
        .data()
        .unwrap()
        .clone();

    // SHA-256("abc")
    assert_eq!(
        hex::encode(digest.as_bytes()),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[tokio::test]
async fn test_sign_and_verify_detects_tampering() {
    let orch = orchestrator();
    let keypair = CryptoEngine::new().generate_signing_keypair().unwrap();

    let signature = orch
        .operation(
            OperationRequest::new(OperationKind::Sign)
                .with_input(SecureBuffer::from_bytes(b"release manifest"))
                .with_key(KeyRef::Embedded(keypair.secret.clone())),
        )
        .await
        .data()
        .unwrap()
        .clone();

    let genuine = orch
        .operation(
            OperationRequest::new(OperationKind::Verify)
                .with_input(SecureBuffer::from_bytes(b"release manifest"))
                .with_verification(signature.clone())
                .with_key(KeyRef::Embedded(SecureBuffer::from_bytes(&keypair.public))),
        )
        .await;
    assert_eq!(genuine.verified(), Some(true));

    let tampered = orch
        .operation(
            OperationRequest::new(OperationKind::Verify)
                .with_input(SecureBuffer::from_bytes(b"release manifesto"))
                .with_verification(signature)
                .with_key(KeyRef::Embedded(SecureBuffer::from_bytes(&keypair.public))),
        )
        .await;
    assert_eq!(tampered.verified(), Some(false));
}

#[tokio::test]
async fn test_sealed_box_round_trip_across_dispatch() {
    let orch = orchestrator();
    let keypair = CryptoEngine::new().generate_asymmetric_keypair().unwrap();

    let sealed = orch
        .operation(
            OperationRequest::new(OperationKind::EncryptAsymmetric)
                .with_input(SecureBuffer::from_bytes(b"for your eyes only"))
                .with_key(KeyRef::Embedded(SecureBuffer::from_bytes(&keypair.public))),
        )
        .await
        .data()
        .unwrap()
        .clone();

    let opened = orch
        .operation(
            OperationRequest::new(OperationKind::DecryptAsymmetric)
                .with_input(sealed)
                .with_key(KeyRef::Embedded(keypair.secret.clone())),
        )
        .await;
    assert_eq!(opened.data().unwrap().as_bytes(), b"for your eyes only");
}

#[tokio::test]
async fn test_key_lifecycle_through_dispatch() {
    let orch = orchestrator();

    let generated = orch
        .operation(
            OperationRequest::new(OperationKind::GenerateKey)
                .with_key_id("cycle")
                .with_key_size_bits(256),
        )
        .await;
    assert!(generated.is_success());

    let exported = orch
        .operation(OperationRequest::new(OperationKind::ExportKey).with_key_id("cycle"))
        .await
        .data()
        .unwrap()
        .clone();
    assert_eq!(exported.len(), 32);

    let deleted = orch
        .operation(OperationRequest::new(OperationKind::DeleteKey).with_key_id("cycle"))
        .await;
    assert!(deleted.is_success());

    let gone = orch
        .operation(OperationRequest::new(OperationKind::ExportKey).with_key_id("cycle"))
        .await;
    assert_eq!(gone.failure().unwrap().0, 1005);
}

#[tokio::test]
async fn test_generate_random_is_nontrivial() {
    let orch = orchestrator();

    let a = orch
        .operation(OperationRequest::new(OperationKind::GenerateRandom).with_option("length", "32"))
        .await
        .data()
        .unwrap()
        .clone();
    let b = orch
        .operation(OperationRequest::new(OperationKind::GenerateRandom).with_option("length", "32"))
        .await
        .data()
        .unwrap()
        .clone();

    assert_eq!(a.len(), 32);
    assert_eq!(b.len(), 32);
    assert_ne!(a, b);
}

#[tokio::test]
async fn test_malformed_requests_never_panic() {
    let orch = orchestrator();

    // Every kind with a completely empty request: always a typed failure,
    // never a panic or a hang.
    let kinds = [
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
        OperationKind::EncryptAsymmetric,
        OperationKind::DecryptAsymmetric,
    ];
    for kind in kinds {
        let result = orch.operation(OperationRequest::new(kind)).await;
        let (code, _) = result.failure().unwrap_or_else(|| {
            panic!("empty '{}' request must fail", kind.as_str());
        });
        assert_eq!(code, 1001, "empty '{}' request", kind.as_str());
    }

    // ListKeys is the one kind that needs no parameters at all.
    let listed = orch
        .operation(OperationRequest::new(OperationKind::ListKeys))
        .await;
    assert!(listed.is_success());
}
