//! The JSON wire contract at the transport boundary.
//!
//! Simulates a transport collaborator: requests arrive as JSON, cross into
//! typed form, run through the orchestrator, and return as JSON, with
//! transport-layer failures normalized into the standard failure shape.

use keyward_core::{OperationKind, OperationRequest, SecureBuffer, TransportError};
use keyward_service::{failure_from_transport, SecurityOrchestrator, WireRequest, WireResult};

use crate::test_utils::orchestrator;

/// Drive one JSON request through decode, dispatch, and encode.
async fn serve_json(orch: &SecurityOrchestrator, request_json: &str) -> String {
    let result = match serde_json::from_str::<WireRequest>(request_json) {
        Ok(wire) => match wire.into_request() {
            Ok(request) => orch.operation(request).await,
            Err(err) => failure_from_transport(err),
        },
        Err(err) => failure_from_transport(TransportError::SerializationFailed(err.to_string())),
    };
    serde_json::to_string(&WireResult::from_result(&result)).unwrap()
}

#[tokio::test]
async fn test_json_round_trip_for_symmetric_crypto() {
    let orch = orchestrator();
    orch.key_manager().generate_key("wire", 256).await.unwrap();

    let request = format!(
        r#"{{"operation":"encrypt","input_hex":"{}","key_id":"wire"}}"#,
        hex::encode(b"over the wire")
    );
    let response: WireResult = serde_json::from_str(&serve_json(&orch, &request).await).unwrap();
    assert!(response.success);
    let ciphertext_hex = response.data_hex.unwrap();

    let request = format!(
        r#"{{"operation":"decrypt","input_hex":"{ciphertext_hex}","key_id":"wire"}}"#
    );
    let response: WireResult = serde_json::from_str(&serve_json(&orch, &request).await).unwrap();
    assert!(response.success);
    assert_eq!(
        hex::decode(response.data_hex.unwrap()).unwrap(),
        b"over the wire"
    );
}

#[tokio::test]
async fn test_unparseable_json_yields_standard_failure_shape() {
    let orch = orchestrator();

    let response: WireResult =
        serde_json::from_str(&serve_json(&orch, "{not json").await).unwrap();
    assert!(!response.success);
    assert_eq!(response.code, Some(1001));
    assert!(response.data_hex.is_none());
}

#[tokio::test]
async fn test_unknown_operation_name_is_a_serialization_failure() {
    let orch = orchestrator();

    let response: WireResult = serde_json::from_str(
        &serve_json(&orch, r#"{"operation":"transmogrify"}"#).await,
    )
    .unwrap();
    assert!(!response.success);
    assert_eq!(response.code, Some(1001));
}

#[tokio::test]
async fn test_failure_codes_survive_the_wire() {
    let orch = orchestrator();

    let response: WireResult = serde_json::from_str(
        &serve_json(
            &orch,
            r#"{"operation":"export_key","key_id":"missing"}"#,
        )
        .await,
    )
    .unwrap();
    assert!(!response.success);
    assert_eq!(response.code, Some(1005));
    assert!(response.message.unwrap().contains("missing"));
}

#[tokio::test]
async fn test_verification_verdict_crosses_the_wire() {
    let orch = orchestrator();
    orch.key_manager().generate_key("mac", 256).await.unwrap();

    let mac = orch
        .operation(
            OperationRequest::new(OperationKind::Hmac)
                .with_input(SecureBuffer::from_bytes(b"payload"))
                .with_key_id("mac"),
        )
        .await
        .data()
        .unwrap()
        .clone();

    let request = format!(
        r#"{{"operation":"verify_hmac","input_hex":"{}","verification_hex":"{}","key_id":"mac"}}"#,
        hex::encode(b"payload"),
        hex::encode(mac.as_bytes())
    );
    let response: WireResult = serde_json::from_str(&serve_json(&orch, &request).await).unwrap();
    assert!(response.success);
    assert_eq!(response.verified, Some(true));
    assert!(response.data_hex.is_none());
}

#[tokio::test]
async fn test_transport_failures_normalize_to_internal_codes() {
    for (err, expected) in [
        (TransportError::Disconnected("peer gone".to_string()), 1008),
        (TransportError::Timeout("deadline".to_string()), 1008),
        (
            TransportError::SerializationFailed("bad frame".to_string()),
            1001,
        ),
        (
            TransportError::ServiceUnavailable("draining".to_string()),
            1008,
        ),
        (TransportError::Internal("bug".to_string()), 1008),
    ] {
        let result = failure_from_transport(err);
        assert_eq!(result.failure().unwrap().0, expected);
    }
}
