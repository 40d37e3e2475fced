//! End-to-end negotiation flows over a recording transport.

use mirror_capability::{CapabilityName, CapabilityValue, DefaultPolicy, SharedCapabilities};
use mirror_core::position::ChunkPos;
use mirror_core::MirrorError;
use mirror_protocol::transport::testing::RecordingTransport;
use mirror_protocol::{NegotiationEngine, NegotiationState};

fn engine() -> (NegotiationEngine<RecordingTransport>, SharedCapabilities) {
    let caps = SharedCapabilities::new(DefaultPolicy::Permissive);
    let engine = NegotiationEngine::new(RecordingTransport::new(), caps.clone(), "0.1.0");
    (engine, caps)
}

#[test]
fn handshake_reaches_negotiated_on_first_payload() {
    let (mut engine, caps) = engine();
    assert_eq!(engine.state(), NegotiationState::Uninitiated);

    engine.start().unwrap();
    assert_eq!(engine.state(), NegotiationState::Handshaking);

    engine.on_receive(br#"{"kind":"grant","values":{"saveEntities":false,"saveRadius":8}}"#);
    assert_eq!(engine.state(), NegotiationState::Negotiated);
    assert!(!caps.read(|set| set.query_bool("saveEntities")));
    assert_eq!(caps.read(|set| set.query_int("saveRadius")), Some(8));
}

#[test]
fn malformed_payload_changes_nothing() {
    let (mut engine, caps) = engine();
    engine.start().unwrap();
    engine.on_receive(br#"{"kind":"grant","values":{"saveEntities":false}}"#);

    let before = caps.read(|set| set.clone());
    let state_before = engine.state();

    engine.on_receive(b"\xffdefinitely not json");
    engine.on_receive(br#"{"kind":"grant"}"#);
    engine.on_receive(br#"{"kind":"mystery","values":{}}"#);

    assert_eq!(engine.state(), state_before);
    assert_eq!(caps.read(|set| set.clone()), before);
}

#[test]
fn renegotiation_returns_on_any_payload() {
    let (mut engine, caps) = engine();
    engine.start().unwrap();
    engine.on_receive(br#"{"kind":"grant","values":{}}"#);
    assert_eq!(engine.state(), NegotiationState::Negotiated);

    caps.enqueue_request(
        CapabilityName::from("saveRadius"),
        CapabilityValue::Int(32),
    );
    engine.send_requests().unwrap();
    assert_eq!(engine.state(), NegotiationState::Renegotiating);
    assert!(caps.pending_requests().is_empty());

    // An unrelated override payload still settles the session.
    engine.on_receive(
        br#"{"kind":"override","entries":[
            {"chunkX":0,"chunkZ":0,"capability":"downloadInGeneral","value":false}
        ]}"#,
    );
    assert_eq!(engine.state(), NegotiationState::Negotiated);
    assert_eq!(
        caps.read(|set| set.region_override(ChunkPos::new(0, 0), "downloadInGeneral")),
        Some(false)
    );
}

#[test]
fn transport_failure_keeps_requests_queued() {
    let caps = SharedCapabilities::new(DefaultPolicy::Permissive);
    let transport = RecordingTransport {
        offline: true,
        ..Default::default()
    };
    let mut engine = NegotiationEngine::new(transport, caps.clone(), "0.1.0");

    // Transport failures surface as the workspace's protocol error.
    let err = engine.start().unwrap_err();
    assert!(matches!(err, MirrorError::Protocol { .. }));
    assert_eq!(engine.state(), NegotiationState::Uninitiated);

    caps.enqueue_request(
        CapabilityName::from("saveEntities"),
        CapabilityValue::Bool(true),
    );
    assert!(engine.send_requests().is_err());
    assert_eq!(caps.pending_requests().len(), 1);
}

#[test]
fn closed_session_ignores_payloads() {
    let (mut engine, caps) = engine();
    engine.start().unwrap();
    engine.on_receive(br#"{"kind":"grant","values":{}}"#);
    engine.close();

    engine.on_receive(br#"{"kind":"grant","values":{"saveEntities":false}}"#);
    assert!(caps.read(|set| set.query_bool("saveEntities")));
    assert_eq!(engine.state(), NegotiationState::Closed);
}

#[test]
fn reset_payload_voids_prior_grants() {
    let (mut engine, caps) = engine();
    engine.start().unwrap();
    engine.on_receive(br#"{"kind":"grant","values":{"saveEntities":false}}"#);
    assert!(!caps.read(|set| set.query_bool("saveEntities")));

    engine.on_receive(br#"{"kind":"reset"}"#);
    assert!(caps.read(|set| set.query_bool("saveEntities")));
    assert!(!caps.read(|set| set.has_negotiated()));
}
