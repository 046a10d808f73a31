// crates/relay-server/tests/registry.rs
use std::sync::Arc;

use relay_core::{Deliver, DeliveryStatus, EventRouter, OutboundEvent, OutboundKind, RouteOutcome, SessionId};
use relay_server::registry::SessionRegistry;
use serde_json::json;
use tokio::sync::mpsc;

fn event(kind: OutboundKind, to: &str, payload: Option<serde_json::Value>) -> OutboundEvent {
    OutboundEvent {
        kind,
        recipient: SessionId::from(to),
        payload,
    }
}

#[test]
fn register_makes_session_addressable() {
    let reg = SessionRegistry::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let conn = reg.register(SessionId::from("abc123"), tx);
    assert_eq!(conn.session_id, SessionId::from("abc123"));
    assert!(reg.contains(&SessionId::from("abc123")));
    assert_eq!(reg.connected_at(&SessionId::from("abc123")), Some(conn.connected_at));
    assert_eq!(reg.len(), 1);

    let status = reg.deliver(event(OutboundKind::DatasetsCounted, "abc123", Some(json!(7))));
    assert_eq!(status, DeliveryStatus::Delivered);

    let got = rx.try_recv().unwrap();
    assert_eq!(got.kind, OutboundKind::DatasetsCounted);
    assert_eq!(got.payload, Some(json!(7)));
}

#[test]
fn unknown_session_is_a_silent_no_op() {
    let reg = SessionRegistry::new();
    let status = reg.deliver(event(OutboundKind::CreateReport, "ghost999", None));
    assert_eq!(status, DeliveryStatus::NoSuchSession);
    assert!(reg.is_empty());
}

#[test]
fn deregister_is_idempotent() {
    let reg = SessionRegistry::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let id = SessionId::from("abc123");

    reg.register(id.clone(), tx);
    assert!(reg.deregister(&id));
    assert!(!reg.deregister(&id));
    assert!(!reg.contains(&id));

    let status = reg.deliver(event(OutboundKind::CreateReport, "abc123", None));
    assert_eq!(status, DeliveryStatus::NoSuchSession);
    assert!(rx.try_recv().is_err());
}

#[test]
fn closed_channel_counts_as_no_session() {
    let reg = SessionRegistry::new();
    let (tx, rx) = mpsc::unbounded_channel();
    reg.register(SessionId::from("abc123"), tx);
    drop(rx);

    let status = reg.deliver(event(OutboundKind::CreateMapImages, "abc123", None));
    assert_eq!(status, DeliveryStatus::NoSuchSession);
}

#[test]
fn session_ids_snapshot() {
    let reg = SessionRegistry::new();
    let (tx, _rx) = mpsc::unbounded_channel();
    reg.register(SessionId::from("a"), tx.clone());
    reg.register(SessionId::from("b"), tx);

    let mut ids = reg.session_ids();
    ids.sort();
    assert_eq!(ids, vec![SessionId::from("a"), SessionId::from("b")]);
}

#[tokio::test]
async fn router_over_registry_targets_one_session() {
    let reg = Arc::new(SessionRegistry::new());
    let router = EventRouter::new(reg.clone());

    let (tx_a, mut rx_a) = mpsc::unbounded_channel();
    let (tx_b, mut rx_b) = mpsc::unbounded_channel();
    reg.register(SessionId::from("abc123"), tx_a);
    reg.register(SessionId::from("def456"), tx_b);

    let outcome = router.route("datasets_counted_api", json!({ "recipient": "abc123", "count": 7 }));
    assert_eq!(outcome, RouteOutcome::Delivered);

    let got = rx_a.recv().await.unwrap();
    assert_eq!(got.kind.wire_name(), "datasets_counted");
    assert_eq!(got.payload, Some(json!(7)));
    assert!(rx_b.try_recv().is_err());
}

#[tokio::test]
async fn per_session_order_is_preserved() {
    let reg = Arc::new(SessionRegistry::new());
    let router = EventRouter::new(reg.clone());
    let (tx, mut rx) = mpsc::unbounded_channel();
    reg.register(SessionId::from("abc123"), tx);

    for n in 0..20 {
        router.route(
            "dataset_analyzed_api",
            json!({ "recipient": "abc123", "dataset": { "n": n } }),
        );
    }

    for n in 0..20 {
        let got = rx.recv().await.unwrap();
        assert_eq!(got.payload, Some(json!({ "n": n })));
    }
}
