// crates/relay-server/tests/relay.rs
//
// End-to-end: real server on an ephemeral port, real WebSocket clients.

use std::net::SocketAddr;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use relay_core::{RouterStats, SessionId};
use relay_server::config::{Config, SOCKET_PATH};
use relay_server::server::serve;
use relay_server::types::AppState;
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, timeout, Instant};
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start(config: Config) -> (SocketAddr, AppState) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(config);
    let served = state.clone();
    tokio::spawn(async move {
        serve(listener, served, std::future::pending()).await.unwrap();
    });
    (addr, state)
}

fn url(addr: SocketAddr) -> String {
    format!("ws://{}{}", addr, SOCKET_PATH)
}

/// Next text frame as JSON, skipping control frames.
async fn next_json(ws: &mut Ws) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("stream ended")
            .expect("read error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert nothing but control frames arrive within `wait`.
async fn assert_silent(ws: &mut Ws, wait: Duration) {
    let deadline = Instant::now() + wait;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match timeout(remaining, ws.next()).await {
            Err(_) => return,
            Ok(Some(Ok(Message::Text(text)))) => panic!("unexpected frame: {}", text.as_str()),
            Ok(Some(Ok(_))) => continue,
            Ok(other) => panic!("connection ended: {other:?}"),
        }
    }
}

/// Connect and consume the handshake; returns the socket and its session id.
async fn connect_client(addr: SocketAddr) -> (Ws, String) {
    let (mut ws, _) = connect_async(url(addr)).await.unwrap();
    let hello = next_json(&mut ws).await;
    assert_eq!(hello[0], "session");
    assert_eq!(hello[1]["protocol"], 1);
    let sid = hello[1]["sid"].as_str().unwrap().to_string();
    (ws, sid)
}

async fn emit(ws: &mut Ws, frame: Value) {
    ws.send(Message::text(frame.to_string())).await.unwrap();
}

async fn wait_for_stats<F: Fn(RouterStats) -> bool>(state: &AppState, pred: F) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while !pred(state.router.stats()) {
        assert!(Instant::now() < deadline, "stats never matched: {:?}", state.router.stats());
        sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn handshake_sid_is_registered() {
    let (addr, state) = start(Config::default()).await;
    let (_ws, sid) = connect_client(addr).await;
    assert!(state.registry.contains(&SessionId::from(sid.as_str())));
}

#[tokio::test]
async fn datasets_counted_reaches_recipient_only() {
    let (addr, _state) = start(Config::default()).await;
    let (mut client_a, sid_a) = connect_client(addr).await;
    let (mut client_b, _sid_b) = connect_client(addr).await;
    let (mut producer, _) = connect_client(addr).await;

    emit(
        &mut producer,
        json!(["datasets_counted_api", { "recipient": sid_a, "count": 7 }]),
    )
    .await;

    assert_eq!(next_json(&mut client_a).await, json!(["datasets_counted", 7]));
    assert_silent(&mut client_b, Duration::from_millis(200)).await;
    assert_silent(&mut producer, Duration::from_millis(50)).await;
}

#[tokio::test]
async fn object_frames_and_all_kinds_are_forwarded() {
    let (addr, _state) = start(Config::default()).await;
    let (mut client, sid) = connect_client(addr).await;
    let (mut producer, _) = connect_client(addr).await;

    let dataset = json!({ "title": "Flood zones", "hits": 2 });
    emit(
        &mut producer,
        json!({ "event": "dataset_analyzed_api", "data": { "recipient": sid, "dataset": dataset } }),
    )
    .await;
    assert_eq!(next_json(&mut client).await, json!(["dataset_analyzed", dataset]));

    for (inbound, outbound) in [
        ("create_fact_sheet_api", "create_fact_sheet"),
        ("create_map_images_api", "create_map_images"),
        ("create_report_api", "create_report"),
    ] {
        emit(&mut producer, json!([inbound, { "recipient": sid }])).await;
        assert_eq!(next_json(&mut client).await, json!([outbound]));
    }
}

#[tokio::test]
async fn unknown_recipient_is_dropped_quietly() {
    let (addr, state) = start(Config::default()).await;
    let (mut client, _sid) = connect_client(addr).await;
    let (mut producer, _) = connect_client(addr).await;

    emit(
        &mut producer,
        json!(["dataset_analyzed_api", { "recipient": "ghost999", "dataset": { "title": "x" } }]),
    )
    .await;

    wait_for_stats(&state, |s| s.offline == 1).await;
    assert_silent(&mut client, Duration::from_millis(100)).await;
}

#[tokio::test]
async fn bad_frames_do_not_break_the_connection() {
    let (addr, state) = start(Config::default()).await;
    let (mut client, sid) = connect_client(addr).await;
    let (mut producer, _) = connect_client(addr).await;

    producer.send(Message::text("not json")).await.unwrap();
    emit(&mut producer, json!(["datasets_counted_api", { "recipient": sid }])).await;
    emit(&mut producer, json!(["create_report_api", {}])).await;
    emit(&mut producer, json!(["something_else", { "recipient": sid }])).await;
    producer.send(Message::binary(vec![1u8, 2, 3])).await.unwrap();
    emit(&mut producer, json!(["create_report_api", { "recipient": sid }])).await;

    assert_eq!(next_json(&mut client).await, json!(["create_report"]));
    wait_for_stats(&state, |s| s.malformed == 2 && s.ignored == 1 && s.delivered == 1).await;
}

#[tokio::test]
async fn disconnected_session_gets_nothing() {
    let (addr, state) = start(Config::default()).await;
    let (mut client, sid) = connect_client(addr).await;
    let (mut producer, _) = connect_client(addr).await;
    let id = SessionId::from(sid.as_str());

    client.close(None).await.unwrap();

    let deadline = Instant::now() + Duration::from_secs(2);
    while state.registry.contains(&id) {
        assert!(Instant::now() < deadline, "session never deregistered");
        sleep(Duration::from_millis(10)).await;
    }

    emit(&mut producer, json!(["create_report_api", { "recipient": sid }])).await;
    wait_for_stats(&state, |s| s.offline == 1 && s.delivered == 0).await;
}

#[tokio::test]
async fn concurrent_producers_never_cross_deliver() {
    let (addr, _state) = start(Config::default()).await;

    let mut clients = Vec::new();
    for _ in 0..4 {
        clients.push(connect_client(addr).await);
    }

    let mut producers = Vec::new();
    for (_, sid) in &clients {
        let sid = sid.clone();
        producers.push(tokio::spawn(async move {
            let (mut producer, _) = connect_client(addr).await;
            for n in 0..10 {
                emit(
                    &mut producer,
                    json!(["dataset_analyzed_api", { "recipient": sid, "dataset": { "for": sid, "n": n } }]),
                )
                .await;
            }
            producer
        }));
    }

    let mut keep_alive = Vec::new();
    for p in producers {
        keep_alive.push(p.await.unwrap());
    }

    for (ws, sid) in clients.iter_mut() {
        for n in 0..10 {
            let frame = next_json(ws).await;
            assert_eq!(frame[0], "dataset_analyzed");
            assert_eq!(frame[1]["for"], Value::String(sid.clone()));
            assert_eq!(frame[1]["n"], n);
        }
    }
}

#[tokio::test]
async fn disallowed_origin_is_rejected() {
    let (addr, state) = start(Config::default()).await;

    let mut req = url(addr).into_client_request().unwrap();
    req.headers_mut()
        .insert("Origin", HeaderValue::from_static("https://example.com"));

    match connect_async(req).await {
        Err(WsError::Http(resp)) => assert_eq!(resp.status(), 403),
        Err(e) => panic!("expected 403, got {e}"),
        Ok(_) => panic!("expected 403, connection was accepted"),
    }
    assert!(state.registry.is_empty());
}

#[tokio::test]
async fn allowed_origin_connects() {
    let (addr, _state) = start(Config::default()).await;

    let mut req = url(addr).into_client_request().unwrap();
    req.headers_mut()
        .insert("Origin", HeaderValue::from_static("http://localhost:5173"));

    let (mut ws, _) = connect_async(req).await.unwrap();
    assert_eq!(next_json(&mut ws).await[0], "session");
}

#[tokio::test]
async fn max_clients_is_enforced() {
    let config = Config {
        max_clients: 1,
        ..Config::default()
    };
    let (addr, _state) = start(config).await;
    let (_first, _) = connect_client(addr).await;

    match connect_async(url(addr)).await {
        Err(WsError::Http(resp)) => assert_eq!(resp.status(), 503),
        Err(e) => panic!("expected 503, got {e}"),
        Ok(_) => panic!("expected 503, connection was accepted"),
    }
}
