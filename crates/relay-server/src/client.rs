// crates/relay-server/src/client.rs

//! Per-connection task.
//!
//! Every socket is a session: browser clients mostly listen, producers
//! mostly send, but the server treats both the same way. A session is
//! registered for exactly as long as this task runs.

use anyhow::Result;
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use relay_core::{RouteOutcome, SessionId};
use relay_protocol::{decode_frame, encode_handshake, encode_outbound};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::{AppState, OutboundRx, OutboundTx, RelayRouter};

fn next_session_id() -> SessionId {
    SessionId::new(Uuid::new_v4().simple().to_string())
}

/// Run the I/O loops for a single upgraded socket until either side ends.
pub async fn run_client(socket: WebSocket, state: AppState) {
    let session_id = next_session_id();
    let (out_tx, out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();
    let (sink, stream) = socket.split();

    state.registry.register(session_id.clone(), out_tx);

    // Writer task: handshake first, then queued events and keepalive pings.
    let mut writer = tokio::spawn(run_writer(
        session_id.clone(),
        sink,
        out_rx,
        state.config.ping_interval,
    ));

    tokio::select! {
        res = run_reader(&session_id, stream, &state.router) => {
            if let Err(e) = res {
                warn!(session = %session_id, error = %e, "read error");
            }
        }
        res = &mut writer => {
            match res {
                Ok(Err(e)) => warn!(session = %session_id, error = %e, "write error"),
                Err(e) => warn!(session = %session_id, error = %e, "writer task failed"),
                Ok(Ok(())) => {}
            }
        }
    }

    state.registry.deregister(&session_id);
    writer.abort();
}

async fn run_reader(
    session_id: &SessionId,
    mut stream: SplitStream<WebSocket>,
    router: &RelayRouter,
) -> Result<()> {
    while let Some(msg) = stream.next().await {
        match msg? {
            Message::Text(text) => handle_text(session_id, text.as_str(), router),
            Message::Binary(bytes) => {
                debug!(session = %session_id, len = bytes.len(), "ignoring binary frame");
            }
            Message::Close(_) => break,
            // Pong replies are queued by the transport itself.
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    Ok(())
}

fn handle_text(session_id: &SessionId, text: &str, router: &RelayRouter) {
    let frame = match decode_frame(text) {
        Ok(frame) => frame,
        Err(e) => {
            warn!(session = %session_id, error = %e, "dropping undecodable frame");
            return;
        }
    };

    let outcome = router.route(&frame.event, frame.data);
    if !matches!(outcome, RouteOutcome::Delivered) {
        debug!(session = %session_id, event = %frame.event, ?outcome, "event not delivered");
    }
}

async fn run_writer(
    session_id: SessionId,
    mut sink: SplitSink<WebSocket, Message>,
    mut out_rx: OutboundRx,
    ping_interval: Duration,
) -> Result<()> {
    sink.send(Message::Text(encode_handshake(&session_id).into())).await?;

    let mut ping = interval(ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately.
    ping.tick().await;

    loop {
        tokio::select! {
            maybe_event = out_rx.recv() => {
                let Some(event) = maybe_event else { break };
                sink.send(Message::Text(encode_outbound(&event).into())).await?;
            }
            _ = ping.tick() => {
                sink.send(Message::Ping(Bytes::new())).await?;
            }
        }
    }

    // Sender side closed: nothing more will be queued for this session.
    let _ = sink.close().await;
    Ok(())
}
