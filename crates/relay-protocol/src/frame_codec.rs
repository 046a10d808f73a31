// crates/relay-protocol/src/frame_codec.rs

//! JSON event frames.
//!
//! Every frame is one WebSocket text message holding a JSON document.
//!
//! Outbound (server → client), socket.io event-packet style:
//!
//! - with payload:    `["<event>", <data>]`
//! - without payload: `["<event>"]`
//!
//! Inbound (producer → server), either of:
//!
//! - array form:  `["<event>", <data>]` or `["<event>"]`
//! - object form: `{"event": "<event>", "data": <data>}` (`data` optional)
//!
//! A missing `data` decodes as JSON `null`; the router then reports the
//! event as malformed if its kind needs fields.

use relay_core::{OutboundEvent, SessionId};
use serde_json::{json, Value};
use thiserror::Error;

use crate::wire_types::{validate_event_name_len, Handshake, PROTOCOL_VERSION, SESSION_EVENT};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("not an event frame: {0}")]
    NotAnEventFrame(&'static str),

    #[error("event frame has no event name")]
    MissingEventName,

    #[error("event name too long ({0} bytes)")]
    EventNameTooLong(usize),
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub event: String,
    pub data: Value,
}

/// Decode one inbound text frame.
pub fn decode_frame(text: &str) -> Result<EventFrame, ProtocolError> {
    let doc: Value = serde_json::from_str(text)?;

    let (event, data) = match doc {
        Value::Array(items) => {
            let mut items = items.into_iter();
            let event = match items.next() {
                Some(Value::String(name)) => name,
                Some(_) => return Err(ProtocolError::NotAnEventFrame("first element must be a string")),
                None => return Err(ProtocolError::MissingEventName),
            };
            let data = items.next().unwrap_or(Value::Null);
            if items.next().is_some() {
                return Err(ProtocolError::NotAnEventFrame("more than one data element"));
            }
            (event, data)
        }
        Value::Object(mut map) => {
            let event = match map.remove("event") {
                Some(Value::String(name)) => name,
                Some(_) => return Err(ProtocolError::NotAnEventFrame("`event` must be a string")),
                None => return Err(ProtocolError::MissingEventName),
            };
            let data = map.remove("data").unwrap_or(Value::Null);
            (event, data)
        }
        _ => return Err(ProtocolError::NotAnEventFrame("expected an array or object")),
    };

    if event.is_empty() {
        return Err(ProtocolError::MissingEventName);
    }
    if !validate_event_name_len(event.len()) {
        return Err(ProtocolError::EventNameTooLong(event.len()));
    }

    Ok(EventFrame { event, data })
}

/// Encode a named event, optionally with a payload.
pub fn encode_event(event: &str, data: Option<&Value>) -> String {
    match data {
        Some(data) => json!([event, data]).to_string(),
        None => json!([event]).to_string(),
    }
}

/// Encode an outbound event for its recipient's socket.
pub fn encode_outbound(event: &OutboundEvent) -> String {
    encode_event(event.kind.wire_name(), event.payload.as_ref())
}

/// Encode the handshake frame announcing `sid` to a freshly connected client.
pub fn encode_handshake(sid: &SessionId) -> String {
    let handshake = Handshake {
        sid: sid.to_string(),
        protocol: PROTOCOL_VERSION,
    };
    // Handshake is two plain fields; serialization cannot fail.
    let data = serde_json::to_value(handshake).unwrap_or(Value::Null);
    encode_event(SESSION_EVENT, Some(&data))
}
