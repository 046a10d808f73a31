//! relay-protocol
//!
//! Wire-level encoding/decoding for the event relay.
//!
//! Turns WebSocket text frames into `(event name, data)` pairs for the
//! router, and `relay_core::OutboundEvent`s back into text frames.
//!
//! - [`wire_types`]  : protocol constants and the handshake payload
//! - [`frame_codec`] : JSON event frames

pub mod wire_types;
pub mod frame_codec;

pub use frame_codec::{
    ProtocolError,
    EventFrame,
    decode_frame,
    encode_event,
    encode_outbound,
    encode_handshake,
};
