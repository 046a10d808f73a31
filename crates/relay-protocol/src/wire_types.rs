//! Low-level wire constants.

use serde::{Deserialize, Serialize};

/// Current protocol version, announced in the handshake.
pub const PROTOCOL_VERSION: u8 = 1;

/// Name of the first frame a client receives after connecting.
///
/// Carries the session id the client must hand to the backend as
/// `recipient` so progress events find their way back.
pub const SESSION_EVENT: &str = "session";

/// Upper bound on an event name. Anything longer is not one of ours.
pub const MAX_EVENT_NAME_LEN: usize = 64;

/// Payload of the [`SESSION_EVENT`] frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Handshake {
    pub sid: String,
    pub protocol: u8,
}

pub fn validate_event_name_len(len: usize) -> bool {
    len > 0 && len <= MAX_EVENT_NAME_LEN
}
