//! Error types for the relay core.
//!
//! Only malformed producer input is an error. An offline recipient is a
//! normal outcome (see [`crate::DeliveryStatus`]) and transport failures
//! belong to the server crate.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The inbound payload is missing a required field or has the wrong shape.
    #[error("malformed `{event}` event: {reason}")]
    MalformedEvent {
        event: &'static str,
        reason: String,
    },
}

impl RelayError {
    pub(crate) fn malformed(event: &'static str, reason: impl Into<String>) -> Self {
        RelayError::MalformedEvent {
            event,
            reason: reason.into(),
        }
    }
}
