//! The delivery seam between the router and a connection registry.

use crate::messages::OutboundEvent;

/// Result of a single delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Handed to the recipient's outbound buffer.
    Delivered,

    /// No live session under that id. Not an error: the event is dropped.
    NoSuchSession,
}

/// Something that can push an event to a connected session.
///
/// Implementations must not block: delivery is a hand-off into the
/// connection's own outbound buffer, and backpressure is the transport's
/// problem. Must be safe to call from many tasks at once.
pub trait Deliver: Send + Sync {
    fn deliver(&self, event: OutboundEvent) -> DeliveryStatus;
}

