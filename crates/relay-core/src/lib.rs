//! relay-core
//!
//! Pure relay logic, no networking:
//! - session ids
//! - inbound/outbound event kinds and the static routing table
//! - typed inbound payload decoding
//! - the `Deliver` seam a connection registry implements
//! - the stateless event router

pub mod session;
pub mod event_kind;
pub mod messages;
pub mod deliver;
pub mod router;
pub mod error;

pub use session::SessionId;
pub use event_kind::{InboundKind, OutboundKind};

pub use messages::{
    InboundEvent,
    InboundPayload,
    OutboundEvent,
};

pub use deliver::{Deliver, DeliveryStatus};
pub use router::{EventRouter, RouteOutcome, RouterStats};
pub use error::RelayError;
