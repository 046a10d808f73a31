//! Stateless event router.
//!
//! The router owns no per-session state. For each inbound event it:
//! - resolves the event name through the static kind table,
//! - decodes the payload for that kind,
//! - projects it to the outbound event,
//! - hands it to the registry exactly once.
//!
//! Unknown names are ignored, malformed payloads are logged and dropped.
//! Nothing here can fail the caller: one bad event never affects the next.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

use crate::deliver::{Deliver, DeliveryStatus};
use crate::error::RelayError;
use crate::event_kind::InboundKind;
use crate::messages::InboundEvent;

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Forwarded to a live session.
    Delivered,

    /// Well-formed, but the recipient is not connected. Dropped.
    RecipientOffline,

    /// Not one of the recognized inbound event names.
    Ignored,

    /// Recognized name, unusable payload. Dropped.
    Malformed(RelayError),
}

/// Snapshot of router counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    pub delivered: u64,
    pub offline: u64,
    pub malformed: u64,
    pub ignored: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    offline: AtomicU64,
    malformed: AtomicU64,
    ignored: AtomicU64,
}

/// Routes producer events to their recipients through a [`Deliver`] registry.
#[derive(Debug)]
pub struct EventRouter<D> {
    registry: Arc<D>,
    counters: Counters,
}

impl<D: Deliver> EventRouter<D> {
    pub fn new(registry: Arc<D>) -> Self {
        EventRouter {
            registry,
            counters: Counters::default(),
        }
    }

    /// Route a raw `(name, data)` pair as received from the wire.
    pub fn route(&self, name: &str, data: Value) -> RouteOutcome {
        let Some(kind) = InboundKind::from_wire_name(name) else {
            debug!(event = name, "ignoring unrecognized event");
            self.counters.ignored.fetch_add(1, Ordering::Relaxed);
            return RouteOutcome::Ignored;
        };

        let event = match InboundEvent::decode(kind, data) {
            Ok(event) => event,
            Err(err) => {
                warn!(event = name, error = %err, "dropping malformed event");
                self.counters.malformed.fetch_add(1, Ordering::Relaxed);
                return RouteOutcome::Malformed(err);
            }
        };

        match self.dispatch(event) {
            DeliveryStatus::Delivered => RouteOutcome::Delivered,
            DeliveryStatus::NoSuchSession => RouteOutcome::RecipientOffline,
        }
    }

    /// Forward an already-decoded event.
    pub fn dispatch(&self, event: InboundEvent) -> DeliveryStatus {
        let outbound = event.project();
        let kind = outbound.kind;
        let recipient = outbound.recipient.clone();

        let status = self.registry.deliver(outbound);
        match status {
            DeliveryStatus::Delivered => {
                trace!(event = %kind, recipient = %recipient, "delivered");
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            DeliveryStatus::NoSuchSession => {
                debug!(event = %kind, recipient = %recipient, "recipient not connected, dropping");
                self.counters.offline.fetch_add(1, Ordering::Relaxed);
            }
        }
        status
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            offline: self.counters.offline.load(Ordering::Relaxed),
            malformed: self.counters.malformed.load(Ordering::Relaxed),
            ignored: self.counters.ignored.load(Ordering::Relaxed),
        }
    }
}
