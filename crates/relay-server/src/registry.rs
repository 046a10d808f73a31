//! Session registry: which sessions are connected right now.
//!
//! - Key: `SessionId`
//! - Value: the connection's outbound channel plus when it connected.
//!
//! Backed by a `DashMap`, so registration, removal and lookup from many
//! connection tasks only contend on the same shard.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use relay_core::{Deliver, DeliveryStatus, OutboundEvent, SessionId};
use tracing::{debug, info};

use crate::types::OutboundTx;

/// One live client session.
#[derive(Debug, Clone)]
pub struct Connection {
    pub session_id: SessionId,
    pub connected_at: DateTime<Utc>,
    tx: OutboundTx,
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<SessionId, Connection>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        SessionRegistry::default()
    }

    /// Make `session_id` addressable. Replaces any previous entry under
    /// the same id.
    pub fn register(&self, session_id: SessionId, tx: OutboundTx) -> Connection {
        let conn = Connection {
            session_id: session_id.clone(),
            connected_at: Utc::now(),
            tx,
        };
        self.sessions.insert(session_id.clone(), conn.clone());
        info!(session = %session_id, "client connected");
        conn
    }

    /// Remove `session_id`. Returns `false` if it was not registered.
    pub fn deregister(&self, session_id: &SessionId) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(session = %session_id, "client disconnected");
        }
        removed
    }

    pub fn contains(&self, session_id: &SessionId) -> bool {
        self.sessions.contains_key(session_id)
    }

    pub fn connected_at(&self, session_id: &SessionId) -> Option<DateTime<Utc>> {
        self.sessions.get(session_id).map(|c| c.connected_at)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of the currently registered ids.
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl Deliver for SessionRegistry {
    fn deliver(&self, event: OutboundEvent) -> DeliveryStatus {
        // Clone the sender so the shard lock is released before sending.
        let tx = match self.sessions.get(&event.recipient) {
            Some(conn) => conn.tx.clone(),
            None => {
                debug!(session = %event.recipient, event = %event.kind, "no such session");
                return DeliveryStatus::NoSuchSession;
            }
        };

        match tx.send(event) {
            Ok(()) => DeliveryStatus::Delivered,
            Err(err) => {
                // Writer already gone; the connection is tearing down.
                debug!(session = %err.0.recipient, "session closing, dropping event");
                DeliveryStatus::NoSuchSession
            }
        }
    }
}
