//! Shared types for the relay server.
//!
//! This module defines:
//! - channel aliases between the router and each connection's writer
//! - `AppState`: what every axum handler gets

use std::sync::Arc;

use relay_core::{EventRouter, OutboundEvent};
use tokio::sync::mpsc;

use crate::config::Config;
use crate::registry::SessionRegistry;

/// Outbound events queued for one connection.
pub type OutboundTx = mpsc::UnboundedSender<OutboundEvent>;
pub type OutboundRx = mpsc::UnboundedReceiver<OutboundEvent>;

pub type RelayRouter = EventRouter<SessionRegistry>;

/// State shared by all HTTP and WebSocket handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SessionRegistry>,
    pub router: Arc<RelayRouter>,
}

impl AppState {
    /// Build the registry and router once, for the lifetime of the server.
    pub fn new(config: Config) -> Self {
        let registry = Arc::new(SessionRegistry::new());
        let router = Arc::new(EventRouter::new(registry.clone()));
        AppState {
            config: Arc::new(config),
            registry,
            router,
        }
    }
}
