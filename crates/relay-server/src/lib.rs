//! relay-server
//!
//! WebSocket event relay: producers and browser clients share one socket
//! endpoint; producer events are forwarded to the client named in their
//! `recipient` field.

pub mod config;
pub mod types;
pub mod registry;
pub mod server;

// internal, not re-exported
mod client;
