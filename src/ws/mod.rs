//! WebSocket layer: handshake, connection loop, and wire messages.
//!
//! The WebSocket endpoint at `/ws` is the interactive push channel.
//! Connections authenticate with a bearer token and then receive
//! notification events pushed by the fanout orchestrator.

pub mod connection;
pub mod handler;
pub mod messages;
