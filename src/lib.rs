//! # coachlink-gateway
//!
//! REST API and WebSocket gateway for a coach/trainee workout platform.
//!
//! Supervisors assign workout plans to subjects; every noteworthy event
//! (a subject signing up, a plan being assigned) fans out over three
//! delivery paths: a durable notification log in PostgreSQL, a live push
//! to bound WebSocket sessions, and a best-effort email side channel.
//! Clients reconcile missed events by polling the durable log.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handshake + Push (ws/)
//!     │
//!     ├── Notifier (service/)
//!     ├── SessionRegistry (domain/)
//!     ├── MailDispatcher (mailer)
//!     │
//!     └── PostgreSQL Persistence
//! ```

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod domain;
pub mod error;
pub mod mailer;
pub mod persistence;
pub mod service;
pub mod ws;
