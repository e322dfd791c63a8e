//! Domain layer: principal identity, notification events, and the
//! session registry.
//!
//! This module contains the server-side domain model: who a notification
//! is for, what it says, and which live connections can receive it right
//! now.

pub mod connection_id;
pub mod notification;
pub mod principal;
pub mod session_registry;

pub use connection_id::ConnectionId;
pub use notification::{NotificationEvent, NotificationKind};
pub use principal::{PrincipalId, Recipient, Role};
pub use session_registry::{PushSender, SessionRegistry};
