//! Service layer: notification fanout orchestration.
//!
//! [`Notifier`] coordinates the three delivery paths for every domain
//! event: durable log append, live push via the session registry, and
//! the email side channel.

pub mod notifier;

pub use notifier::Notifier;
