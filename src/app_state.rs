//! Shared application state passed to all HTTP and WebSocket handlers.

use std::sync::Arc;

use crate::auth::AuthVerifier;
use crate::domain::SessionRegistry;
use crate::mailer::MailDispatcher;
use crate::persistence::PostgresStore;
use crate::service::Notifier;

/// Application state shared across all request handlers.
///
/// All members are `Arc`-wrapped so the state clones cheaply per
/// request. The session registry and notifier are injected here rather
/// than reached through any global, so tests can wire their own.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Postgres-backed persistence.
    pub store: Arc<PostgresStore>,
    /// Registry of live WebSocket sessions.
    pub registry: Arc<SessionRegistry>,
    /// Fanout orchestrator for notification delivery.
    pub notifier: Arc<Notifier<PostgresStore, MailDispatcher>>,
    /// Token issuing and verification.
    pub verifier: Arc<AuthVerifier>,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(
        store: Arc<PostgresStore>,
        registry: Arc<SessionRegistry>,
        notifier: Arc<Notifier<PostgresStore, MailDispatcher>>,
        verifier: Arc<AuthVerifier>,
    ) -> Self {
        Self {
            store,
            registry,
            notifier,
            verifier,
        }
    }
}
