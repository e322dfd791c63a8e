//! Live session tracking for interactive push delivery.
//!
//! [`SessionRegistry`] maps each authenticated principal to the set of
//! WebSocket connections currently bound to it. It is an explicitly
//! owned, injectable instance (no hidden global) so tests can create
//! isolated registries per scenario. The state is a weak, time-bounded
//! index: it holds nothing that outlives the process and is rebuilt from
//! scratch as connections re-handshake.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};

use super::{ConnectionId, NotificationEvent, PrincipalId};

/// Push channel into one WebSocket connection's write loop.
pub type PushSender = mpsc::UnboundedSender<NotificationEvent>;

#[derive(Debug, Default)]
struct RegistryInner {
    by_principal: HashMap<PrincipalId, HashMap<ConnectionId, PushSender>>,
    by_handle: HashMap<ConnectionId, PrincipalId>,
}

/// Process-wide index of live connections per principal.
///
/// # Concurrency
///
/// Both maps sit behind a single `RwLock`, so every register/unregister
/// is atomic with respect to concurrent resolves: a reader never
/// observes a half-updated recipient set. The lock is never held across
/// an I/O await; [`SessionRegistry::resolve`] clones the senders and
/// releases it before any push happens.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a connection handle to a principal.
    ///
    /// Idempotent per handle. If the same handle is registered again
    /// under a different principal, the last call wins and the handle is
    /// removed from the previous principal's set.
    pub async fn register(&self, principal: PrincipalId, handle: ConnectionId, sender: PushSender) {
        let mut inner = self.inner.write().await;
        if let Some(prev) = inner.by_handle.insert(handle, principal)
            && prev != principal
            && let Some(handles) = inner.by_principal.get_mut(&prev)
        {
            handles.remove(&handle);
            if handles.is_empty() {
                inner.by_principal.remove(&prev);
            }
        }
        inner
            .by_principal
            .entry(principal)
            .or_default()
            .insert(handle, sender);
    }

    /// Removes a connection handle.
    ///
    /// Safe to call for unknown or already-removed handles (connections
    /// may disconnect before completing the handshake). The principal's
    /// entry is dropped once its handle set is empty.
    pub async fn unregister(&self, handle: ConnectionId) {
        let mut inner = self.inner.write().await;
        let Some(principal) = inner.by_handle.remove(&handle) else {
            return;
        };
        if let Some(handles) = inner.by_principal.get_mut(&principal) {
            handles.remove(&handle);
            if handles.is_empty() {
                inner.by_principal.remove(&principal);
            }
        }
    }

    /// Returns the live push channels for a principal.
    ///
    /// A principal with no live handles yields an empty vec, never an
    /// error. Senders are cloned out so the caller pushes without
    /// holding the registry lock.
    pub async fn resolve(&self, principal: PrincipalId) -> Vec<(ConnectionId, PushSender)> {
        let inner = self.inner.read().await;
        inner
            .by_principal
            .get(&principal)
            .map(|handles| handles.iter().map(|(id, tx)| (*id, tx.clone())).collect())
            .unwrap_or_default()
    }

    /// Returns the number of live handles bound to a principal.
    pub async fn connection_count(&self, principal: PrincipalId) -> usize {
        let inner = self.inner.read().await;
        inner
            .by_principal
            .get(&principal)
            .map_or(0, HashMap::len)
    }

    /// Returns `true` if no principal has a live handle.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_principal.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn channel() -> (PushSender, mpsc::UnboundedReceiver<NotificationEvent>) {
        mpsc::unbounded_channel()
    }

    #[tokio::test]
    async fn register_and_resolve() {
        let registry = SessionRegistry::new();
        let principal = PrincipalId::new(1);
        let handle = ConnectionId::new();
        let (tx, _rx) = channel();

        registry.register(principal, handle, tx).await;

        let sessions = registry.resolve(principal).await;
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions.first().map(|(id, _)| *id), Some(handle));
    }

    #[tokio::test]
    async fn resolve_unknown_principal_is_empty() {
        let registry = SessionRegistry::new();
        let sessions = registry.resolve(PrincipalId::new(99)).await;
        assert!(sessions.is_empty());
    }

    #[tokio::test]
    async fn register_is_idempotent_per_handle() {
        let registry = SessionRegistry::new();
        let principal = PrincipalId::new(1);
        let handle = ConnectionId::new();
        let (tx, _rx) = channel();

        registry.register(principal, handle, tx.clone()).await;
        registry.register(principal, handle, tx).await;

        assert_eq!(registry.connection_count(principal).await, 1);
    }

    #[tokio::test]
    async fn multiple_handles_per_principal() {
        let registry = SessionRegistry::new();
        let principal = PrincipalId::new(1);
        let (tx_a, _rx_a) = channel();
        let (tx_b, _rx_b) = channel();

        registry.register(principal, ConnectionId::new(), tx_a).await;
        registry.register(principal, ConnectionId::new(), tx_b).await;

        assert_eq!(registry.connection_count(principal).await, 2);
    }

    #[tokio::test]
    async fn rebind_to_other_principal_moves_handle() {
        let registry = SessionRegistry::new();
        let first = PrincipalId::new(1);
        let second = PrincipalId::new(2);
        let handle = ConnectionId::new();
        let (tx, _rx) = channel();

        registry.register(first, handle, tx.clone()).await;
        registry.register(second, handle, tx).await;

        assert_eq!(registry.connection_count(first).await, 0);
        assert_eq!(registry.connection_count(second).await, 1);
    }

    #[tokio::test]
    async fn unregister_removes_handle_and_empty_entry() {
        let registry = SessionRegistry::new();
        let principal = PrincipalId::new(1);
        let handle = ConnectionId::new();
        let (tx, _rx) = channel();

        registry.register(principal, handle, tx).await;
        registry.unregister(handle).await;

        assert!(registry.resolve(principal).await.is_empty());
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn unregister_unknown_handle_is_noop() {
        let registry = SessionRegistry::new();
        registry.unregister(ConnectionId::new()).await;
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn unregister_is_idempotent() {
        let registry = SessionRegistry::new();
        let principal = PrincipalId::new(1);
        let handle = ConnectionId::new();
        let (tx, _rx) = channel();

        registry.register(principal, handle, tx).await;
        registry.unregister(handle).await;
        registry.unregister(handle).await;

        assert!(registry.is_empty().await);
    }
}
