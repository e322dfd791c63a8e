//! WebSocket connection state machine.
//!
//! Per connection: `OPEN → AUTHENTICATING → {BOUND, REJECTED}`. The
//! authenticating phase is the synchronous token verification inside
//! `handle_text_message`, so it never exists as a stored state; only
//! the resting states appear in `HandshakeState`. A fresh connection
//! is unusable for push until the client presents a valid bearer token.
//! Rejection leaves the connection open but unbound (the interactive
//! layer is advisory, not authoritative). Closing from any state
//! unregisters the handle unconditionally.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use super::messages::{ClientMessage, ServerMessage};
use crate::auth::AuthVerifier;
use crate::domain::{ConnectionId, PrincipalId, PushSender, SessionRegistry};

/// Handshake state of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HandshakeState {
    /// No principal known; push cannot reach this connection.
    Open,
    /// Bound into the session registry as the given principal.
    Bound(PrincipalId),
    /// Token verification failed; still open, still unbound.
    Rejected,
}

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads handshake messages from the client.
/// - Forwards pushed events from the registry's channel to the client.
pub async fn run_connection(
    socket: WebSocket,
    registry: Arc<SessionRegistry>,
    verifier: Arc<AuthVerifier>,
) {
    let handle = ConnectionId::new();
    let (push_tx, mut push_rx) = mpsc::unbounded_channel();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut state = HandshakeState::Open;

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(
                            &text, &mut state, handle, &push_tx, &registry, &verifier,
                        )
                        .await;
                        let json = serde_json::to_string(&reply).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Pushed event from the fanout orchestrator
            event = push_rx.recv() => {
                let Some(event) = event else { break };
                let msg = ServerMessage::Notification { data: event };
                let json = serde_json::to_string(&msg).unwrap_or_default();
                if ws_tx.send(Message::text(json)).await.is_err() {
                    break;
                }
            }
        }
    }

    // Close from any state unbinds unconditionally; unregister is a
    // no-op for handles that never completed the handshake.
    registry.unregister(handle).await;
    tracing::debug!(%handle, ?state, "ws connection closed");
}

/// Handles one text frame, advancing the handshake state machine.
async fn handle_text_message(
    text: &str,
    state: &mut HandshakeState,
    handle: ConnectionId,
    push_tx: &PushSender,
    registry: &SessionRegistry,
    verifier: &AuthVerifier,
) -> ServerMessage {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        return ServerMessage::AuthError {
            message: "malformed message".to_string(),
        };
    };

    match msg {
        ClientMessage::Auth { token } => match verifier.verify(&token) {
            Ok(claims) => {
                let principal = claims.principal_id();
                registry.register(principal, handle, push_tx.clone()).await;
                *state = HandshakeState::Bound(principal);
                tracing::debug!(%handle, %principal, "ws handshake bound");
                ServerMessage::AuthOk {
                    principal_id: principal,
                }
            }
            Err(err) => {
                *state = HandshakeState::Rejected;
                tracing::warn!(%handle, error = %err, "ws handshake rejected");
                ServerMessage::AuthError {
                    message: "invalid token".to_string(),
                }
            }
        },
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn setup() -> (SessionRegistry, AuthVerifier, ConnectionId) {
        (
            SessionRegistry::new(),
            AuthVerifier::new("test-secret"),
            ConnectionId::new(),
        )
    }

    fn token_for(verifier: &AuthVerifier, id: i64) -> String {
        use crate::domain::Role;
        use crate::persistence::models::UserRow;
        let user = UserRow {
            id: PrincipalId::new(id),
            name: "Rui".to_string(),
            email: "rui@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Subject,
        };
        verifier.issue(&user).unwrap_or_default()
    }

    #[tokio::test]
    async fn valid_token_binds_connection() {
        let (registry, verifier, handle) = setup();
        let (tx, _rx) = mpsc::unbounded_channel();
        let token = token_for(&verifier, 7);
        let text = serde_json::json!({"type": "auth", "token": token}).to_string();
        let mut state = HandshakeState::Open;

        let reply =
            handle_text_message(&text, &mut state, handle, &tx, &registry, &verifier).await;

        assert!(matches!(reply, ServerMessage::AuthOk { .. }));
        assert_eq!(state, HandshakeState::Bound(PrincipalId::new(7)));
        assert_eq!(registry.connection_count(PrincipalId::new(7)).await, 1);
    }

    #[tokio::test]
    async fn invalid_token_leaves_connection_unbound() {
        let (registry, verifier, handle) = setup();
        let (tx, _rx) = mpsc::unbounded_channel();
        let text = r#"{"type":"auth","token":"bogus"}"#;
        let mut state = HandshakeState::Open;

        let reply =
            handle_text_message(text, &mut state, handle, &tx, &registry, &verifier).await;

        assert!(matches!(reply, ServerMessage::AuthError { .. }));
        assert_eq!(state, HandshakeState::Rejected);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn malformed_frame_is_an_error_reply() {
        let (registry, verifier, handle) = setup();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = HandshakeState::Open;

        let reply =
            handle_text_message("{nope", &mut state, handle, &tx, &registry, &verifier).await;

        assert!(matches!(reply, ServerMessage::AuthError { .. }));
        assert_eq!(state, HandshakeState::Open);
    }

    #[tokio::test]
    async fn rejected_connection_may_retry_handshake() {
        let (registry, verifier, handle) = setup();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut state = HandshakeState::Open;

        let _ = handle_text_message(
            r#"{"type":"auth","token":"bogus"}"#,
            &mut state,
            handle,
            &tx,
            &registry,
            &verifier,
        )
        .await;
        assert_eq!(state, HandshakeState::Rejected);

        let token = token_for(&verifier, 9);
        let text = serde_json::json!({"type": "auth", "token": token}).to_string();
        let reply =
            handle_text_message(&text, &mut state, handle, &tx, &registry, &verifier).await;

        assert!(matches!(reply, ServerMessage::AuthOk { .. }));
        assert_eq!(state, HandshakeState::Bound(PrincipalId::new(9)));
    }
}
