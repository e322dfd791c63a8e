//! WebSocket wire messages for the interactive push channel.

use serde::{Deserialize, Serialize};

use crate::domain::{NotificationEvent, PrincipalId};

/// Client → server messages.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Handshake: presents a bearer token to bind the connection.
    Auth {
        /// Bearer token issued at login/registration.
        token: String,
    },
}

/// Server → client messages.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Handshake succeeded; the connection is bound to the principal.
    AuthOk {
        /// Principal the connection is now bound to.
        principal_id: PrincipalId,
    },
    /// Handshake failed; the connection stays open but unbound.
    AuthError {
        /// Human-readable rejection reason.
        message: String,
    },
    /// A pushed notification event.
    Notification {
        /// The event, serialized as `{"type": ..., "payload": ...}`.
        data: NotificationEvent,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn auth_message_parses() {
        let msg: Option<ClientMessage> =
            serde_json::from_str(r#"{"type":"auth","token":"abc.def.ghi"}"#).ok();
        let Some(ClientMessage::Auth { token }) = msg else {
            panic!("expected auth message");
        };
        assert_eq!(token, "abc.def.ghi");
    }

    #[test]
    fn unknown_client_message_is_rejected() {
        let msg: Result<ClientMessage, _> = serde_json::from_str(r#"{"type":"subscribe"}"#);
        assert!(msg.is_err());
    }

    #[test]
    fn notification_push_has_wire_shape() {
        let msg = ServerMessage::Notification {
            data: NotificationEvent::NewPlan {
                plan_id: 4,
                title: "Pull day".to_string(),
                subject_id: PrincipalId::new(2),
                supervisor_id: PrincipalId::new(1),
            },
        };
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("notification"));
        let data = json.get("data");
        let Some(data) = data else {
            panic!("missing data");
        };
        assert_eq!(data.get("type").and_then(|v| v.as_str()), Some("NEW_PLAN"));
        assert!(data.get("payload").is_some());
    }
}
