//! Notification events and their kind-specific payloads.
//!
//! [`NotificationEvent`] is a tagged union: one variant per notification
//! kind, each carrying its own payload record. Consumers pattern-match
//! exhaustively instead of probing loosely typed fields. An event is
//! transient: produced once from a completed domain write, consumed by
//! the three delivery sinks (durable log, live push, email), and
//! discarded.

use serde::{Deserialize, Serialize};

use super::PrincipalId;

/// Discriminant for notification kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationKind {
    /// A new subject registered; sent to every supervisor.
    NewSubject,
    /// A new plan was assigned; sent to the named subject.
    NewPlan,
}

impl NotificationKind {
    /// Returns the wire/database string for this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NewSubject => "NEW_SUBJECT",
            Self::NewPlan => "NEW_PLAN",
        }
    }
}

/// One notification event with its kind-specific payload.
///
/// Serializes as `{"type": "<KIND>", "payload": {...}}` with camelCase
/// payload keys, the exact shape pushed to interactive clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum NotificationEvent {
    /// A subject completed registration.
    #[serde(rename = "NEW_SUBJECT", rename_all = "camelCase")]
    NewSubject {
        /// Principal ID of the new subject.
        subject_id: PrincipalId,
        /// Display name of the new subject.
        subject_name: String,
        /// Email address of the new subject.
        subject_email: String,
    },

    /// A supervisor assigned a plan to a subject.
    #[serde(rename = "NEW_PLAN", rename_all = "camelCase")]
    NewPlan {
        /// ID of the created plan.
        plan_id: i64,
        /// Plan title.
        title: String,
        /// Principal ID of the assigned subject.
        subject_id: PrincipalId,
        /// Principal ID of the assigning supervisor.
        supervisor_id: PrincipalId,
    },
}

impl NotificationEvent {
    /// Returns the kind discriminant for this event.
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::NewSubject { .. } => NotificationKind::NewSubject,
            Self::NewPlan { .. } => NotificationKind::NewPlan,
        }
    }

    /// Returns the payload alone as a JSON value, as stored in the
    /// durable log's `payload` column.
    #[must_use]
    pub fn payload_json(&self) -> serde_json::Value {
        serde_json::to_value(self)
            .ok()
            .and_then(|mut v| v.get_mut("payload").map(serde_json::Value::take))
            .unwrap_or_default()
    }

    /// Rebuilds an event from a stored kind string and payload value.
    ///
    /// Returns `None` when the kind is unknown or the payload does not
    /// match the kind's record shape.
    #[must_use]
    pub fn from_parts(kind: &str, payload: serde_json::Value) -> Option<Self> {
        let envelope = serde_json::json!({ "type": kind, "payload": payload });
        serde_json::from_value(envelope).ok()
    }
}
