//! Notification DTOs for the polling reconciliation endpoints.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::persistence::models::NotificationRecord;

/// One durable notification record as returned by `GET /notifications`.
#[derive(Debug, Serialize)]
pub struct NotificationDto {
    /// Record identifier.
    pub id: i64,
    /// Event kind, `NEW_SUBJECT` or `NEW_PLAN`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Kind-specific payload.
    pub payload: serde_json::Value,
    /// Whether the recipient has acknowledged the record.
    pub read: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<NotificationRecord> for NotificationDto {
    fn from(record: NotificationRecord) -> Self {
        Self {
            id: record.id,
            kind: record.kind,
            payload: record.payload,
            read: record.read,
            created_at: record.created_at,
        }
    }
}

/// Response body for `POST /notifications/{id}/read`.
#[derive(Debug, Serialize, ToSchema)]
pub struct MarkReadResponse {
    /// `true` when the record existed, belonged to the caller, and is
    /// now marked read. `false` otherwise; never an error.
    pub ok: bool,
}
