//! Notification reconciliation handlers: fetch and acknowledge.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{MarkReadResponse, NotificationDto};
use crate::app_state::AppState;
use crate::auth::AuthPrincipal;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /notifications` — The caller's recent notifications.
///
/// Newest first, capped at 100. This is the polling reconciliation path:
/// a client that was offline catches up here regardless of what the live
/// push channel delivered.
///
/// # Errors
///
/// Returns [`GatewayError::Storage`] on database failure.
#[utoipa::path(
    get,
    path = "/api/notifications",
    tag = "Notifications",
    summary = "List recent notifications",
    description = "Returns the caller's 100 most recent notifications, newest first, read or not.",
    responses(
        (status = 200, description = "Notification list", body = serde_json::Value),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthPrincipal(claims): AuthPrincipal,
) -> Result<impl IntoResponse, GatewayError> {
    let records = state
        .store
        .list_notifications(claims.principal_id())
        .await?;
    let data: Vec<NotificationDto> = records.into_iter().map(NotificationDto::from).collect();
    Ok(Json(data))
}

/// `POST /notifications/:id/read` — Acknowledge one notification.
///
/// Owner-scoped and idempotent: `ok` is `false` (never an error) when
/// the record does not exist or belongs to someone else, and `true` on
/// repeat acknowledgements.
///
/// # Errors
///
/// Returns [`GatewayError::Storage`] on database failure.
#[utoipa::path(
    post,
    path = "/api/notifications/{id}/read",
    tag = "Notifications",
    summary = "Mark a notification read",
    description = "Marks the caller's notification as read. Re-marking is a no-op that still reports ok.",
    params(
        ("id" = i64, Path, description = "Notification ID"),
    ),
    responses(
        (status = 200, description = "Acknowledgement outcome", body = MarkReadResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
    )
)]
pub async fn mark_read(
    State(state): State<AppState>,
    AuthPrincipal(claims): AuthPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let ok = state
        .store
        .mark_notification_read(id, claims.principal_id())
        .await?;
    Ok(Json(MarkReadResponse { ok }))
}

/// Notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/{id}/read", post(mark_read))
}
