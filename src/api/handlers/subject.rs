//! Subject listing for supervisors.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::SubjectDto;
use crate::app_state::AppState;
use crate::auth::AuthPrincipal;
use crate::domain::Role;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /subjects` — List all subjects. Supervisor only.
///
/// # Errors
///
/// Returns [`GatewayError::Forbidden`] for non-supervisor callers.
#[utoipa::path(
    get,
    path = "/api/subjects",
    tag = "Subjects",
    summary = "List subjects",
    description = "Returns every registered subject, newest first. Requires a supervisor token.",
    responses(
        (status = 200, description = "Subject list", body = serde_json::Value),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller is not a supervisor", body = ErrorResponse),
    )
)]
pub async fn list_subjects(
    State(state): State<AppState>,
    AuthPrincipal(claims): AuthPrincipal,
) -> Result<impl IntoResponse, GatewayError> {
    if claims.role != Role::Supervisor {
        return Err(GatewayError::Forbidden(
            "supervisor role required".to_string(),
        ));
    }

    let subjects: Vec<SubjectDto> = state
        .store
        .list_subjects()
        .await?
        .into_iter()
        .map(SubjectDto::from)
        .collect();
    Ok(Json(subjects))
}

/// Subject routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/subjects", get(list_subjects))
}
