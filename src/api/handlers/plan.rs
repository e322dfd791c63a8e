//! Workout plan handlers: creation and detail.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreatePlanRequest, CreatePlanResponse, DEFAULT_REST_SECONDS, ExerciseDto, PlanDetailResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthPrincipal;
use crate::domain::{NotificationEvent, PrincipalId, Recipient, Role};
use crate::error::{ErrorResponse, GatewayError};
use crate::persistence::models::NewExercise;

/// `POST /plans` — Assign a workout plan to a subject. Supervisor only.
///
/// Stores the plan with its exercises and fans a `NEW_PLAN` event out to
/// the subject.
///
/// # Errors
///
/// Returns [`GatewayError::Forbidden`] for non-supervisor callers,
/// [`GatewayError::InvalidRequest`] on an empty title or exercise list,
/// and [`GatewayError::SubjectNotFound`] when the target does not exist
/// or is not a subject.
#[utoipa::path(
    post,
    path = "/api/plans",
    tag = "Plans",
    summary = "Assign a workout plan",
    description = "Creates a plan for the given subject and notifies them. Rest intervals accept plain seconds or an mm:ss string.",
    request_body = CreatePlanRequest,
    responses(
        (status = 200, description = "Plan created", body = serde_json::Value),
        (status = 400, description = "Empty title or exercise list", body = ErrorResponse),
        (status = 403, description = "Caller is not a supervisor", body = ErrorResponse),
        (status = 404, description = "Subject not found", body = ErrorResponse),
    )
)]
pub async fn create_plan(
    State(state): State<AppState>,
    AuthPrincipal(claims): AuthPrincipal,
    Json(req): Json<CreatePlanRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if claims.role != Role::Supervisor {
        return Err(GatewayError::Forbidden(
            "supervisor role required".to_string(),
        ));
    }
    if req.title.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "title is required".to_string(),
        ));
    }
    if req.exercises.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "at least one exercise is required".to_string(),
        ));
    }

    let subject_id = PrincipalId::new(req.subject_id);
    let subject = state
        .store
        .find_subject(subject_id)
        .await?
        .ok_or(GatewayError::SubjectNotFound(req.subject_id))?;

    let exercises: Vec<NewExercise> = req
        .exercises
        .iter()
        .map(|e| NewExercise {
            exercise_name: e.exercise_name.clone(),
            sets: e.sets,
            reps: e.reps.clone(),
            rest_seconds: e
                .rest
                .as_ref()
                .map_or(DEFAULT_REST_SECONDS, |r| r.to_seconds()),
        })
        .collect();

    let supervisor_id = claims.principal_id();
    let plan_id = state
        .store
        .create_plan(
            subject_id,
            supervisor_id,
            req.title.trim(),
            &req.notes,
            &exercises,
        )
        .await?;

    tracing::info!(plan_id, subject = %subject_id, supervisor = %supervisor_id, "plan created");

    let recipient = Recipient {
        id: subject.id,
        name: subject.name,
        email: subject.email,
    };
    let event = NotificationEvent::NewPlan {
        plan_id,
        title: req.title.trim().to_string(),
        subject_id,
        supervisor_id,
    };
    state.notifier.notify(&[recipient], &event).await?;

    Ok(Json(CreatePlanResponse { id: plan_id }))
}

/// `GET /plans/:id` — Plan detail with exercises.
///
/// Readable by exactly two principals: the subject the plan is assigned
/// to, and the supervisor who assigned it.
///
/// # Errors
///
/// Returns [`GatewayError::PlanNotFound`] when the plan does not exist
/// and [`GatewayError::Forbidden`] for any other caller.
#[utoipa::path(
    get,
    path = "/api/plans/{id}",
    tag = "Plans",
    summary = "Get plan detail",
    description = "Returns the plan with its ordered exercises. Only the assigned subject or the assigning supervisor may read it.",
    params(
        ("id" = i64, Path, description = "Plan ID"),
    ),
    responses(
        (status = 200, description = "Plan detail", body = serde_json::Value),
        (status = 403, description = "Caller is neither the subject nor the assigning supervisor", body = ErrorResponse),
        (status = 404, description = "Plan not found", body = ErrorResponse),
    )
)]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthPrincipal(claims): AuthPrincipal,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, GatewayError> {
    let plan = state
        .store
        .get_plan(id)
        .await?
        .ok_or(GatewayError::PlanNotFound(id))?;

    let caller = claims.principal_id();
    if caller != plan.subject_id && caller != plan.supervisor_id {
        return Err(GatewayError::Forbidden(
            "plan is not visible to this account".to_string(),
        ));
    }

    let exercises: Vec<ExerciseDto> = state
        .store
        .list_exercises(plan.id)
        .await?
        .into_iter()
        .map(ExerciseDto::from)
        .collect();

    Ok(Json(PlanDetailResponse {
        id: plan.id,
        title: plan.title,
        notes: plan.notes,
        subject_id: plan.subject_id,
        supervisor_id: plan.supervisor_id,
        exercises,
    }))
}

/// Plan routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/plans", post(create_plan))
        .route("/plans/{id}", get(get_plan))
}
