//! Account handlers: registration and login.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use crate::api::dto::{AuthResponse, LoginRequest, RegisterRequest, UserDto};
use crate::app_state::AppState;
use crate::auth::{hash_password, verify_password};
use crate::domain::{NotificationEvent, Recipient, Role};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /auth/register` — Create an account and issue a token.
///
/// Registering a subject fans a `NEW_SUBJECT` event out to every
/// supervisor.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on missing fields,
/// [`GatewayError::InvalidRole`] on an unknown role string, and
/// [`GatewayError::EmailTaken`] when the email is already registered.
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    summary = "Register an account",
    description = "Creates a supervisor or subject account, returns a bearer token, and notifies all supervisors when a subject signs up.",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created", body = serde_json::Value),
        (status = 400, description = "Missing field or unknown role", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    if req.name.trim().is_empty() || req.email.trim().is_empty() || req.password.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "name, email and password are required".to_string(),
        ));
    }
    let role =
        Role::parse(&req.role).ok_or_else(|| GatewayError::InvalidRole(req.role.clone()))?;

    let email = req.email.trim().to_lowercase();
    let password_hash = hash_password(&req.password)?;
    let user = state
        .store
        .create_user(req.name.trim(), &email, &password_hash, role)
        .await?;
    let token = state.verifier.issue(&user)?;

    tracing::info!(principal = %user.id, role = role.as_str(), "account created");

    if role == Role::Subject {
        let recipients: Vec<Recipient> = state
            .store
            .list_supervisors()
            .await?
            .into_iter()
            .map(|s| Recipient {
                id: s.id,
                name: s.name,
                email: s.email,
            })
            .collect();
        let event = NotificationEvent::NewSubject {
            subject_id: user.id,
            subject_name: user.name.clone(),
            subject_email: user.email.clone(),
        };
        state.notifier.notify(&recipients, &event).await?;
    }

    let response = AuthResponse {
        token,
        user: UserDto::from(&user),
    };
    Ok(Json(response))
}

/// `POST /auth/login` — Authenticate and issue a token.
///
/// # Errors
///
/// Returns [`GatewayError::Unauthorized`] on unknown email or wrong
/// password; the two cases are indistinguishable on the wire.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    summary = "Log in",
    description = "Verifies credentials and returns a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = serde_json::Value),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let email = req.email.trim().to_lowercase();
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|u| verify_password(&req.password, &u.password_hash))
        .ok_or_else(|| GatewayError::Unauthorized("invalid credentials".to_string()))?;

    let token = state.verifier.issue(&user)?;
    Ok(Json(AuthResponse {
        token,
        user: UserDto::from(&user),
    }))
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}
