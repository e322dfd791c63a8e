//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 4001,
///     "message": "unauthorized: missing bearer token",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Not Found/State | 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server/Storage  | 500 Internal Server Error  |
/// | 4000–4999 | Auth            | 401 / 403                  |
///
/// Push and side-channel delivery failures are deliberately *not* part
/// of the HTTP surface: they are diagnosed via `tracing` and never
/// escalate past the fanout orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unsupported role string in a registration request.
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// No subject with the given ID.
    #[error("subject not found: {0}")]
    SubjectNotFound(i64),

    /// No plan with the given ID.
    #[error("plan not found: {0}")]
    PlanNotFound(i64),

    /// The email address is already registered.
    #[error("email already registered")]
    EmailTaken,

    /// Durable storage failure. Fatal to the enclosing domain operation:
    /// the durability guarantee is broken, so the caller must see it.
    #[error("storage error: {0}")]
    Storage(String),

    /// Side-channel delivery failure. Logged and discarded by the fanout
    /// orchestrator; never propagated to HTTP callers.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Missing or invalid credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authenticated but not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidRole(_) => 1002,
            Self::SubjectNotFound(_) => 2001,
            Self::PlanNotFound(_) => 2002,
            Self::EmailTaken => 2101,
            Self::Internal(_) => 3000,
            Self::Storage(_) => 3001,
            Self::Delivery(_) => 3002,
            Self::Unauthorized(_) => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidRole(_) => StatusCode::BAD_REQUEST,
            Self::SubjectNotFound(_) | Self::PlanNotFound(_) => StatusCode::NOT_FOUND,
            Self::EmailTaken => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Delivery(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
