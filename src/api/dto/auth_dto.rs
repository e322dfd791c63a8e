//! Auth and user DTOs for registration, login, and subject listing.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PrincipalId;
use crate::persistence::models::{UserRow, UserSummary};

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    pub name: String,
    /// Email address; stored lowercase and unique.
    pub email: String,
    /// Plaintext password; hashed before storage.
    pub password: String,
    /// Requested role: `SUPERVISOR` or `SUBJECT`.
    pub role: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
pub struct UserDto {
    /// Principal identifier.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Role string, `SUPERVISOR` or `SUBJECT`.
    pub role: String,
}

impl From<&UserRow> for UserDto {
    fn from(user: &UserRow) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
        }
    }
}

/// Response body for `POST /auth/register` and `POST /auth/login`.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
    /// The authenticated user.
    pub user: UserDto,
}

/// One subject in the `GET /subjects` listing.
#[derive(Debug, Serialize)]
pub struct SubjectDto {
    /// Principal identifier.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

impl From<UserSummary> for SubjectDto {
    fn from(summary: UserSummary) -> Self {
        Self {
            id: summary.id,
            name: summary.name,
            email: summary.email,
        }
    }
}
