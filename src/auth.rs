//! Bearer-token authentication: JWT issue/verify, password hashing, and
//! the Axum extractor for authenticated principals.
//!
//! The rest of the gateway consumes identity as an already-verified
//! [`Claims`] value; nothing downstream re-validates credentials.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::domain::{PrincipalId, Role};
use crate::error::GatewayError;
use crate::persistence::models::UserRow;

/// Token validity period.
const TOKEN_VALIDITY_DAYS: i64 = 7;

/// JWT claims embedded in every issued token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Principal ID (database user ID).
    pub sub: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// User role.
    pub role: Role,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

impl Claims {
    /// Returns the principal ID these claims identify.
    #[must_use]
    pub const fn principal_id(&self) -> PrincipalId {
        PrincipalId::new(self.sub)
    }
}

/// Issues and verifies bearer tokens with a shared HMAC secret.
pub struct AuthVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for AuthVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthVerifier").finish_non_exhaustive()
    }
}

impl AuthVerifier {
    /// Creates a verifier from the configured secret.
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Issues a signed token for the given user.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if signing fails.
    pub fn issue(&self, user: &UserRow) -> Result<String, GatewayError> {
        let exp = (Utc::now() + chrono::Duration::days(TOKEN_VALIDITY_DAYS)).timestamp();
        let claims = Claims {
            sub: user.id.get(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            exp,
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| GatewayError::Internal(format!("token signing: {e}")))
    }

    /// Verifies a token and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Unauthorized`] for malformed, expired, or
    /// tampered tokens.
    pub fn verify(&self, token: &str) -> Result<Claims, GatewayError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| GatewayError::Unauthorized(format!("invalid token: {e}")))
    }
}

/// Hashes a password with bcrypt.
///
/// # Errors
///
/// Returns [`GatewayError::Internal`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, GatewayError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| GatewayError::Internal(format!("password hashing: {e}")))
}

/// Checks a password against its stored bcrypt hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Authenticated principal extracted from the `Authorization` header.
///
/// Rejects with 401 when the header is missing, malformed, or carries an
/// invalid token.
#[derive(Debug, Clone)]
pub struct AuthPrincipal(pub Claims);

impl FromRequestParts<AppState> for AuthPrincipal {
    type Rejection = GatewayError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| GatewayError::Unauthorized("missing bearer token".to_string()))?;
        let token = header.strip_prefix("Bearer ").ok_or_else(|| {
            GatewayError::Unauthorized("malformed authorization header".to_string())
        })?;
        let claims = state.verifier.verify(token)?;
        Ok(Self(claims))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn user() -> UserRow {
        UserRow {
            id: PrincipalId::new(5),
            name: "Marta".to_string(),
            email: "marta@example.com".to_string(),
            password_hash: String::new(),
            role: Role::Supervisor,
        }
    }

    #[test]
    fn issue_then_verify_round_trips_claims() {
        let verifier = AuthVerifier::new("test-secret");
        let Ok(token) = verifier.issue(&user()) else {
            panic!("issue failed");
        };
        let Ok(claims) = verifier.verify(&token) else {
            panic!("verify failed");
        };
        assert_eq!(claims.sub, 5);
        assert_eq!(claims.role, Role::Supervisor);
        assert_eq!(claims.principal_id(), PrincipalId::new(5));
    }

    #[test]
    fn verify_rejects_garbage_token() {
        let verifier = AuthVerifier::new("test-secret");
        assert!(verifier.verify("not-a-token").is_err());
    }

    #[test]
    fn verify_rejects_token_from_other_secret() {
        let issuer = AuthVerifier::new("secret-a");
        let verifier = AuthVerifier::new("secret-b");
        let Ok(token) = issuer.issue(&user()) else {
            panic!("issue failed");
        };
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let Ok(hash) = hash_password("hunter2") else {
            panic!("hash failed");
        };
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("hunter3", &hash));
        assert!(!verify_password("hunter2", "not-a-hash"));
    }
}
