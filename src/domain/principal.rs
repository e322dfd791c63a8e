//! Authenticated principal identity and role.
//!
//! Identity is established once by the auth layer (JWT verification) and
//! passed into the core as an already-verified value. The core never
//! re-validates credentials, only authorizes by role.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Database identity of a user.
///
/// Newtype over the `BIGSERIAL` primary key so principal identifiers
/// cannot be confused with plan or notification row IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PrincipalId(i64);

impl PrincipalId {
    /// Wraps a raw database ID.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw database ID.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PrincipalId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// User role: supervisors assign plans, subjects receive them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Coach: may list subjects and assign plans.
    Supervisor,
    /// Trainee: receives plans and plan notifications.
    Subject,
}

impl Role {
    /// Returns the wire/database string for this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Supervisor => "SUPERVISOR",
            Self::Subject => "SUBJECT",
        }
    }

    /// Parses a wire/database role string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SUPERVISOR" => Some(Self::Supervisor),
            "SUBJECT" => Some(Self::Subject),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved notification recipient: identity plus side-channel address.
///
/// Produced by the caller from domain rules (all supervisors for a new
/// subject, the assigned subject for a new plan) and consumed by the
/// fanout orchestrator.
#[derive(Debug, Clone)]
pub struct Recipient {
    /// Principal identity, used for the durable log and session lookup.
    pub id: PrincipalId,
    /// Display name, used in side-channel message bodies.
    pub name: String,
    /// Side-channel destination address.
    pub email: String,
}
