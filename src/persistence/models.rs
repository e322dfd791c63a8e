//! Database row models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PrincipalId, Role};

/// A durable notification row from the `notifications` table.
///
/// Append-only: created exactly once per event per recipient; the only
/// mutation ever applied is flipping `read` to `true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Recipient principal.
    pub recipient_id: PrincipalId,
    /// Kind discriminator string (e.g. `"NEW_PLAN"`).
    pub kind: String,
    /// JSONB payload with kind-specific data.
    pub payload: serde_json::Value,
    /// Whether the recipient has marked the record read.
    pub read: bool,
    /// Server-side creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A full user row from the `users` table.
#[derive(Debug, Clone)]
pub struct UserRow {
    /// Principal identity.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Email address (stored lowercase).
    pub email: String,
    /// bcrypt password hash.
    pub password_hash: String,
    /// User role.
    pub role: Role,
}

/// Identity-only user projection for listings and recipient resolution.
#[derive(Debug, Clone)]
pub struct UserSummary {
    /// Principal identity.
    pub id: PrincipalId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
}

/// A workout plan row from the `plans` table.
#[derive(Debug, Clone)]
pub struct PlanRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Subject the plan is assigned to.
    pub subject_id: PrincipalId,
    /// Supervisor who assigned the plan.
    pub supervisor_id: PrincipalId,
    /// Plan title.
    pub title: String,
    /// Free-form notes.
    pub notes: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// An exercise row from the `plan_exercises` table.
#[derive(Debug, Clone)]
pub struct ExerciseRow {
    /// Auto-increment row ID.
    pub id: i64,
    /// Exercise name.
    pub exercise_name: String,
    /// Number of sets.
    pub sets: i32,
    /// Repetition scheme (free text, e.g. `"10-12"`).
    pub reps: String,
    /// Rest between sets in seconds.
    pub rest_seconds: i32,
    /// Position within the plan.
    pub order_index: i32,
}

/// Exercise input for plan creation, already normalized to seconds.
#[derive(Debug, Clone)]
pub struct NewExercise {
    /// Exercise name.
    pub exercise_name: String,
    /// Number of sets.
    pub sets: i32,
    /// Repetition scheme.
    pub reps: String,
    /// Rest between sets in seconds.
    pub rest_seconds: i32,
}
