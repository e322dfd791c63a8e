//! Plan DTOs: creation requests and detail responses.
//!
//! Plan payloads use camelCase field names on the wire. Rest intervals
//! are accepted either as plain seconds or as an `mm:ss` string; both
//! normalize to seconds before storage, and responses carry both forms.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::PrincipalId;
use crate::persistence::models::ExerciseRow;

/// Rest interval applied when a request omits or garbles the field.
pub const DEFAULT_REST_SECONDS: i32 = 90;

/// Rest interval as it appears on the wire: seconds or `mm:ss`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RestTime {
    /// Plain seconds, e.g. `90`.
    Seconds(u32),
    /// Minute:second string, e.g. `"01:30"`.
    Text(String),
}

impl RestTime {
    /// Normalizes to whole seconds. Unparseable text falls back to
    /// [`DEFAULT_REST_SECONDS`].
    #[must_use]
    pub fn to_seconds(&self) -> i32 {
        match self {
            Self::Seconds(s) => i32::try_from(*s).unwrap_or(DEFAULT_REST_SECONDS),
            Self::Text(text) => parse_mmss(text).unwrap_or(DEFAULT_REST_SECONDS),
        }
    }
}

fn parse_mmss(text: &str) -> Option<i32> {
    let (mins, secs) = text.split_once(':')?;
    let mins: i32 = mins.trim().parse().ok()?;
    let secs: i32 = secs.trim().parse().ok()?;
    if mins < 0 || !(0..60).contains(&secs) {
        return None;
    }
    mins.checked_mul(60)?.checked_add(secs)
}

/// Formats whole seconds as an `mm:ss` string.
#[must_use]
pub fn seconds_to_mmss(seconds: i32) -> String {
    let seconds = seconds.max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// One exercise in a `POST /plans` request.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseInput {
    /// Exercise name, e.g. `"Back squat"`.
    pub exercise_name: String,
    /// Number of sets.
    pub sets: i32,
    /// Rep scheme as free text, e.g. `"8-10"`.
    pub reps: String,
    /// Rest interval; defaults to 90 seconds when absent.
    #[serde(default)]
    pub rest: Option<RestTime>,
}

/// Request body for `POST /plans`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanRequest {
    /// Subject the plan is assigned to.
    pub subject_id: i64,
    /// Plan title.
    pub title: String,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
    /// Ordered exercise list; order of appearance is preserved.
    pub exercises: Vec<ExerciseInput>,
}

/// Response body for `POST /plans`.
#[derive(Debug, Serialize)]
pub struct CreatePlanResponse {
    /// Identifier of the created plan.
    pub id: i64,
}

/// One exercise in a plan detail response.
#[derive(Debug, Serialize)]
pub struct ExerciseDto {
    /// Exercise identifier.
    pub id: i64,
    /// Exercise name.
    pub exercise_name: String,
    /// Number of sets.
    pub sets: i32,
    /// Rep scheme.
    pub reps: String,
    /// Rest interval in seconds.
    pub rest: i32,
    /// Rest interval as `mm:ss` for display.
    pub rest_mmss: String,
    /// Position within the plan.
    pub order_index: i32,
}

impl From<ExerciseRow> for ExerciseDto {
    fn from(row: ExerciseRow) -> Self {
        let rest_mmss = seconds_to_mmss(row.rest_seconds);
        Self {
            id: row.id,
            exercise_name: row.exercise_name,
            sets: row.sets,
            reps: row.reps,
            rest: row.rest_seconds,
            rest_mmss,
            order_index: row.order_index,
        }
    }
}

/// Response body for `GET /plans/{id}`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetailResponse {
    /// Plan identifier.
    pub id: i64,
    /// Plan title.
    pub title: String,
    /// Free-form notes.
    pub notes: String,
    /// Subject the plan is assigned to.
    pub subject_id: PrincipalId,
    /// Supervisor who assigned it.
    pub supervisor_id: PrincipalId,
    /// Ordered exercises.
    pub exercises: Vec<ExerciseDto>,
}
