//! PostgreSQL implementation of the persistence layer.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{ExerciseRow, NewExercise, NotificationRecord, PlanRow, UserRow, UserSummary};
use super::{NOTIFICATION_FETCH_LIMIT, NotificationLog};
use crate::domain::{NotificationEvent, PrincipalId, Role};
use crate::error::GatewayError;

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

/// Maps a database failure into the storage error variant.
fn storage_err(e: sqlx::Error) -> GatewayError {
    GatewayError::Storage(e.to_string())
}

/// Maps a raw user tuple, validating the stored role string.
fn map_user_row(
    (id, name, email, password_hash, role): (i64, String, String, String, String),
) -> Result<UserRow, GatewayError> {
    let role = Role::parse(&role)
        .ok_or_else(|| GatewayError::Internal(format!("unknown role in users table: {role}")))?;
    Ok(UserRow {
        id: PrincipalId::new(id),
        name,
        email,
        password_hash,
        role,
    })
}

impl PostgresStore {
    /// Creates a new store with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user and returns the full row.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EmailTaken`] when the email is already
    /// registered, or [`GatewayError::Storage`] on any other database
    /// failure.
    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<UserRow, GatewayError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => GatewayError::EmailTaken,
            _ => storage_err(e),
        })?;

        Ok(UserRow {
            id: PrincipalId::new(id),
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            role,
        })
    }

    /// Looks a user up by email.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRow>, GatewayError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
            "SELECT id, name, email, password_hash, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(map_user_row).transpose()
    }

    /// Looks a subject up by ID. Users with any other role yield `None`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn find_subject(&self, id: PrincipalId) -> Result<Option<UserRow>, GatewayError> {
        let row = sqlx::query_as::<_, (i64, String, String, String, String)>(
            "SELECT id, name, email, password_hash, role FROM users WHERE id = $1 AND role = 'SUBJECT'",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        row.map(map_user_row).transpose()
    }

    /// Lists all subjects, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn list_subjects(&self) -> Result<Vec<UserSummary>, GatewayError> {
        self.list_by_role(Role::Subject).await
    }

    /// Lists all supervisors, newest first. Used to resolve the
    /// recipients of a `NEW_SUBJECT` fanout.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn list_supervisors(&self) -> Result<Vec<UserSummary>, GatewayError> {
        self.list_by_role(Role::Supervisor).await
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<UserSummary>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, name, email FROM users WHERE role = $1 ORDER BY created_at DESC",
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows
            .into_iter()
            .map(|(id, name, email)| UserSummary {
                id: PrincipalId::new(id),
                name,
                email,
            })
            .collect())
    }

    /// Inserts a plan with its exercises in one transaction and returns
    /// the plan ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn create_plan(
        &self,
        subject: PrincipalId,
        supervisor: PrincipalId,
        title: &str,
        notes: &str,
        exercises: &[NewExercise],
    ) -> Result<i64, GatewayError> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let plan_id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO plans (subject_id, supervisor_id, title, notes) VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(subject)
        .bind(supervisor)
        .bind(title)
        .bind(notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(storage_err)?;

        for (idx, exercise) in exercises.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let order_index = idx as i32;
            sqlx::query(
                "INSERT INTO plan_exercises (plan_id, exercise_name, sets, reps, rest_seconds, order_index) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(plan_id)
            .bind(&exercise.exercise_name)
            .bind(exercise.sets)
            .bind(&exercise.reps)
            .bind(exercise.rest_seconds)
            .bind(order_index)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;
        }

        tx.commit().await.map_err(storage_err)?;
        Ok(plan_id)
    }

    /// Fetches a plan by ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn get_plan(&self, id: i64) -> Result<Option<PlanRow>, GatewayError> {
        let row = sqlx::query_as::<_, (i64, i64, i64, String, String, DateTime<Utc>)>(
            "SELECT id, subject_id, supervisor_id, title, notes, created_at FROM plans WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(row.map(
            |(id, subject_id, supervisor_id, title, notes, created_at)| PlanRow {
                id,
                subject_id: PrincipalId::new(subject_id),
                supervisor_id: PrincipalId::new(supervisor_id),
                title,
                notes,
                created_at,
            },
        ))
    }

    /// Fetches a plan's exercises in assignment order.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn list_exercises(&self, plan_id: i64) -> Result<Vec<ExerciseRow>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, String, i32, String, i32, i32)>(
            "SELECT id, exercise_name, sets, reps, rest_seconds, order_index \
             FROM plan_exercises WHERE plan_id = $1 ORDER BY order_index ASC",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(id, exercise_name, sets, reps, rest_seconds, order_index)| ExerciseRow {
                    id,
                    exercise_name,
                    sets,
                    reps,
                    rest_seconds,
                    order_index,
                },
            )
            .collect())
    }

    /// Fetches a recipient's most recent notifications, newest first,
    /// capped at 100.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn list_notifications(
        &self,
        recipient: PrincipalId,
    ) -> Result<Vec<NotificationRecord>, GatewayError> {
        let rows = sqlx::query_as::<_, (i64, i64, String, serde_json::Value, bool, DateTime<Utc>)>(
            "SELECT id, recipient_id, kind, payload, read, created_at FROM notifications \
             WHERE recipient_id = $1 ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(recipient)
        .bind(NOTIFICATION_FETCH_LIMIT as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(rows
            .into_iter()
            .map(
                |(id, recipient_id, kind, payload, read, created_at)| NotificationRecord {
                    id,
                    recipient_id: PrincipalId::new(recipient_id),
                    kind,
                    payload,
                    read,
                    created_at,
                },
            )
            .collect())
    }

    /// Flips a notification's `read` flag, scoped to its owner.
    ///
    /// Returns `false` (not an error) when the record does not exist or
    /// belongs to another recipient. Idempotent: re-marking an already
    /// read record succeeds and leaves `read = true`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    pub async fn mark_notification_read(
        &self,
        id: i64,
        recipient: PrincipalId,
    ) -> Result<bool, GatewayError> {
        let result = sqlx::query("UPDATE notifications SET read = TRUE WHERE id = $1 AND recipient_id = $2")
            .bind(id)
            .bind(recipient)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;

        Ok(result.rows_affected() > 0)
    }
}

impl NotificationLog for PostgresStore {
    async fn append(
        &self,
        recipient: PrincipalId,
        event: &NotificationEvent,
    ) -> Result<NotificationRecord, GatewayError> {
        let kind = event.kind().as_str();
        let payload = event.payload_json();

        let row = sqlx::query_as::<_, (i64, DateTime<Utc>)>(
            "INSERT INTO notifications (recipient_id, kind, payload) VALUES ($1, $2, $3) \
             RETURNING id, created_at",
        )
        .bind(recipient)
        .bind(kind)
        .bind(&payload)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(NotificationRecord {
            id: row.0,
            recipient_id: recipient,
            kind: kind.to_string(),
            payload,
            read: false,
            created_at: row.1,
        })
    }

    async fn list_recent(
        &self,
        recipient: PrincipalId,
    ) -> Result<Vec<NotificationRecord>, GatewayError> {
        self.list_notifications(recipient).await
    }

    async fn mark_read(&self, id: i64, recipient: PrincipalId) -> Result<bool, GatewayError> {
        self.mark_notification_read(id, recipient).await
    }
}
