//! Persistence layer: PostgreSQL storage for users, plans, and the
//! durable notification log.
//!
//! The fanout orchestrator consumes storage only through the
//! [`NotificationLog`] trait, an opaque append service. The concrete
//! implementation uses `sqlx::PgPool` for async PostgreSQL access; the
//! database serializes concurrent appends for the same recipient.

pub mod models;
pub mod postgres;

use std::future::Future;

use crate::domain::{NotificationEvent, PrincipalId};
use crate::error::GatewayError;
use models::NotificationRecord;

pub use postgres::PostgresStore;

/// Maximum number of records returned by a notification fetch.
pub const NOTIFICATION_FETCH_LIMIT: usize = 100;

/// Durable notification log: append, reconciliation fetch, and
/// acknowledgement.
///
/// The append is the delivery guarantee: it sits on the critical path of
/// the enclosing domain operation, unlike push and side-channel sends.
/// The fetch and acknowledgement operations back the polling
/// reconciliation surface.
pub trait NotificationLog: Send + Sync {
    /// Appends one record for `recipient` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure, which must
    /// fail the enclosing domain operation.
    fn append(
        &self,
        recipient: PrincipalId,
        event: &NotificationEvent,
    ) -> impl Future<Output = Result<NotificationRecord, GatewayError>> + Send;

    /// Returns `recipient`'s most recent records, newest first, capped
    /// at [`NOTIFICATION_FETCH_LIMIT`].
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    fn list_recent(
        &self,
        recipient: PrincipalId,
    ) -> impl Future<Output = Result<Vec<NotificationRecord>, GatewayError>> + Send;

    /// Flips a record's `read` flag, scoped to its owner.
    ///
    /// Returns `false` (not an error) for an unknown record or one owned
    /// by another recipient. Idempotent: re-marking an already read
    /// record returns `true` again.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Storage`] on database failure.
    fn mark_read(
        &self,
        id: i64,
        recipient: PrincipalId,
    ) -> impl Future<Output = Result<bool, GatewayError>> + Send;
}
