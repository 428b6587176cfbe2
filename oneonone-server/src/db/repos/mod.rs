//! Repository implementations for database access
//!
//! Each repository follows these patterns:
//! - Uses JOINs for list operations (no N+1)
//! - Relies on DB constraints and maps violations to `DbError::Conflict`
//! - Uses transactions for multi-table writes

pub mod organisations;
pub mod users;
pub mod meetings;
pub mod talking_points;
pub mod comments;
pub mod tags;

pub use organisations::{NewOrganisation, Organisation, OrganisationRepo};
pub use users::{NewUser, User, UserRepo};
pub use meetings::{Meeting, MeetingRepo, MeetingWithInvitee, NewMeeting};
pub use talking_points::{
    NewTalkingPoint, TagToggle, TalkingPoint, TalkingPointDetail, TalkingPointRepo,
    TalkingPointSummary,
};
pub use comments::{Comment, CommentRepo, CommentWithUser, NewComment};
pub use tags::{NewTag, Tag, TagRepo};

use sqlx::{Postgres, Transaction};
use uuid::Uuid;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {resource} with this {field} already exists")]
    Conflict {
        resource: &'static str,
        field: &'static str,
    },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    /// Map a unique-constraint violation to `Conflict`, pass anything else through.
    pub(crate) fn from_unique(
        err: sqlx::Error,
        resource: &'static str,
        field: &'static str,
    ) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Self::Conflict { resource, field }
            }
            _ => Self::Sqlx(err),
        }
    }
}

/// Fail with `NotFound` unless `table` has a row with this id.
///
/// `table` is always a literal from this module, never user input.
pub(crate) async fn ensure_exists(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    id: Uuid,
    resource: &'static str,
) -> Result<(), DbError> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = $1)");
    let exists: (bool,) = sqlx::query_as(&sql).bind(id).fetch_one(&mut **tx).await?;

    if !exists.0 {
        return Err(DbError::not_found(resource, id));
    }
    Ok(())
}
