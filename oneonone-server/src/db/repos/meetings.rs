//! Meeting repository
//!
//! Handles meeting CRUD with:
//! - Participant checks and insert in one transaction
//! - Author listing with invitee and talking point count in one query

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::{DbError, User};
use crate::models::{MeetingDate, Role, Title};

/// Meeting record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meeting {
    pub id: Uuid,
    pub title: String,
    pub date: DateTime<Utc>,
    pub author_id: Uuid,
    pub invitee_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Meeting with its invitee and number of talking points
#[derive(Debug, Clone, PartialEq)]
pub struct MeetingWithInvitee {
    pub meeting: Meeting,
    pub invitee: User,
    pub talking_point_count: i64,
}

/// Fields for a new meeting
#[derive(Debug, Clone)]
pub struct NewMeeting {
    pub title: Title,
    pub date: MeetingDate,
    pub author_id: Uuid,
    pub invitee_id: Uuid,
}

/// Meeting repository
pub struct MeetingRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> MeetingRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a meeting after checking both participants exist (atomic).
    pub async fn create(&self, new: NewMeeting) -> Result<Meeting, DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_user(&mut tx, new.author_id, "user").await?;
        ensure_user(&mut tx, new.invitee_id, "invitee").await?;

        let meeting: Meeting = sqlx::query_as(
            r#"
            INSERT INTO meetings (title, date, author_id, invitee_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, date, author_id, invitee_id, created_at
            "#,
        )
        .bind(new.title.as_str())
        .bind(new.date.as_utc())
        .bind(new.author_id)
        .bind(new.invitee_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(meeting)
    }

    /// Get a single meeting by ID.
    pub async fn get(&self, id: Uuid) -> Result<Meeting, DbError> {
        sqlx::query_as(
            r#"
            SELECT id, title, date, author_id, invitee_id, created_at
            FROM meetings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("meeting", id))
    }

    /// Meetings authored by a user, earliest first, with invitee and
    /// talking point count.
    pub async fn list_for_author(
        &self,
        author_id: Uuid,
    ) -> Result<Vec<MeetingWithInvitee>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                m.id,
                m.title,
                m.date,
                m.author_id,
                m.invitee_id,
                m.created_at,
                u.email AS invitee_email,
                u.first_name AS invitee_first_name,
                u.last_name AS invitee_last_name,
                u.color AS invitee_color,
                u.role AS invitee_role,
                u.organisation_id AS invitee_organisation_id,
                u.created_at AS invitee_created_at,
                COUNT(tp.id) AS talking_point_count
            FROM meetings m
            JOIN users u ON u.id = m.invitee_id
            LEFT JOIN talking_points tp ON tp.meeting_id = m.id
            WHERE m.author_id = $1
            GROUP BY m.id, u.id
            ORDER BY m.date ASC, m.created_at ASC
            "#,
        )
        .bind(author_id)
        .fetch_all(self.pool)
        .await?;

        rows.iter().map(meeting_with_invitee).collect()
    }
}

async fn ensure_user(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    resource: &'static str,
) -> Result<(), DbError> {
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
        .bind(id)
        .fetch_one(&mut **tx)
        .await?;

    if !exists.0 {
        return Err(DbError::not_found(resource, id));
    }
    Ok(())
}

fn meeting_with_invitee(row: &PgRow) -> Result<MeetingWithInvitee, DbError> {
    let role: String = row.try_get("invitee_role")?;
    let role = Role::parse(&role).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;

    Ok(MeetingWithInvitee {
        meeting: Meeting {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            date: row.try_get("date")?,
            author_id: row.try_get("author_id")?,
            invitee_id: row.try_get("invitee_id")?,
            created_at: row.try_get("created_at")?,
        },
        invitee: User {
            id: row.try_get("invitee_id")?,
            email: row.try_get("invitee_email")?,
            first_name: row.try_get("invitee_first_name")?,
            last_name: row.try_get("invitee_last_name")?,
            color: row.try_get("invitee_color")?,
            role,
            organisation_id: row.try_get("invitee_organisation_id")?,
            created_at: row.try_get("invitee_created_at")?,
        },
        talking_point_count: row.try_get("talking_point_count")?,
    })
}
