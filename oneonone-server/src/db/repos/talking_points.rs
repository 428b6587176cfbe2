//! Talking point repository
//!
//! Handles talking point CRUD with:
//! - Atomic creation with tag links (transaction)
//! - Tag toggling (transaction)
//! - Meeting listing with comment counts and tags in two queries

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

use super::users::USER_COLUMNS;
use super::{ensure_exists, DbError, Tag, User};
use crate::models::Title;

/// Talking point record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPoint {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Talking point for list display: tags plus comment count
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPointSummary {
    pub id: Uuid,
    pub title: String,
    pub meeting_id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub comment_count: i64,
    pub tags: Vec<Tag>,
}

/// Talking point with its creator and tags
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TalkingPointDetail {
    #[serde(flatten)]
    pub talking_point: TalkingPoint,
    pub user: User,
    pub tags: Vec<Tag>,
}

/// Fields for a new talking point
#[derive(Debug, Clone)]
pub struct NewTalkingPoint {
    pub title: Title,
    pub user_id: Uuid,
    pub meeting_id: Uuid,
    pub tag_ids: Vec<Uuid>,
}

/// Outcome of toggling a tag on a talking point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TagToggle {
    Added,
    Removed,
}

const TAG_COLUMNS: &str = "t.id, t.name, t.color, t.organisation_id, t.created_at";

/// Talking point repository
pub struct TalkingPointRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TalkingPointRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a talking point and link its tags (atomic).
    ///
    /// Unknown meeting, user or tag ids abort the whole write.
    pub async fn create(&self, new: NewTalkingPoint) -> Result<TalkingPointSummary, DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_exists(&mut tx, "meetings", new.meeting_id, "meeting").await?;
        ensure_exists(&mut tx, "users", new.user_id, "user").await?;

        let mut tag_ids = new.tag_ids.clone();
        tag_ids.sort();
        tag_ids.dedup();

        let tags: Vec<Tag> = sqlx::query_as(&format!(
            "SELECT {TAG_COLUMNS} FROM tags t WHERE t.id = ANY($1) ORDER BY t.name"
        ))
        .bind(&tag_ids)
        .fetch_all(&mut *tx)
        .await?;

        if let Some(missing) = tag_ids.iter().find(|id| !tags.iter().any(|t| t.id == **id)) {
            return Err(DbError::not_found("tag", missing));
        }

        let tp: TalkingPoint = sqlx::query_as(
            r#"
            INSERT INTO talking_points (title, user_id, meeting_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, user_id, meeting_id, created_at
            "#,
        )
        .bind(new.title.as_str())
        .bind(new.user_id)
        .bind(new.meeting_id)
        .fetch_one(&mut *tx)
        .await?;

        for tag in &tags {
            sqlx::query(
                r#"
                INSERT INTO talking_point_tags (talking_point_id, tag_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(tp.id)
            .bind(tag.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(TalkingPointSummary {
            id: tp.id,
            title: tp.title,
            meeting_id: tp.meeting_id,
            user_id: tp.user_id,
            created_at: tp.created_at,
            comment_count: 0,
            tags,
        })
    }

    /// Get a talking point with creator and tags.
    pub async fn get_detail(&self, id: Uuid) -> Result<TalkingPointDetail, DbError> {
        let talking_point: TalkingPoint = sqlx::query_as(
            r#"
            SELECT id, title, user_id, meeting_id, created_at
            FROM talking_points
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("talking point", id))?;

        let user: User = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(talking_point.user_id)
            .fetch_one(self.pool)
            .await?;

        let tags: Vec<Tag> = sqlx::query_as(&format!(
            r#"
            SELECT {TAG_COLUMNS}
            FROM tags t
            JOIN talking_point_tags tpt ON tpt.tag_id = t.id
            WHERE tpt.talking_point_id = $1
            ORDER BY t.name
            "#
        ))
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        Ok(TalkingPointDetail {
            talking_point,
            user,
            tags,
        })
    }

    /// Talking points of a meeting, oldest first, with comment counts and tags.
    pub async fn list_for_meeting(
        &self,
        meeting_id: Uuid,
    ) -> Result<Vec<TalkingPointSummary>, DbError> {
        let rows = sqlx::query(
            r#"
            SELECT
                tp.id,
                tp.title,
                tp.meeting_id,
                tp.user_id,
                tp.created_at,
                COUNT(c.id) AS comment_count
            FROM talking_points tp
            LEFT JOIN comments c ON c.talking_point_id = tp.id
            WHERE tp.meeting_id = $1
            GROUP BY tp.id
            ORDER BY tp.created_at ASC
            "#,
        )
        .bind(meeting_id)
        .fetch_all(self.pool)
        .await?;

        // One query for every tag of the meeting, grouped in memory
        let tag_rows = sqlx::query(&format!(
            r#"
            SELECT tpt.talking_point_id, {TAG_COLUMNS}
            FROM talking_point_tags tpt
            JOIN tags t ON t.id = tpt.tag_id
            JOIN talking_points tp ON tp.id = tpt.talking_point_id
            WHERE tp.meeting_id = $1
            ORDER BY t.name
            "#
        ))
        .bind(meeting_id)
        .fetch_all(self.pool)
        .await?;

        let mut tags_by_tp: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for row in &tag_rows {
            let tp_id: Uuid = row.try_get("talking_point_id")?;
            tags_by_tp.entry(tp_id).or_default().push(Tag::from_row(row)?);
        }

        rows.into_iter()
            .map(|r| {
                let id: Uuid = r.try_get("id")?;
                Ok(TalkingPointSummary {
                    id,
                    title: r.try_get("title")?,
                    meeting_id: r.try_get("meeting_id")?,
                    user_id: r.try_get("user_id")?,
                    created_at: r.try_get("created_at")?,
                    comment_count: r.try_get("comment_count")?,
                    tags: tags_by_tp.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Add the tag if absent, remove it if present (atomic).
    pub async fn toggle_tag(
        &self,
        talking_point_id: Uuid,
        tag_id: Uuid,
    ) -> Result<TagToggle, DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_exists(&mut tx, "talking_points", talking_point_id, "talking point").await?;
        ensure_exists(&mut tx, "tags", tag_id, "tag").await?;

        let removed = sqlx::query(
            "DELETE FROM talking_point_tags WHERE talking_point_id = $1 AND tag_id = $2",
        )
        .bind(talking_point_id)
        .bind(tag_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let outcome = if removed > 0 {
            TagToggle::Removed
        } else {
            sqlx::query("INSERT INTO talking_point_tags (talking_point_id, tag_id) VALUES ($1, $2)")
                .bind(talking_point_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
            TagToggle::Added
        };

        tx.commit().await?;
        Ok(outcome)
    }
}
