//! Tag repository

use chrono::{DateTime, Utc};
use oneonone_core::TagMention;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{DisplayName, HexColor};

/// Tag record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub organisation_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new tag
#[derive(Debug, Clone)]
pub struct NewTag {
    pub name: DisplayName,
    pub color: HexColor,
    pub organisation_id: Uuid,
}

/// Tag repository
pub struct TagRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> TagRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a tag. Names are unique system-wide.
    pub async fn create(&self, new: NewTag) -> Result<Tag, DbError> {
        sqlx::query_as(
            r#"
            INSERT INTO tags (name, color, organisation_id)
            VALUES ($1, $2, $3)
            RETURNING id, name, color, organisation_id, created_at
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.color.as_str())
        .bind(new.organisation_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                DbError::not_found("organisation", new.organisation_id)
            }
            _ => DbError::from_unique(e, "tag", "name"),
        })
    }

    /// All tags by name.
    pub async fn list(&self) -> Result<Vec<Tag>, DbError> {
        let tags = sqlx::query_as(
            r#"
            SELECT id, name, color, organisation_id, created_at
            FROM tags
            ORDER BY name
            "#,
        )
        .fetch_all(self.pool)
        .await?;
        Ok(tags)
    }

    /// Tags on talking points of meetings the user takes part in,
    /// dated by the talking point.
    pub async fn mentions_for_user(&self, user_id: Uuid) -> Result<Vec<TagMention>, DbError> {
        let rows: Vec<(Uuid, String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            SELECT t.id, t.name, t.color, tp.created_at
            FROM talking_point_tags tpt
            JOIN tags t ON t.id = tpt.tag_id
            JOIN talking_points tp ON tp.id = tpt.talking_point_id
            JOIN meetings m ON m.id = tp.meeting_id
            WHERE m.author_id = $1 OR m.invitee_id = $1
            ORDER BY tp.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(tag_id, name, color, mentioned_at)| TagMention {
                tag_id,
                name,
                color,
                mentioned_at,
            })
            .collect())
    }
}
