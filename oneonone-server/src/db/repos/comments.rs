//! Comment repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{ensure_exists, DbError, User};
use crate::models::CommentContent;

/// Comment record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub user_id: Uuid,
    pub talking_point_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Comment with its author, for the thread view
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    #[serde(flatten)]
    pub comment: Comment,
    pub user: User,
}

/// Fields for a new comment
#[derive(Debug, Clone)]
pub struct NewComment {
    pub content: CommentContent,
    pub user_id: Uuid,
    pub talking_point_id: Uuid,
}

/// Comment repository
pub struct CommentRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> CommentRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a comment.
    ///
    /// The talking point is checked before the author, each reported as not found.
    pub async fn create(&self, new: NewComment) -> Result<Comment, DbError> {
        let mut tx = self.pool.begin().await?;

        ensure_exists(&mut tx, "talking_points", new.talking_point_id, "talking point").await?;
        ensure_exists(&mut tx, "users", new.user_id, "user").await?;

        let comment = sqlx::query_as(
            r#"
            INSERT INTO comments (content, user_id, talking_point_id)
            VALUES ($1, $2, $3)
            RETURNING id, content, user_id, talking_point_id, created_at
            "#,
        )
        .bind(new.content.as_str())
        .bind(new.user_id)
        .bind(new.talking_point_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(comment)
    }

    /// Comments of a talking point with authors, oldest first.
    ///
    /// Single query with JOIN.
    pub async fn list_for_talking_point(
        &self,
        talking_point_id: Uuid,
    ) -> Result<Vec<CommentWithUser>, DbError> {
        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT
                c.id,
                c.content,
                c.user_id,
                c.talking_point_id,
                c.created_at,
                u.email,
                u.first_name,
                u.last_name,
                u.color,
                u.role,
                u.organisation_id,
                u.created_at AS user_created_at
            FROM comments c
            JOIN users u ON u.id = c.user_id
            WHERE c.talking_point_id = $1
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(talking_point_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentWithUser::from).collect())
    }

    /// Delete a comment of a talking point. Siblings are untouched.
    pub async fn delete(&self, talking_point_id: Uuid, comment_id: Uuid) -> Result<(), DbError> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1 AND talking_point_id = $2")
            .bind(comment_id)
            .bind(talking_point_id)
            .execute(self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(DbError::not_found("comment", comment_id));
        }
        Ok(())
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: Uuid,
    content: String,
    user_id: Uuid,
    talking_point_id: Uuid,
    created_at: DateTime<Utc>,
    email: String,
    first_name: String,
    last_name: String,
    color: String,
    #[sqlx(try_from = "String")]
    role: crate::models::Role,
    organisation_id: Option<Uuid>,
    user_created_at: DateTime<Utc>,
}

impl From<CommentRow> for CommentWithUser {
    fn from(row: CommentRow) -> Self {
        Self {
            comment: Comment {
                id: row.id,
                content: row.content,
                user_id: row.user_id,
                talking_point_id: row.talking_point_id,
                created_at: row.created_at,
            },
            user: User {
                id: row.user_id,
                email: row.email,
                first_name: row.first_name,
                last_name: row.last_name,
                color: row.color,
                role: row.role,
                organisation_id: row.organisation_id,
                created_at: row.user_created_at,
            },
        }
    }
}
