//! User repository
//!
//! Registration writes the user and its password row in one transaction.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{DisplayName, Email, HexColor, Role};

/// Columns selected for every user read
pub(crate) const USER_COLUMNS: &str =
    "id, email, first_name, last_name, color, role, organisation_id, created_at";

/// User record from database (never carries the password hash)
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub color: String,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub organisation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Fields for a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: Email,
    pub first_name: DisplayName,
    pub last_name: DisplayName,
    /// argon2 PHC string
    pub password_hash: String,
    pub color: HexColor,
    pub role: Role,
    pub organisation_id: Option<Uuid>,
}

/// User repository
pub struct UserRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create user + password (atomic).
    ///
    /// A duplicate email surfaces as `DbError::Conflict`.
    pub async fn create(&self, new: NewUser) -> Result<User, DbError> {
        let mut tx = self.pool.begin().await?;

        let user: User = sqlx::query_as(&format!(
            r#"
            INSERT INTO users (email, first_name, last_name, color, role, organisation_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(new.email.as_str())
        .bind(new.first_name.as_str())
        .bind(new.last_name.as_str())
        .bind(new.color.as_str())
        .bind(new.role.as_str())
        .bind(new.organisation_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DbError::from_unique(e, "user", "email"))?;

        sqlx::query("INSERT INTO passwords (user_id, hash) VALUES ($1, $2)")
            .bind(user.id)
            .bind(&new.password_hash)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user)
    }

    /// Get a user by id.
    pub async fn get(&self, id: Uuid) -> Result<User, DbError> {
        sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("user", id))
    }

    /// Find a user by (normalised) email.
    pub async fn find_by_email(&self, email: &Email) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// List users, optionally limited to one organisation, by name.
    pub async fn list(&self, organisation_id: Option<Uuid>) -> Result<Vec<User>, DbError> {
        let users = sqlx::query_as(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE ($1::uuid IS NULL OR organisation_id = $1)
            ORDER BY first_name, last_name
            "#
        ))
        .bind(organisation_id)
        .fetch_all(self.pool)
        .await?;
        Ok(users)
    }
}
