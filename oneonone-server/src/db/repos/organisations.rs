//! Organisation repository

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::DbError;
use crate::models::{DisplayName, Email};

/// Organisation record from database
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organisation {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Fields for a new organisation
#[derive(Debug, Clone)]
pub struct NewOrganisation {
    pub name: DisplayName,
    pub email: Email,
}

/// Organisation repository
pub struct OrganisationRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> OrganisationRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new: NewOrganisation) -> Result<Organisation, DbError> {
        let org: Organisation = sqlx::query_as(
            r#"
            INSERT INTO organisations (name, email)
            VALUES ($1, $2)
            RETURNING id, name, email, created_at
            "#,
        )
        .bind(new.name.as_str())
        .bind(new.email.as_str())
        .fetch_one(self.pool)
        .await?;

        Ok(org)
    }

    pub async fn get(&self, id: Uuid) -> Result<Organisation, DbError> {
        sqlx::query_as(
            r#"
            SELECT id, name, email, created_at
            FROM organisations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("organisation", id))
    }
}
