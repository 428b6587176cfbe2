//! Schema migrations
//!
//! Idempotent `CREATE ... IF NOT EXISTS` statements, run in order.

use sqlx::PgPool;

const STATEMENTS: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS organisations (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        email TEXT NOT NULL UNIQUE,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        color TEXT NOT NULL,
        role TEXT NOT NULL DEFAULT 'employee',
        organisation_id UUID REFERENCES organisations(id) ON DELETE SET NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS passwords (
        user_id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
        hash TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS meetings (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL,
        date TIMESTAMPTZ NOT NULL,
        author_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        invitee_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS talking_points (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        title TEXT NOT NULL,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        meeting_id UUID NOT NULL REFERENCES meetings(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS comments (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        content TEXT NOT NULL,
        user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        talking_point_id UUID NOT NULL REFERENCES talking_points(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
        name TEXT NOT NULL UNIQUE,
        color TEXT NOT NULL,
        organisation_id UUID NOT NULL REFERENCES organisations(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS talking_point_tags (
        talking_point_id UUID NOT NULL REFERENCES talking_points(id) ON DELETE CASCADE,
        tag_id UUID NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (talking_point_id, tag_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_meetings_author_date ON meetings(author_id, date)",
    "CREATE INDEX IF NOT EXISTS idx_meetings_invitee ON meetings(invitee_id)",
    "CREATE INDEX IF NOT EXISTS idx_tp_meeting ON talking_points(meeting_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_comments_tp ON comments(talking_point_id, created_at)",
    "CREATE INDEX IF NOT EXISTS idx_talking_point_tags_tag ON talking_point_tags(tag_id)",
];

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!(statements = STATEMENTS.len(), "running migrations");

    for sql in STATEMENTS {
        sqlx::query(sql).execute(pool).await?;
    }

    tracing::info!("migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_created_before_indexes() {
        let first_index = STATEMENTS
            .iter()
            .position(|s| s.contains("CREATE INDEX"))
            .unwrap();
        assert!(STATEMENTS[..first_index]
            .iter()
            .all(|s| s.contains("CREATE TABLE")));
        assert!(STATEMENTS[first_index..]
            .iter()
            .all(|s| s.contains("CREATE INDEX")));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn migrations_are_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url, 2).await.expect("pool creation failed");

        run(&pool).await.expect("first run");
        run(&pool).await.expect("second run");
    }
}
