//! Schema migration command

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use oneonone_server::db::{create_pool, migrations};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

/// Create all tables and indexes. Safe to run repeatedly.
pub async fn run_migrate(args: MigrateArgs, config_path: Option<&Path>) -> Result<()> {
    let config = crate::config::load(config_path)?;
    crate::init_tracing(&config.log.level).ok();

    let url = args.database_url.or(config.database.url).context(
        "DATABASE_URL not set. Set via --database-url, DATABASE_URL env or the config file",
    )?;

    let pool = create_pool(&url, 1)
        .await
        .context("Failed to connect to database")?;
    migrations::run(&pool).await.context("Migration failed")?;

    println!("✅ Schema is up to date");
    Ok(())
}
