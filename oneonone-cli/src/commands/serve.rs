//! HTTP server command
//!
//! Flags override the config file, which overrides built-in defaults.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use oneonone_core::AppConfig;
use oneonone_server::db::{create_pool, migrations};
use oneonone_server::{run_server, AppState, MemoryStore, PgStore, ServerConfig, Store};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: 127.0.0.1:3030)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Database URL (overrides config/environment)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Keep everything in memory, ignoring any database URL
    #[arg(long)]
    pub in_memory: bool,

    /// IANA timezone used to group meetings by day
    #[arg(long)]
    pub timezone: Option<String>,

    /// Skip creating tables on startup
    #[arg(long)]
    pub no_migrate: bool,
}

impl ServeArgs {
    fn apply(&self, config: &mut AppConfig) {
        if let Some(bind) = self.bind {
            config.server.bind = bind;
        }
        if self.cors_permissive {
            config.server.cors_permissive = true;
        }
        if let Some(url) = &self.database_url {
            config.database.url = Some(url.clone());
        }
        if let Some(tz) = &self.timezone {
            config.display.timezone = tz.clone();
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config_path: Option<&Path>) -> Result<()> {
    let mut config = crate::config::load(config_path)?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    crate::init_tracing(&config.log.level).ok();

    let timezone = config.timezone()?;
    let store: Arc<dyn Store> = if args.in_memory {
        tracing::warn!("using in-memory store, data will not survive a restart");
        Arc::new(MemoryStore::new())
    } else {
        let url = config.database.url.as_deref().context(
            "DATABASE_URL not set. Set via --database-url, DATABASE_URL env, \
             ~/.oneonone/.env or [database] url in the config file",
        )?;
        let pool = create_pool(url, config.database.max_connections)
            .await
            .context("Failed to create database pool")?;
        if !args.no_migrate {
            migrations::run(&pool)
                .await
                .context("Failed to run migrations")?;
        }
        Arc::new(PgStore::new(pool))
    };

    tracing::info!("Starting oneonone server on {}", config.server.bind);

    run_server(AppState::new(store, timezone), ServerConfig::from(&config))
        .await
        .context("Server error")?;

    Ok(())
}
