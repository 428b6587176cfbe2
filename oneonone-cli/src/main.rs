//! oneonone CLI - run and administer the one-on-one meetings service
//!
//! - `serve`: start the HTTP server (Postgres or in-memory store)
//! - `migrate`: create the database schema
//! - `config`: write, inspect and validate `~/.oneonone/config.toml`
//! - `completions`: shell completion scripts

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(
    name = "oneonone",
    version,
    about = "One-on-one meeting service",
    long_about = "Schedule one-on-one meetings, collect talking points, tag them \
                  and discuss them in threaded comments."
)]
struct Cli {
    /// Config file to use instead of ~/.oneonone/config.toml
    #[arg(long, global = true, env = "ONEONONE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP server
    Serve(commands::ServeArgs),
    /// Create database tables and indexes
    Migrate(commands::MigrateArgs),
    /// Manage oneonone configuration (init, show, path, validate)
    Config(config::ConfigArgs),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Console logging. `RUST_LOG` wins over the configured level.
pub(crate) fn init_tracing(level: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

/// Load `.env` from ~/.oneonone then the working directory. Existing
/// variables are never overwritten.
fn load_env_files() {
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".oneonone/.env"));
    }
    let _ = dotenvy::dotenv();
}

#[tokio::main]
async fn main() -> Result<()> {
    load_env_files();
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, cli.config.as_deref()).await?,
        Commands::Migrate(args) => commands::run_migrate(args, cli.config.as_deref()).await?,
        Commands::Config(args) => config::run_config(args, cli.config.as_deref())?,
        Commands::Completions(args) => run_completions(args)?,
    }

    Ok(())
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
