use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use oneonone_core::AppConfig;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Write a config file with default values
    Init(InitArgs),
    /// Print the effective config (file, then environment overrides)
    Show,
    /// Check the config file can be loaded
    Validate,
    /// Show config file path
    Path,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Force overwrite existing config
    #[arg(long, short)]
    pub force: bool,
}

/// Load from an explicit path, or the default location with defaults as fallback
pub fn load(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AppConfig::load().context("Failed to load config"),
    }
}

fn target_path(path: Option<&Path>) -> PathBuf {
    path.map(Path::to_path_buf)
        .unwrap_or_else(AppConfig::config_path)
}

pub fn run_config(args: ConfigArgs, path: Option<&Path>) -> Result<()> {
    match args.command {
        ConfigCommands::Init(args) => run_init(args, &target_path(path)),
        ConfigCommands::Show => run_show(path),
        ConfigCommands::Validate => run_validate(path),
        ConfigCommands::Path => {
            println!("{}", target_path(path).display());
            Ok(())
        }
    }
}

fn run_init(args: InitArgs, config_path: &Path) -> Result<()> {
    if config_path.exists() && !args.force {
        return Err(anyhow::anyhow!(
            "Config already exists at {:?}\n\nUse --force to overwrite",
            config_path
        ));
    }

    AppConfig::default()
        .save_to(config_path)
        .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

    println!("✅ Created config at: {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Edit the config: $EDITOR {:?}", config_path);
    println!("  2. Set [database] url, or export DATABASE_URL");
    println!("  3. Run: oneonone migrate");

    Ok(())
}

fn run_show(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    let rendered = toml::to_string_pretty(&config).context("Failed to render config")?;
    print!("{rendered}");
    Ok(())
}

fn run_validate(path: Option<&Path>) -> Result<()> {
    let config = load(path)?;
    println!("✅ Config is valid");
    println!("   bind:     {}", config.server.bind);
    println!("   timezone: {}", config.display.timezone);
    println!(
        "   database: {}",
        if config.database.url.is_some() { "configured" } else { "not set" }
    );
    Ok(())
}
