use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Environment variables consulted after the config file is read.
const ENV_DATABASE_URL: &str = "DATABASE_URL";
const ENV_BIND: &str = "ONEONONE_BIND";
const ENV_TIMEZONE: &str = "ONEONONE_TIMEZONE";
const ENV_LOG: &str = "ONEONONE_LOG";

/// Centralized configuration for the oneonone service
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub display: DisplaySection,
    pub log: LogSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    pub bind: SocketAddr,
    pub cors_permissive: bool,
    pub request_timeout_secs: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3030)),
            cors_permissive: false,
            request_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplaySection {
    /// IANA zone used to decide which calendar day a meeting falls on
    pub timezone: String,
}

impl Default for DisplaySection {
    fn default() -> Self {
        Self {
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogSection {
    pub level: String,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Get config file path: ~/.oneonone/config.toml
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".oneonone/config.toml")
    }

    /// Load config from the default location, falling back to defaults
    /// when no file exists. Environment overrides are always applied.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        let mut config = if path.exists() {
            Self::read_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load config from an explicit path. Fails if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let mut config = Self::read_file(path)?;
        config.apply_env(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file and expand `${VAR}` references in string values.
    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self =
            toml::from_str(&content).map_err(|source| CoreError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        let vars: HashMap<String, String> = env::vars().collect();
        config.expand_variables(&vars);
        Ok(config)
    }

    /// Apply environment overrides. `lookup` is injected so tests don't
    /// touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.is_empty()) {
            self.database.url = Some(url);
        }
        if let Some(bind) = lookup(ENV_BIND).and_then(|v| v.parse().ok()) {
            self.server.bind = bind;
        }
        if let Some(tz) = lookup(ENV_TIMEZONE).filter(|v| !v.is_empty()) {
            self.display.timezone = tz;
        }
        if let Some(level) = lookup(ENV_LOG).filter(|v| !v.is_empty()) {
            self.log.level = level;
        }
    }

    /// Expand ${var} references in string values
    pub fn expand_variables(&mut self, vars: &HashMap<String, String>) {
        if let Some(ref url) = self.database.url {
            self.database.url = Some(Self::expand_string(url, vars));
        }
        self.display.timezone = Self::expand_string(&self.display.timezone, vars);
    }

    /// Expand ${var} references in a string
    fn expand_string(s: &str, vars: &HashMap<String, String>) -> String {
        let mut result = s.to_string();

        for (key, value) in vars {
            let pattern = format!("${{{}}}", key);
            result = result.replace(&pattern, value);
        }

        result
    }

    /// Check values that serde cannot check on its own
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        if self.database.max_connections == 0 {
            return Err(CoreError::invalid_value(
                "database.max_connections",
                "must be at least 1",
            ));
        }

        if self.server.request_timeout_secs == 0 {
            return Err(CoreError::invalid_value(
                "server.request_timeout_secs",
                "must be at least 1",
            ));
        }

        Ok(())
    }

    /// Parsed display timezone
    pub fn timezone(&self) -> Result<Tz> {
        self.display.timezone.parse::<Tz>().map_err(|_| {
            CoreError::invalid_value(
                "display.timezone",
                format!("unknown zone '{}'", self.display.timezone),
            )
        })
    }

    /// Save config to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_str = toml::to_string_pretty(self)?;
        fs::write(path, toml_str)?;
        Ok(())
    }
}
