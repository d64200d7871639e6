//! Runtime configuration loaded from `config.toml`.
//!
//! Lookup order: explicit path, then `PREFKEEP_CONFIG`, then
//! `<data dir>/prefkeep/config.toml`. No config file means defaults.

use crate::core::error::PrefError;
use crate::core::schemas;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "PREFKEEP_CONFIG";
const APP_DIR: &str = "prefkeep";
const CONFIG_FILE: &str = "config.toml";
const FALLBACK_DIR: &str = ".prefkeep";

/// Default deferral before the theme toggle is driven during restoration.
pub const DEFAULT_THEME_RESTORE_DELAY_MS: u64 = 500;

/// How restoration decides how many toggles to issue.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeStrategy {
    /// Assume the toggle starts light: dark = 1 flip, light = 2 flips.
    #[default]
    AssumeLight,
    /// Query the toggle's current state first and flip only if needed.
    QueryFirst,
}

impl std::str::FromStr for ThemeStrategy {
    type Err = PrefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "assume-light" => Ok(ThemeStrategy::AssumeLight),
            "query-first" => Ok(ThemeStrategy::QueryFirst),
            other => Err(PrefError::Config(format!(
                "unknown theme strategy '{}' (expected assume-light or query-first)",
                other
            ))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database_path: PathBuf,
    pub theme_restore_delay_ms: u64,
    pub theme_strategy: ThemeStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: app_dir().join(schemas::PREFERENCES_DB_NAME),
            theme_restore_delay_ms: DEFAULT_THEME_RESTORE_DELAY_MS,
            theme_strategy: ThemeStrategy::default(),
        }
    }
}

impl Config {
    pub fn theme_restore_delay(&self) -> Duration {
        Duration::from_millis(self.theme_restore_delay_ms)
    }
}

/// Platform data directory for prefkeep, or `./.prefkeep` when none exists.
pub fn app_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR))
}

pub fn default_config_path() -> PathBuf {
    app_dir().join(CONFIG_FILE)
}

/// Resolve which config file to read, if any.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) if !path.is_empty() => PathBuf::from(path),
        _ => default_config_path(),
    }
}

/// Load config from `path`. A missing file yields defaults; an explicitly
/// requested file that is missing is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, PrefError> {
    let config_path = resolve_config_path(explicit);

    if !config_path.exists() {
        if explicit.is_some() {
            return Err(PrefError::Config(format!(
                "config file not found: {}",
                config_path.display()
            )));
        }
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&config_path)?;
    parse_config(&content)
        .map_err(|e| PrefError::Config(format!("{}: {}", config_path.display(), e)))
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}
