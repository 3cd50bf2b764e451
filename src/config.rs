use crate::feed::{DEFAULT_BASE_URL, DEFAULT_WINDOW_DAYS};
use anyhow::{Context, Result, anyhow};
use chrono_tz::Tz;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Overrides the directory holding `config.toml` and the state store.
pub const CONFIG_DIR_ENV: &str = "KSE_SCHEDULE_CONFIG_DIR";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub groups: GroupsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub base_url: String,
    pub window_days: u64,
    /// Zone named in the feed's `TZID` parameters.
    pub timezone: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupsConfig {
    pub catalog_path: Option<PathBuf>,
    pub max_selected: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            window_days: DEFAULT_WINDOW_DAYS,
            timezone: "Europe/Kiev".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for GroupsConfig {
    fn default() -> Self {
        Self { catalog_path: None, max_selected: 20 }
    }
}

impl FeedConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown timezone '{}': {}", self.timezone, e))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;

        // If config doesn't exist, create default
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&config_path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    pub fn save(&self) -> Result<()> {
        let config_path = get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Catalog file: the configured path, or `groups.txt` next to the config.
    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.groups.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(config_dir()?.join("groups.txt")),
        }
    }
}

pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let proj_dirs = ProjectDirs::from("ua", "kse", "kse-schedule")
        .context("Failed to determine config directory")?;
    Ok(proj_dirs.config_dir().to_path_buf())
}

pub fn get_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}
