//! User configuration management

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::notifier::NotifierConfig;
use crate::schedule::DEFAULT_UPCOMING_DAYS;
use crate::watch::{DEFAULT_LEAD_TIME_SECS, DEFAULT_POLL_INTERVAL};

/// Overrides `store_path` when set
pub const STORE_ENV: &str = "SSM_STORE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_store_path")]
    pub store_path: String,

    /// Seconds before an occurrence at which it is announced
    #[serde(default = "default_lead_time")]
    pub lead_time_secs: u64,

    /// Upper bound on the time between two reconciling passes
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_upcoming_days")]
    pub upcoming_days: u32,

    #[serde(default = "default_editor")]
    pub editor: String,

    #[serde(default)]
    pub notifier: NotifierConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            lead_time_secs: default_lead_time(),
            poll_interval_secs: default_poll_interval(),
            upcoming_days: default_upcoming_days(),
            editor: default_editor(),
            notifier: NotifierConfig::default(),
        }
    }
}

fn default_store_path() -> String {
    "~/.local/share/ssm.tsv".to_string()
}

fn default_lead_time() -> u64 {
    DEFAULT_LEAD_TIME_SECS as u64
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL.as_secs()
}

fn default_upcoming_days() -> u32 {
    DEFAULT_UPCOMING_DAYS
}

fn default_editor() -> String {
    "nvim".to_string()
}

pub fn get_app_dir() -> Result<PathBuf> {
    let dir = match dirs::config_dir() {
        Some(config) => config.join("ssm"),
        None => dirs::home_dir()
            .context("Cannot determine home directory")?
            .join(".ssm"),
    };
    Ok(dir)
}

fn config_path() -> Result<PathBuf> {
    Ok(get_app_dir()?.join("config.toml"))
}

impl Config {
    /// Load from the app dir, or defaults when no config file exists
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Store location after applying `SSM_STORE` and expanding `~`
    pub fn resolved_store_path(&self) -> PathBuf {
        match std::env::var(STORE_ENV) {
            Ok(path) if !path.is_empty() => expand_home(&path),
            _ => expand_home(&self.store_path),
        }
    }

    /// Saturates at the largest span chrono can represent
    pub fn lead_time(&self) -> chrono::Duration {
        i64::try_from(self.lead_time_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or(chrono::Duration::MAX)
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        // A zero interval would spin the daemon
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }

    /// `$EDITOR` wins over the configured editor
    pub fn editor_command(&self) -> String {
        match std::env::var("EDITOR") {
            Ok(editor) if !editor.trim().is_empty() => editor,
            _ => self.editor.clone(),
        }
    }
}

pub fn expand_home(path: &str) -> PathBuf {
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
