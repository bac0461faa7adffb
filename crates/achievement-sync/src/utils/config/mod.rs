//! # Configuration
//!
//! `SyncConfig` is read from a JSON file. Every field has a default, so a
//! partial file (or no file at all) is valid.
//!
//! ```json
//! {
//!   "base_url": "https://retroachievements.org/dorequest.php",
//!   "cache_policy": { "persist_freshness_metadata": false, "persist_pending_submissions": false },
//!   "hash_library_max_age_hours": 720,
//!   "retry": { "initial_backoff_secs": 60, "max_backoff_secs": 3600, "max_attempts": 8 }
//! }
//! ```

use crate::store::CachePolicy;
use crate::utils::db_manager::get_app_data_dir;
use anyhow::Context;
use chrono::Duration as ChronoDuration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct SyncConfig {
    pub base_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Falls back to the platform data directory when unset
    pub data_dir: Option<PathBuf>,
    pub database_file: String,
    pub cache_policy: CachePolicy,
    pub signature_secret: Option<String>,
    pub achievement_set_max_age_hours: i64,
    pub user_data_max_age_hours: i64,
    pub hash_library_max_age_hours: i64,
    pub heartbeat: HeartbeatConfig,
    pub retry: RetryConfig,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HeartbeatConfig {
    pub with_rich_presence_secs: u64,
    pub without_rich_presence_secs: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    pub initial_backoff_secs: u64,
    pub max_backoff_secs: u64,
    pub max_attempts: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: rcheevos_api::api::BASE_URL.to_string(),
            user_agent: format!("achievement-sync/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 30,
            data_dir: None,
            database_file: "achievements.db".to_string(),
            cache_policy: CachePolicy::default(),
            signature_secret: None,
            achievement_set_max_age_hours: 24 * 7,
            user_data_max_age_hours: 24,
            hash_library_max_age_hours: 24 * 30,
            heartbeat: HeartbeatConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            with_rich_presence_secs: 120,
            without_rich_presence_secs: 240,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_backoff_secs: 60,
            max_backoff_secs: 3600,
            max_attempts: 8,
        }
    }
}

impl SyncConfig {
    /// Read `path` if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::debug!(
                "[ra-sync] No config at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config {}", path.display()))
    }

    pub fn default_config_path() -> anyhow::Result<PathBuf> {
        Ok(get_app_data_dir()?.join(CONFIG_FILE_NAME))
    }

    pub fn resolve_data_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => get_app_data_dir(),
        }
    }

    pub fn database_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.resolve_data_dir()?.join(&self.database_file))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn achievement_set_max_age(&self) -> ChronoDuration {
        max_age_from_hours(self.achievement_set_max_age_hours)
    }

    pub fn user_data_max_age(&self) -> ChronoDuration {
        max_age_from_hours(self.user_data_max_age_hours)
    }

    pub fn hash_library_max_age(&self) -> ChronoDuration {
        max_age_from_hours(self.hash_library_max_age_hours)
    }
}

/// Negative ages mean zero; ages past what chrono can hold saturate
fn max_age_from_hours(hours: i64) -> ChronoDuration {
    ChronoDuration::try_hours(hours.max(0)).unwrap_or(ChronoDuration::MAX)
}

impl HeartbeatConfig {
    pub fn interval(&self, has_rich_presence: bool) -> Duration {
        if has_rich_presence {
            Duration::from_secs(self.with_rich_presence_secs)
        } else {
            Duration::from_secs(self.without_rich_presence_secs)
        }
    }
}
