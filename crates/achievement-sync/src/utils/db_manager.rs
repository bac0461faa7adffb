//! Helper functions for database paths.

use anyhow::Result;
use directories::BaseDirs;
use std::path::PathBuf;

const APP_DIR_NAME: &str = "AchievementSync";

/// Get the application's data directory (~/.local/share/AchievementSync or %APPDATA%/AchievementSync)
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("Failed to determine user's data directory"))?;

    Ok(base_dirs.data_dir().join(APP_DIR_NAME))
}
