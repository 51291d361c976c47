use crate::config::types::{Config, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    /// 從目前目錄的 settings.json 載入設定，不存在或無法解析時使用預設值
    #[must_use]
    pub fn new() -> Self {
        let settings = match load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("無法載入設定，改用預設值: {e:#}");
                UserSettings::default()
            }
        };

        Self { settings }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_settings(path: &Path) -> Result<UserSettings> {
    if !path.exists() {
        return Ok(UserSettings::default());
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;

    let settings: UserSettings = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse settings from {}", path.display()))?;

    settings
        .pipeline
        .validate()
        .with_context(|| format!("Invalid pipeline settings in {}", path.display()))?;

    Ok(settings)
}
