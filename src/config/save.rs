use crate::config::load::SETTINGS_FILE;
use crate::config::types::UserSettings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    save_settings_to(settings, Path::new(SETTINGS_FILE))
}

pub fn save_settings_to(settings: &UserSettings, path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load::load_settings;
    use crate::config::types::Language;

    #[test]
    fn test_saved_settings_load_back() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join(SETTINGS_FILE);

        let mut settings = UserSettings::default();
        settings.language = Language::ZhTw;
        settings.pipeline.max_video_length_seconds = 90.0;
        settings.bot.command_prefix = "!".to_string();

        save_settings_to(&settings, &path).unwrap();
        assert_eq!(load_settings(&path).unwrap(), settings);
    }
}
