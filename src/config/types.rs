use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// 穩定化流程設定，建立 `StabilizationPipeline` 後即不可變
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    /// 中間檔所在的工作目錄，由呼叫端建立與清理
    pub working_directory: PathBuf,
    /// 穩定化前先放大畫面的倍率（必須大於 1）
    pub video_scale_factor: f64,
    /// vidstabtransform 的 zoom 百分比，負值代表縮小以抵銷前面的放大
    pub video_zoom_factor: f64,
    /// 平滑視窗（幀數）
    pub smoothing: u32,
    pub min_video_length_seconds: f64,
    pub max_video_length_seconds: f64,
    /// 單一階段的執行上限；`None` 表示無限等待
    pub stage_timeout_seconds: Option<u64>,
    pub keep_intermediates: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            working_directory: PathBuf::from("videos"),
            video_scale_factor: 1.15,
            video_zoom_factor: -15.0,
            smoothing: 20,
            min_video_length_seconds: 1.0,
            max_video_length_seconds: 120.0,
            stage_timeout_seconds: None,
            keep_intermediates: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid pipeline config: {0}")]
pub struct InvalidConfig(pub String);

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if !self.video_scale_factor.is_finite() || self.video_scale_factor <= 1.0 {
            return Err(InvalidConfig(format!(
                "scale factor must be greater than 1, got {}",
                self.video_scale_factor
            )));
        }
        if !self.video_zoom_factor.is_finite() {
            return Err(InvalidConfig("zoom factor must be a finite number".to_string()));
        }
        if self.smoothing == 0 {
            return Err(InvalidConfig("smoothing window must be at least 1 frame".to_string()));
        }

        let (min, max) = (self.min_video_length_seconds, self.max_video_length_seconds);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < 0.0 {
            return Err(InvalidConfig(
                "duration bounds must be non-negative numbers".to_string(),
            ));
        }
        if min > max {
            return Err(InvalidConfig(format!(
                "minimum duration {min} exceeds maximum duration {max}"
            )));
        }
        if self.stage_timeout_seconds == Some(0) {
            return Err(InvalidConfig("stage timeout must be at least 1 second".to_string()));
        }
        Ok(())
    }
}

/// 聊天機器人相關設定
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub command_prefix: String,
    pub downloader_path: PathBuf,
    pub output_prefix: String,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            command_prefix: "stab!".to_string(),
            downloader_path: PathBuf::from("yt-dlp"),
            output_prefix: "out_".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EnUs => write!(f, "English"),
            Self::ZhTw => write!(f, "繁體中文"),
        }
    }
}

/// 儲存在 settings.json 的使用者設定
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub pipeline: PipelineConfig,
    pub bot: BotSettings,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub settings: UserSettings,
}
