use super::number::parse_seconds;
use log::debug;
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 影片串流資訊
///
/// `duration` 保留 ffprobe 的原始字串；缺少或非數字代表「長度未知」，
/// 與「長度已知但超出範圍」是不同的狀態。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamMetadata {
    pub video_stream_count: usize,
    pub duration: Option<String>,
}

impl StreamMetadata {
    /// 第一個視訊串流的長度（秒），無法判定時回傳 `None`
    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration.as_deref().and_then(parse_seconds)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InspectionError {
    #[error("unable to run {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error("ffprobe could not read {}: {stderr}", path.display())]
    Unreadable { path: PathBuf, stderr: String },

    #[error("unable to parse ffprobe output for {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// 取得檔案串流資訊的介面
pub trait MediaInspector {
    fn inspect(&self, path: &Path) -> Result<StreamMetadata, InspectionError>;
}

#[derive(Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 讀取串流資訊
#[derive(Debug, Clone)]
pub struct FfprobeInspector {
    ffprobe_path: PathBuf,
}

impl FfprobeInspector {
    #[must_use]
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

impl Default for FfprobeInspector {
    fn default() -> Self {
        Self::new("ffprobe")
    }
}

impl MediaInspector for FfprobeInspector {
    fn inspect(&self, path: &Path) -> Result<StreamMetadata, InspectionError> {
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(path)
            .output()
            .map_err(|source| InspectionError::Launch {
                tool: self.ffprobe_path.display().to_string(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(InspectionError::Unreadable {
                path: path.to_path_buf(),
                stderr: stderr.trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let metadata = parse_ffprobe_output(&stdout).map_err(|source| InspectionError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "ffprobe {}: {} 個視訊串流, 長度 {:?}",
            path.display(),
            metadata.video_stream_count,
            metadata.duration
        );

        Ok(metadata)
    }
}

/// 解析 ffprobe 的 JSON 輸出
fn parse_ffprobe_output(json: &str) -> Result<StreamMetadata, serde_json::Error> {
    let probe: FfprobeOutput = serde_json::from_str(json)?;

    let video_streams: Vec<StreamInfo> = probe
        .streams
        .unwrap_or_default()
        .into_iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .collect();

    let duration = video_streams.first().and_then(|s| s.duration.clone());

    Ok(StreamMetadata {
        video_stream_count: video_streams.len(),
        duration,
    })
}
