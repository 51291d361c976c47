use crate::config::InvalidConfig;
use crate::tools::{InspectionError, RunError};
use std::fmt;
use std::io;

/// 穩定化流程的四個 ffmpeg 階段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Scale,
    Detect,
    Transform,
    Compress,
}

impl Stage {
    pub const ALL: [Self; 4] = [Self::Scale, Self::Detect, Self::Transform, Self::Compress];
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scale => "scale",
            Self::Detect => "stabilization detection",
            Self::Transform => "stabilization transform",
            Self::Compress => "compression",
        };
        f.write_str(name)
    }
}

fn describe_exit_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "no exit code".to_string(), |c| format!("exit code {c}"))
}

/// 只保留 ffmpeg 輸出的最後幾行，完整內容留在錯誤欄位中
fn output_tail(output: &str) -> String {
    const TAIL_LINES: usize = 3;
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join(" | ")
}

#[derive(Debug, thiserror::Error)]
pub enum StabilizationError {
    #[error("Video may not contain multiple video streams.")]
    MultipleVideoStreams,

    #[error("No video streams found in file.")]
    NoVideoStreams,

    #[error("Video too long. Video duration: {duration}, Maximum duration: {max}.")]
    VideoTooLong { duration: String, max: f64 },

    #[error("Video too short. Video duration: {duration}, Minimum duration: {min}.")]
    VideoTooShort { duration: String, min: f64 },

    /// ffmpeg 以非零狀態結束
    #[error(
        "ffmpeg couldn't compute file: {stage} stage failed with {} [{command}] {}",
        describe_exit_code(.exit_code),
        output_tail(.output)
    )]
    StabilizationToolFailure {
        stage: Stage,
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    /// 無法啟動、逾時或被中斷
    #[error("ffmpeg couldn't compute file: {stage} stage aborted: {source}")]
    StageAborted {
        stage: Stage,
        #[source]
        source: RunError,
    },

    #[error("Unable to read video metadata: {0}")]
    Inspection(#[from] InspectionError),

    #[error("Unable to prepare working files: {0}")]
    Workspace(#[source] io::Error),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),
}

impl StabilizationError {
    /// 失敗的 ffmpeg 階段（驗證類錯誤回傳 `None`）
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::StabilizationToolFailure { stage, .. } | Self::StageAborted { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// 是否在任何 ffmpeg 階段執行前就被擋下
    #[must_use]
    pub const fn is_validation_failure(&self) -> bool {
        matches!(
            self,
            Self::MultipleVideoStreams
                | Self::NoVideoStreams
                | Self::VideoTooLong { .. }
                | Self::VideoTooShort { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_messages_include_bounds() {
        let err = StabilizationError::VideoTooLong {
            duration: "200".to_string(),
            max: 120.0,
        };
        assert_eq!(
            err.to_string(),
            "Video too long. Video duration: 200, Maximum duration: 120."
        );

        let err = StabilizationError::VideoTooShort {
            duration: "0.5".to_string(),
            min: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Video too short. Video duration: 0.5, Minimum duration: 1."
        );
    }

    #[test]
    fn test_tool_failure_message() {
        let err = StabilizationError::StabilizationToolFailure {
            stage: Stage::Transform,
            command: "ffmpeg -y".to_string(),
            exit_code: Some(1),
            output: "frame=  10\n\n[vidstabtransform] cannot open transforms.trf\n".to_string(),
        };
        assert_eq!(err.stage(), Some(Stage::Transform));
        assert!(err.to_string().contains("[ffmpeg -y]"));
        assert!(err.to_string().contains("cannot open transforms.trf"));
        assert!(!err.is_validation_failure());
        assert!(err.to_string().contains("stabilization transform"));
        assert!(err.to_string().contains("exit code 1"));

        let err = StabilizationError::StabilizationToolFailure {
            stage: Stage::Scale,
            command: "ffmpeg".to_string(),
            exit_code: None,
            output: String::new(),
        };
        assert!(err.to_string().contains("no exit code"));
    }

    #[test]
    fn test_output_tail_keeps_last_lines() {
        assert_eq!(output_tail("a\nb\n\nc\nd\n"), "b | c | d");
        assert_eq!(output_tail(""), "");
    }

    #[test]
    fn test_validation_failures() {
        assert!(StabilizationError::NoVideoStreams.is_validation_failure());
        assert!(StabilizationError::MultipleVideoStreams.is_validation_failure());
        assert_eq!(StabilizationError::NoVideoStreams.stage(), None);
    }
}
