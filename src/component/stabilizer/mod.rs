//! 影片穩定化元件
//!
//! 放大 → vidstabdetect → vidstabtransform → x265 壓縮，
//! 第一階段前後各做一次串流與長度驗證。

mod error;
mod ffmpeg_command;
mod main;
mod workspace;

pub use error::{Stage, StabilizationError};
pub use ffmpeg_command::{
    FfmpegCommand, OUTPUT_CRF, OUTPUT_VIDEO_CODEC, detect_filter, scale_filter, transform_filter,
};
pub use main::{DurationCheck, StabilizationPipeline};
pub use workspace::JobWorkspace;
