use super::error::{Stage, StabilizationError};
use super::ffmpeg_command::FfmpegCommand;
use super::workspace::JobWorkspace;
use crate::config::PipelineConfig;
use crate::tools::{CommandLine, FfprobeInspector, MediaInspector, ProcessRunner, ToolRunner};
use log::{debug, error, info, warn};
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// 長度檢查結果
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DurationCheck {
    /// 長度已知且在允許範圍內（秒）
    WithinBounds(f64),
    /// 無法判定長度，不算失敗
    Unknown,
}

impl DurationCheck {
    #[must_use]
    pub const fn is_determinable(self) -> bool {
        matches!(self, Self::WithinBounds(_))
    }
}

/// 影片穩定化流程
///
/// 四個依序執行的 ffmpeg 階段：
/// 1. 放大畫面（避免穩定化裁切掉內容）
/// 2. vidstabdetect 運動分析
/// 3. vidstabtransform 運動補償 + 銳化
/// 4. x265 壓縮輸出
pub struct StabilizationPipeline<I = FfprobeInspector, R = ProcessRunner> {
    config: PipelineConfig,
    inspector: I,
    runner: R,
}

impl StabilizationPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, StabilizationError> {
        let inspector = FfprobeInspector::new(&config.ffprobe_path);
        let runner = ProcessRunner::new()
            .with_timeout(config.stage_timeout_seconds.map(Duration::from_secs));
        Self::with_tools(config, inspector, runner)
    }

    /// 收到中斷信號時終止正在執行的 ffmpeg
    pub fn with_shutdown_signal(
        config: PipelineConfig,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Result<Self, StabilizationError> {
        let inspector = FfprobeInspector::new(&config.ffprobe_path);
        let runner = ProcessRunner::new()
            .with_timeout(config.stage_timeout_seconds.map(Duration::from_secs))
            .with_shutdown_signal(shutdown_signal);
        Self::with_tools(config, inspector, runner)
    }
}

impl<I: MediaInspector, R: ToolRunner> StabilizationPipeline<I, R> {
    pub fn with_tools(
        config: PipelineConfig,
        inspector: I,
        runner: R,
    ) -> Result<Self, StabilizationError> {
        config.validate()?;
        Ok(Self {
            config,
            inspector,
            runner,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub const fn inspector(&self) -> &I {
        &self.inspector
    }

    #[must_use]
    pub const fn runner(&self) -> &R {
        &self.runner
    }

    /// 穩定化單一影片
    ///
    /// 中間檔放在工作目錄下專屬的子目錄，結束後（不論成功與否）刪除，
    /// 除非設定了 `keep_intermediates`。
    pub fn stabilize(&self, input: &Path, output: &Path) -> Result<(), StabilizationError> {
        let workspace = JobWorkspace::create(&self.config.working_directory)
            .map_err(StabilizationError::Workspace)?;

        let result = self.stabilize_in(&workspace, input, output);

        if self.config.keep_intermediates {
            debug!("保留中間檔: {}", workspace.directory().display());
        } else {
            let directory = workspace.directory().to_path_buf();
            if let Err(e) = workspace.cleanup() {
                warn!("無法刪除中間檔目錄 {}: {e}", directory.display());
            }
        }

        result
    }

    /// 在指定的工作子目錄中執行完整流程，不清理中間檔
    pub fn stabilize_in(
        &self,
        workspace: &JobWorkspace,
        input: &Path,
        output: &Path,
    ) -> Result<(), StabilizationError> {
        info!(
            "開始穩定化 [{}]: {} -> {}",
            workspace.id(),
            input.display(),
            output.display()
        );
        let started = Instant::now();

        self.check_stream_shape(input)?;
        let initial_check = self.check_duration(input)?;

        let commands = FfmpegCommand::new(&self.config);
        self.run_stage(Stage::Scale, commands.scale(input, workspace))?;

        if !initial_check.is_determinable() {
            // 部分影片的 metadata 要經過一次 ffmpeg 重新封裝後才讀得到
            info!("原始檔長度無法判定，改用放大後的檔案重新檢查");
            if !self.check_duration(&workspace.zoomed())?.is_determinable() {
                warn!("放大後仍無法判定長度，略過長度限制: {}", input.display());
            }
        }

        self.run_stage(Stage::Detect, commands.detect(workspace))?;
        self.run_stage(Stage::Transform, commands.transform(workspace))?;
        self.run_stage(Stage::Compress, commands.compress(workspace, output))?;

        info!(
            "穩定化完成 [{}]: {} ({:.1}s)",
            workspace.id(),
            output.display(),
            started.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// 必須剛好有一個視訊串流
    fn check_stream_shape(&self, path: &Path) -> Result<(), StabilizationError> {
        let metadata = self.inspector.inspect(path)?;
        match metadata.video_stream_count {
            0 => Err(StabilizationError::NoVideoStreams),
            1 => Ok(()),
            _ => Err(StabilizationError::MultipleVideoStreams),
        }
    }

    /// 檢查第一個視訊串流的長度是否在允許範圍內
    pub fn check_duration(&self, path: &Path) -> Result<DurationCheck, StabilizationError> {
        let metadata = self.inspector.inspect(path)?;

        let raw = metadata.duration.as_deref();
        let (Some(raw), Some(seconds)) = (raw, metadata.duration_seconds()) else {
            debug!("無法判定長度 {}: {:?}", path.display(), metadata.duration);
            return Ok(DurationCheck::Unknown);
        };

        if seconds > self.config.max_video_length_seconds {
            return Err(StabilizationError::VideoTooLong {
                duration: raw.to_string(),
                max: self.config.max_video_length_seconds,
            });
        }
        if seconds < self.config.min_video_length_seconds {
            return Err(StabilizationError::VideoTooShort {
                duration: raw.to_string(),
                min: self.config.min_video_length_seconds,
            });
        }

        debug!("影片長度 {seconds}s: {}", path.display());
        Ok(DurationCheck::WithinBounds(seconds))
    }

    fn run_stage(&self, stage: Stage, command: Command) -> Result<(), StabilizationError> {
        let command_line = CommandLine(&command).to_string();
        info!("[{stage}] 執行中");
        debug!("[{stage}] {command_line}");

        let started = Instant::now();
        let result = self
            .runner
            .run(command)
            .map_err(|source| StabilizationError::StageAborted { stage, source })?;

        if !result.success {
            error!("[{stage}] ffmpeg 失敗 ({:?}): {command_line}", result.exit_code);
            debug!("[{stage}] ffmpeg 輸出:\n{}", result.output);
            return Err(StabilizationError::StabilizationToolFailure {
                stage,
                command: command_line,
                exit_code: result.exit_code,
                output: result.output,
            });
        }

        info!("[{stage}] 完成 ({:.1}s)", started.elapsed().as_secs_f64());
        Ok(())
    }
}
