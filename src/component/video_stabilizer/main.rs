use crate::component::stabilizer::StabilizationPipeline;
use crate::component::video_request::{
    BotError, ChatMessage, VideoRequestHandler, YtDlpDownloader, clear_working_directory,
};
use crate::config::Config;
use crate::tools::{
    FfprobeInspector, ProcessRunner, check_tools, has_vidstab_filters, validate_file_exists,
};
use anyhow::{Context, Result};
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

type ConsoleHandler = VideoRequestHandler<YtDlpDownloader, FfprobeInspector, ProcessRunner>;

/// 互動式影片穩定化
pub struct VideoStabilizer {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl VideoStabilizer {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    fn build_handler(&self) -> Result<ConsoleHandler> {
        let settings = &self.config.settings;
        let pipeline = StabilizationPipeline::with_shutdown_signal(
            settings.pipeline.clone(),
            Arc::clone(&self.shutdown_signal),
        )
        .context("Invalid pipeline settings")?;
        let downloader = YtDlpDownloader::with_runner(
            &settings.bot.downloader_path,
            ProcessRunner::new().with_shutdown_signal(Arc::clone(&self.shutdown_signal)),
        );
        Ok(VideoRequestHandler::new(
            pipeline,
            downloader,
            settings.bot.clone(),
        ))
    }

    /// 穩定化本機影片
    pub fn run_local(&self) -> Result<()> {
        println!("{}", style(t!("stabilize.local_title")).cyan().bold());

        let path: String = Input::new()
            .with_prompt(t!("stabilize.local_prompt"))
            .interact_text()?;
        let input = PathBuf::from(path.trim());
        validate_file_exists(&input)?;

        let handler = self.build_handler()?;
        let outcome = self.with_spinner(|notify| handler.handle_local_files(&[input], notify));
        self.report(outcome);
        Ok(())
    }

    /// 從網址下載後穩定化
    pub fn run_url(&self) -> Result<()> {
        println!("{}", style(t!("stabilize.url_title")).cyan().bold());

        let url: String = Input::new()
            .with_prompt(t!("stabilize.url_prompt"))
            .interact_text()?;
        let prefix = &self.config.settings.bot.command_prefix;
        let message = ChatMessage::stabilize_request(prefix, url.trim());

        let handler = self.build_handler()?;
        let outcome = self
            .with_spinner(|notify| handler.handle(&message, notify))
            .map(Option::unwrap_or_default);
        let delivered = outcome.is_ok();
        self.report(outcome);

        if delivered {
            self.offer_cleanup(handler.working_directory())?;
        }
        Ok(())
    }

    /// 檢查 ffmpeg / ffprobe / 下載工具
    pub fn run_tool_check(&self) -> Result<()> {
        println!("{}", style(t!("tools.title")).cyan().bold());

        let pipeline = &self.config.settings.pipeline;
        let tools = check_tools(
            &pipeline.ffmpeg_path,
            &pipeline.ffprobe_path,
            &self.config.settings.bot.downloader_path,
        );

        for tool in &tools {
            if tool.available {
                println!(
                    "  {} {} {}",
                    style("✓").green(),
                    tool.name,
                    style(tool.version.as_deref().unwrap_or_default()).dim()
                );
            } else {
                println!("  {} {}", style("✗").red(), tool.name);
            }
        }

        if has_vidstab_filters(&pipeline.ffmpeg_path) {
            println!("  {} vidstabdetect / vidstabtransform", style("✓").green());
        } else {
            println!("{}", style(t!("tools.no_vidstab")).yellow());
        }

        Ok(())
    }

    fn with_spinner<T>(&self, job: impl FnOnce(&mut dyn FnMut(&str)) -> T) -> T {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .expect("Invalid progress bar template"),
        );
        spinner.enable_steady_tick(Duration::from_millis(120));

        let mut notify = |text: &str| spinner.set_message(text.to_string());
        let result = job(&mut notify);

        spinner.finish_and_clear();
        result
    }

    fn report(&self, outcome: Result<Vec<PathBuf>, BotError>) {
        match outcome {
            Ok(outputs) => {
                println!("{}", style(t!("stabilize.done")).green().bold());
                for output in &outputs {
                    println!("  {}", output.display());
                }
                info!("穩定化完成，共 {} 個檔案", outputs.len());
            }
            Err(BotError::Stabilization(e)) if e.is_validation_failure() => {
                warn!("影片不符合穩定化條件: {e}");
                println!("{} {}", style(t!("stabilize.rejected")).yellow().bold(), e);
            }
            Err(e) => {
                error!("穩定化失敗: {e}");
                println!("{} {}", style(t!("common.error_prefix")).red().bold(), e);
            }
        }
    }

    fn offer_cleanup(&self, working_directory: &Path) -> Result<()> {
        let confirmed = Confirm::new()
            .with_prompt(t!("stabilize.cleanup_prompt"))
            .default(false)
            .interact()?;
        if confirmed {
            let removed = clear_working_directory(working_directory)?;
            println!("{}", style(t!("stabilize.cleaned", count = removed)).dim());
        }
        Ok(())
    }
}
