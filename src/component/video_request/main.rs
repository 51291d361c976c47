use super::downloader::{VideoDownloader, attachment_file_name, embed_file_name};
use super::error::BotError;
use super::message::{ChatMessage, extract_embedded_urls, is_stabilize_command};
use crate::component::stabilizer::StabilizationPipeline;
use crate::config::{BotSettings, SETTINGS_FILE};
use crate::tools::{MediaInspector, ToolRunner, ensure_directory_exists};
use log::{debug, error, info, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use walkdir::WalkDir;

pub const PROCESSING_REPLY: &str = "Processing . . .";
pub const DONE_REPLY: &str = "Your videos have been stabilized!";

/// 整個程序同一時間只處理一支影片
static PIPELINE_LOCK: Mutex<()> = Mutex::new(());

/// 處理一則要求穩定化的聊天訊息
///
/// 下載 → 逐一穩定化 → 回傳輸出檔路徑；輸出檔的傳送與工作目錄清理由呼叫端負責。
pub struct VideoRequestHandler<D, I, R> {
    pipeline: StabilizationPipeline<I, R>,
    downloader: D,
    settings: BotSettings,
}

impl<D: VideoDownloader, I: MediaInspector, R: ToolRunner> VideoRequestHandler<D, I, R> {
    pub const fn new(
        pipeline: StabilizationPipeline<I, R>,
        downloader: D,
        settings: BotSettings,
    ) -> Self {
        Self {
            pipeline,
            downloader,
            settings,
        }
    }

    #[must_use]
    pub fn working_directory(&self) -> &Path {
        &self.pipeline.config().working_directory
    }

    /// 處理訊息中的所有附件與內嵌影片
    ///
    /// 不是穩定化指令的訊息回傳 `None`。
    /// `notify` 會收到要回覆給使用者的進度訊息。
    pub fn handle(
        &self,
        message: &ChatMessage,
        mut notify: impl FnMut(&str),
    ) -> Result<Option<Vec<PathBuf>>, BotError> {
        if !is_stabilize_command(&message.content, &self.settings.command_prefix) {
            debug!("略過非指令訊息: {}", message.content);
            return Ok(None);
        }

        self.prepare_working_directory()?;

        let mut inputs = self.download_attachments(message)?;
        inputs.extend(self.download_embeds(message)?);

        if inputs.is_empty() {
            return Err(BotError::Download("Did not detect any videos.".to_string()));
        }

        notify(PROCESSING_REPLY);
        let outputs = self.stabilize_all(&inputs)?;
        notify(DONE_REPLY);

        Ok(Some(outputs))
    }

    /// 處理已經在本機的影片檔
    pub fn handle_local_files(
        &self,
        inputs: &[PathBuf],
        mut notify: impl FnMut(&str),
    ) -> Result<Vec<PathBuf>, BotError> {
        self.prepare_working_directory()?;

        if inputs.is_empty() {
            return Err(BotError::Download("Did not detect any videos.".to_string()));
        }

        notify(PROCESSING_REPLY);
        let outputs = self.stabilize_all(inputs)?;
        notify(DONE_REPLY);

        Ok(outputs)
    }

    /// 輸出檔放在工作目錄，檔名加上前綴
    #[must_use]
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        let file_name = input
            .file_name()
            .map_or_else(|| "video.mp4".into(), |n| n.to_string_lossy().into_owned());
        self.working_directory()
            .join(format!("{}{file_name}", self.settings.output_prefix))
    }

    fn prepare_working_directory(&self) -> Result<(), BotError> {
        let path = self.working_directory();
        ensure_directory_exists(path).map_err(|source| BotError::WorkingDirectory {
            path: path.to_path_buf(),
            source,
        })
    }

    fn download_attachments(&self, message: &ChatMessage) -> Result<Vec<PathBuf>, BotError> {
        let mut paths = Vec::with_capacity(message.attachments.len());
        for attachment in &message.attachments {
            let target = self
                .working_directory()
                .join(attachment_file_name(attachment.id));
            if let Err(e) = self.downloader.download(&attachment.url, &target) {
                error!("無法下載附件 {} ({}): {e}", attachment.id, attachment.filename);
                return Err(BotError::Download(
                    "Unable to save videos from attached files.".to_string(),
                ));
            }
            paths.push(target);
        }
        Ok(paths)
    }

    fn download_embeds(&self, message: &ChatMessage) -> Result<Vec<PathBuf>, BotError> {
        let urls = extract_embedded_urls(message);
        let mut paths = Vec::with_capacity(urls.len());
        for url in urls {
            let target = self.working_directory().join(embed_file_name(&url));
            if let Err(e) = self.downloader.download(&url, &target) {
                error!("無法下載內嵌影片 {url}: {e}");
                return Err(BotError::Download(
                    "Unable to download videos from embedded urls.".to_string(),
                ));
            }
            paths.push(target);
        }
        Ok(paths)
    }

    /// 依序穩定化，遇到第一個失敗就停止
    fn stabilize_all(&self, inputs: &[PathBuf]) -> Result<Vec<PathBuf>, BotError> {
        let _guard = PIPELINE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);

        let mut outputs = Vec::with_capacity(inputs.len());
        for input in inputs {
            let input = std::path::absolute(input).map_err(|source| {
                BotError::WorkingDirectory {
                    path: input.clone(),
                    source,
                }
            })?;
            let output = self.output_path_for(&input);
            let output = std::path::absolute(&output).unwrap_or(output);

            if let Err(e) = self.pipeline.stabilize(&input, &output) {
                warn!("穩定化失敗 {}: {e}", input.display());
                return Err(e.into());
            }
            outputs.push(output);
        }

        info!("穩定化 {} 支影片完成", outputs.len());
        Ok(outputs)
    }
}

/// 目前目錄（或其上層）以及放有設定檔的目錄不可清理
fn is_protected_directory(directory: &Path, current_dir: &Path) -> bool {
    current_dir.starts_with(directory) || directory.join(SETTINGS_FILE).exists()
}

/// 刪除工作目錄中的所有檔案與工作子目錄（保留目錄本身）
pub fn clear_working_directory(working_directory: &Path) -> io::Result<usize> {
    if !working_directory.exists() {
        return Ok(0);
    }

    let resolved = working_directory.canonicalize()?;
    let current_dir = std::env::current_dir()?.canonicalize()?;
    if is_protected_directory(&resolved, &current_dir) {
        warn!("拒絕清理工作目錄: {}", resolved.display());
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("refusing to clear {}", resolved.display()),
        ));
    }

    let mut removed = 0;
    for entry in WalkDir::new(working_directory)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
        .into_iter()
        .filter_map(Result::ok)
    {
        if entry.file_type().is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
        removed += 1;
    }

    info!(
        "已清理工作目錄 {} ({removed} 個項目)",
        working_directory.display()
    );
    Ok(removed)
}
