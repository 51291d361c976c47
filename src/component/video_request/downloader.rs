use crate::tools::{CommandLine, ProcessRunner, RunError, ToolRunner};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::process::Command;

/// 下載失敗的原因，只記錄在 log 中
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error(transparent)]
    Run(#[from] RunError),

    #[error("{command} exited with {exit_code:?}: {output}")]
    Failed {
        command: String,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("downloader reported success but {} is missing", path.display())]
    Missing { path: PathBuf },
}

/// 將網址上的影片下載到指定路徑
pub trait VideoDownloader {
    fn download(&self, url: &str, target: &Path) -> Result<(), DownloadError>;
}

/// 附件以 id 命名
#[must_use]
pub fn attachment_file_name(id: u64) -> String {
    format!("{id}.mp4")
}

/// 內嵌影片以網址的 blake3 雜湊命名，同一網址得到相同檔名
#[must_use]
pub fn embed_file_name(url: &str) -> String {
    format!("{}.mp4", blake3::hash(url.as_bytes()).to_hex())
}

/// 透過 yt-dlp（或相容的 youtube-dl）下載
pub struct YtDlpDownloader<R = ProcessRunner> {
    program: PathBuf,
    runner: R,
}

impl YtDlpDownloader {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_runner(program, ProcessRunner::new())
    }
}

impl<R: ToolRunner> YtDlpDownloader<R> {
    #[must_use]
    pub fn with_runner(program: impl Into<PathBuf>, runner: R) -> Self {
        Self {
            program: program.into(),
            runner,
        }
    }

    #[must_use]
    pub fn build_command(&self, url: &str, target: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-o").arg(target);
        cmd.args([
            "--quiet",
            "--no-progress",
            "--no-playlist",
            "--restrict-filenames",
            "--merge-output-format",
            "mp4",
            "--",
            url,
        ]);
        cmd
    }
}

impl<R: ToolRunner> VideoDownloader for YtDlpDownloader<R> {
    fn download(&self, url: &str, target: &Path) -> Result<(), DownloadError> {
        let command = self.build_command(url, target);
        let command_line = CommandLine(&command).to_string();
        debug!("下載: {command_line}");

        let result = self.runner.run(command)?;
        if !result.success {
            return Err(DownloadError::Failed {
                command: command_line,
                exit_code: result.exit_code,
                output: result.output.trim().to_string(),
            });
        }
        if !target.exists() {
            return Err(DownloadError::Missing {
                path: target.to_path_buf(),
            });
        }

        info!("下載完成: {url} -> {}", target.display());
        Ok(())
    }
}
