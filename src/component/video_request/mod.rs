//! 聊天訊息影片處理元件
//!
//! 從訊息取得附件與內嵌影片、下載到工作目錄、逐一穩定化

mod downloader;
mod error;
mod main;
mod message;

pub use downloader::{
    DownloadError, VideoDownloader, YtDlpDownloader, attachment_file_name, embed_file_name,
};
pub use error::BotError;
pub use main::{DONE_REPLY, PROCESSING_REPLY, VideoRequestHandler, clear_working_directory};
pub use message::{Attachment, ChatMessage, Embed, extract_embedded_urls, is_stabilize_command};
