use crate::component::stabilizer::StabilizationError;
use std::io;
use std::path::PathBuf;

/// 回覆給使用者的錯誤，訊息即為聊天室中顯示的內容
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error("Error when downloading video: {0}")]
    Download(String),

    #[error("Error when stabilizing video: {0}")]
    Stabilization(#[from] StabilizationError),

    #[error("Unable to use working directory {}: {source}", path.display())]
    WorkingDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
