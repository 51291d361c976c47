//! 單一工作的中間檔目錄
//!
//! 每個工作使用 `<工作目錄>/job-<uuid>/`，多個工作可共用同一個工作目錄。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const ZOOMED_FILE: &str = "zoomed.mp4";
const STABILIZED_FILE: &str = "stabilized.mp4";
const TRANSFORMS_FILE: &str = "transforms.trf";

#[derive(Debug)]
pub struct JobWorkspace {
    id: Uuid,
    directory: PathBuf,
}

impl JobWorkspace {
    /// 在既有的工作目錄下建立新的工作子目錄（工作目錄本身不會被建立）
    pub fn create(working_directory: &Path) -> io::Result<Self> {
        let id = Uuid::new_v4();
        let directory = working_directory.join(format!("job-{id}"));
        fs::create_dir(&directory)?;

        // detect/transform 階段會切換到此目錄執行，因此必須是絕對路徑
        let directory = fs::canonicalize(&directory)?;

        Ok(Self { id, directory })
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    #[must_use]
    pub fn zoomed(&self) -> PathBuf {
        self.directory.join(ZOOMED_FILE)
    }

    #[must_use]
    pub fn stabilized(&self) -> PathBuf {
        self.directory.join(STABILIZED_FILE)
    }

    /// vidstabdetect 的分析結果檔名（相對於工作子目錄）
    #[must_use]
    pub const fn transforms_file_name() -> &'static str {
        TRANSFORMS_FILE
    }

    #[must_use]
    pub fn transforms(&self) -> PathBuf {
        self.directory.join(TRANSFORMS_FILE)
    }

    /// 刪除整個工作子目錄
    pub fn cleanup(self) -> io::Result<()> {
        if self.directory.exists() {
            fs::remove_dir_all(&self.directory)?;
        }
        Ok(())
    }
}
