use std::path::{Path, PathBuf};
use std::process::Command;

/// 外部工具狀態
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: String,
    pub available: bool,
    pub version: Option<String>,
    pub path: Option<PathBuf>,
}

/// 檢查工具是否可執行，並取得版本字串的第一行
#[must_use]
pub fn check_tool(program: &Path, version_arg: &str) -> ToolInfo {
    let name = program.display().to_string();
    let path = which::which(program).ok();

    match Command::new(program).arg(version_arg).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .map(|line| line.trim().to_string());
            ToolInfo {
                name,
                available: true,
                version,
                path,
            }
        }
        _ => ToolInfo {
            name,
            available: false,
            version: None,
            path,
        },
    }
}

/// ffmpeg 是否內建 vid.stab 濾鏡
#[must_use]
pub fn has_vidstab_filters(ffmpeg: &Path) -> bool {
    Command::new(ffmpeg)
        .args(["-hide_banner", "-filters"])
        .output()
        .map(|output| {
            let listing = String::from_utf8_lossy(&output.stdout);
            listing.contains("vidstabdetect") && listing.contains("vidstabtransform")
        })
        .unwrap_or(false)
}

/// 檢查穩定化流程會用到的所有工具
#[must_use]
pub fn check_tools(ffmpeg: &Path, ffprobe: &Path, downloader: &Path) -> Vec<ToolInfo> {
    vec![
        check_tool(ffmpeg, "-version"),
        check_tool(ffprobe, "-version"),
        check_tool(downloader, "--version"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tool_not_found() {
        let info = check_tool(Path::new("nonexistent_tool_12345"), "-version");
        assert!(!info.available);
        assert!(info.version.is_none());
        assert!(info.path.is_none());
    }

    #[test]
    fn test_vidstab_missing_binary() {
        assert!(!has_vidstab_filters(Path::new("nonexistent_ffmpeg_12345")));
    }
}
