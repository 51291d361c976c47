use super::workspace::JobWorkspace;
use crate::config::PipelineConfig;
use std::path::Path;
use std::process::Command;

pub const OUTPUT_VIDEO_CODEC: &str = "libx265";
pub const OUTPUT_CRF: u32 = 28;

/// unsharp 參數：亮度 5x5 強度 0.8，色度 3x3 強度 0.4
const UNSHARP_FILTER: &str = "unsharp=5:5:0.8:3:3:0.4";

/// 放大畫面並將寬高無條件捨去到偶數（編碼器要求）
#[must_use]
pub fn scale_filter(scale_factor: f64) -> String {
    format!("scale=trunc((iw*{scale_factor})/2)*2:trunc(ow/a/2)*2")
}

#[must_use]
pub fn detect_filter() -> String {
    format!("vidstabdetect=result={}", JobWorkspace::transforms_file_name())
}

#[must_use]
pub fn transform_filter(smoothing: u32, zoom_factor: f64) -> String {
    format!(
        "vidstabtransform=input={}:smoothing={smoothing}:crop=black:zoom={zoom_factor}:optzoom=0:interpol=linear,{UNSHARP_FILTER}",
        JobWorkspace::transforms_file_name()
    )
}

/// 穩定化流程各階段的 ffmpeg 指令
///
/// 所有參數都以獨立的 argv 傳遞，不經過 shell。
pub struct FfmpegCommand<'a> {
    config: &'a PipelineConfig,
}

impl<'a> FfmpegCommand<'a> {
    #[must_use]
    pub const fn new(config: &'a PipelineConfig) -> Self {
        Self { config }
    }

    fn base_command(&self) -> Command {
        let mut cmd = Command::new(&self.config.ffmpeg_path);
        cmd.args(["-hide_banner", "-nostdin", "-y"]);
        cmd
    }

    /// 第一階段：放大並轉成 8-bit 4:2:0
    #[must_use]
    pub fn scale(&self, input: &Path, workspace: &JobWorkspace) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-i").arg(input);
        cmd.arg("-vf").arg(scale_filter(self.config.video_scale_factor));
        cmd.args(["-pix_fmt", "yuv420p"]);
        cmd.arg(workspace.zoomed());
        cmd
    }

    /// 第二階段：只做運動分析，結果寫入工作目錄中的 transforms.trf
    #[must_use]
    pub fn detect(&self, workspace: &JobWorkspace) -> Command {
        let mut cmd = self.base_command();
        cmd.current_dir(workspace.directory());
        cmd.arg("-i").arg(workspace.zoomed());
        cmd.arg("-vf").arg(detect_filter());
        cmd.args(["-f", "null", "-"]);
        cmd
    }

    /// 第三階段：套用運動補償與銳化，限制單執行緒
    #[must_use]
    pub fn transform(&self, workspace: &JobWorkspace) -> Command {
        let mut cmd = self.base_command();
        cmd.current_dir(workspace.directory());
        cmd.arg("-i").arg(workspace.zoomed());
        cmd.arg("-vf").arg(transform_filter(
            self.config.smoothing,
            self.config.video_zoom_factor,
        ));
        cmd.args(["-threads", "1"]);
        cmd.arg(workspace.stabilized());
        cmd
    }

    /// 第四階段：以固定 CRF 壓縮到最終輸出
    #[must_use]
    pub fn compress(&self, workspace: &JobWorkspace, output: &Path) -> Command {
        let mut cmd = self.base_command();
        cmd.arg("-i").arg(workspace.stabilized());
        cmd.args(["-vcodec", OUTPUT_VIDEO_CODEC]);
        cmd.args(["-threads", "1"]);
        cmd.arg("-crf").arg(OUTPUT_CRF.to_string());
        cmd.arg(output);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn args_of(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_scale_filter_uses_shortest_float_format() {
        assert_eq!(
            scale_filter(1.15),
            "scale=trunc((iw*1.15)/2)*2:trunc(ow/a/2)*2"
        );
        assert_eq!(scale_filter(2.0), "scale=trunc((iw*2)/2)*2:trunc(ow/a/2)*2");
    }

    #[test]
    fn test_transform_filter() {
        assert_eq!(
            transform_filter(20, -15.0),
            "vidstabtransform=input=transforms.trf:smoothing=20:crop=black:zoom=-15:optzoom=0:interpol=linear,unsharp=5:5:0.8:3:3:0.4"
        );
    }

    #[test]
    fn test_stage_commands() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = JobWorkspace::create(temp_dir.path()).unwrap();
        let config = PipelineConfig::default();
        let commands = FfmpegCommand::new(&config);

        let scale = commands.scale(Path::new("/videos/in.mp4"), &workspace);
        assert_eq!(scale.get_program(), OsStr::new("ffmpeg"));
        let args = args_of(&scale);
        assert_eq!(&args[..5], ["-hide_banner", "-nostdin", "-y", "-i", "/videos/in.mp4"]);
        assert!(args.contains(&"yuv420p".to_string()));
        assert_eq!(args.last().unwrap(), &workspace.zoomed().to_string_lossy());

        let detect = commands.detect(&workspace);
        assert_eq!(detect.get_current_dir(), Some(workspace.directory()));
        let args = args_of(&detect);
        assert!(args.contains(&"vidstabdetect=result=transforms.trf".to_string()));
        assert_eq!(&args[args.len() - 3..], ["-f", "null", "-"]);

        let transform = commands.transform(&workspace);
        let args = args_of(&transform);
        assert!(args.windows(2).any(|w| w == ["-threads", "1"]));
        assert_eq!(args.last().unwrap(), &workspace.stabilized().to_string_lossy());
    }

    #[test]
    fn test_compress_keeps_threads_and_crf_separate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = JobWorkspace::create(temp_dir.path()).unwrap();
        let config = PipelineConfig::default();
        let compress =
            FfmpegCommand::new(&config).compress(&workspace, Path::new("/videos/out.mp4"));

        let args = args_of(&compress);
        assert!(args.windows(2).any(|w| w == ["-vcodec", "libx265"]));
        assert!(args.windows(2).any(|w| w == ["-threads", "1"]));
        assert!(args.windows(2).any(|w| w == ["-crf", "28"]));
        assert!(!args.iter().any(|a| a == "1-crf"));
        assert_eq!(args.last().unwrap(), "/videos/out.mp4");
    }

    #[test]
    fn test_custom_ffmpeg_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let workspace = JobWorkspace::create(temp_dir.path()).unwrap();
        let config = PipelineConfig {
            ffmpeg_path: "/opt/ffmpeg/bin/ffmpeg".into(),
            ..PipelineConfig::default()
        };
        let cmd = FfmpegCommand::new(&config).detect(&workspace);
        assert_eq!(cmd.get_program(), OsStr::new("/opt/ffmpeg/bin/ffmpeg"));
    }
}
