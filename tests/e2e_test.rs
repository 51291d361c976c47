//! E2E Integration Tests
//!
//! 以真正的 ffmpeg / ffprobe 執行完整穩定化流程；環境缺少工具時跳過

use std::path::{Path, PathBuf};
use std::process::Command;

use auto_video_stabilizer::component::stabilizer::{StabilizationError, StabilizationPipeline};
use auto_video_stabilizer::config::PipelineConfig;
use auto_video_stabilizer::tools::{
    FfprobeInspector, MediaInspector, check_tool, has_vidstab_filters,
};

fn has_x265_encoder() -> bool {
    Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .output()
        .map(|output| String::from_utf8_lossy(&output.stdout).contains("libx265"))
        .unwrap_or(false)
}

/// 測試環境是否具備完整的 ffmpeg
fn tools_ready() -> bool {
    let ffmpeg = Path::new("ffmpeg");
    if !check_tool(ffmpeg, "-version").available
        || !check_tool(Path::new("ffprobe"), "-version").available
    {
        println!("跳過測試：找不到 ffmpeg / ffprobe");
        return false;
    }
    if !has_vidstab_filters(ffmpeg) || !has_x265_encoder() {
        println!("跳過測試：ffmpeg 未內建 vid.stab 或 libx265");
        return false;
    }
    true
}

/// 以 testsrc 產生測試影片
fn generate_clip(path: &Path, seconds: f64, video_streams: usize) {
    let mut cmd = Command::new("ffmpeg");
    cmd.args(["-hide_banner", "-nostdin", "-y", "-loglevel", "error"]);
    for _ in 0..video_streams {
        cmd.args(["-f", "lavfi", "-i"])
            .arg(format!("testsrc=size=160x120:rate=15:duration={seconds}"));
    }
    for index in 0..video_streams {
        cmd.arg("-map").arg(index.to_string());
    }
    cmd.args(["-pix_fmt", "yuv420p"]).arg(path);

    let status = cmd.status().unwrap();
    assert!(status.success(), "無法產生測試影片");
}

fn pipeline_for(working_directory: &Path) -> StabilizationPipeline {
    StabilizationPipeline::new(PipelineConfig {
        working_directory: working_directory.to_path_buf(),
        ..PipelineConfig::default()
    })
    .unwrap()
}

struct Workdir {
    _temp_dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workdir {
    fn new() -> Self {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

#[test]
fn test_ffprobe_reads_generated_clip() {
    if !tools_ready() {
        return;
    }
    let workdir = Workdir::new();
    let clip = workdir.path("clip.mp4");
    generate_clip(&clip, 2.0, 1);

    let metadata = FfprobeInspector::new("ffprobe").inspect(&clip).unwrap();

    assert_eq!(metadata.video_stream_count, 1);
    let seconds = metadata.duration_seconds().unwrap();
    assert!((seconds - 2.0).abs() < 0.2, "長度: {seconds}");
}

#[test]
fn test_stabilize_generated_clip() {
    if !tools_ready() {
        return;
    }
    let workdir = Workdir::new();
    let clip = workdir.path("clip.mp4");
    let output = workdir.path("out_clip.mp4");
    generate_clip(&clip, 2.0, 1);

    pipeline_for(&workdir.root).stabilize(&clip, &output).unwrap();

    assert!(output.exists());
    let metadata = FfprobeInspector::new("ffprobe").inspect(&output).unwrap();
    assert_eq!(metadata.video_stream_count, 1);

    // 只剩輸入與輸出，中間檔目錄已刪除
    let leftovers = std::fs::read_dir(&workdir.root)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_dir())
        .count();
    assert_eq!(leftovers, 0);
}

#[test]
fn test_real_short_clip_is_rejected() {
    if !tools_ready() {
        return;
    }
    let workdir = Workdir::new();
    let clip = workdir.path("short.mp4");
    generate_clip(&clip, 0.5, 1);

    let err = pipeline_for(&workdir.root)
        .stabilize(&clip, &workdir.path("out_short.mp4"))
        .unwrap_err();

    assert!(matches!(err, StabilizationError::VideoTooShort { .. }));
    assert!(!workdir.path("out_short.mp4").exists());
}

#[test]
fn test_real_two_stream_clip_is_rejected() {
    if !tools_ready() {
        return;
    }
    let workdir = Workdir::new();
    let clip = workdir.path("double.mkv");
    generate_clip(&clip, 2.0, 2);

    let err = pipeline_for(&workdir.root)
        .stabilize(&clip, &workdir.path("out_double.mp4"))
        .unwrap_err();

    assert!(matches!(err, StabilizationError::MultipleVideoStreams));
}
