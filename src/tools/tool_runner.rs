use log::{debug, warn};
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use std::{fmt, io};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 外部工具執行結果（stdout 與 stderr 合併）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub exit_code: Option<i32>,
    pub success: bool,
    pub output: String,
}

impl ToolOutput {
    #[must_use]
    pub fn success(output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(0),
            success: true,
            output: output.into(),
        }
    }

    #[must_use]
    pub fn failure(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code: Some(exit_code),
            success: false,
            output: output.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("unable to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("lost track of {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("{program} did not finish within {}s", timeout.as_secs())]
    TimedOut {
        program: String,
        timeout: Duration,
        output: String,
    },

    #[error("{program} was interrupted")]
    Interrupted { program: String, output: String },
}

/// 執行外部工具的介面，呼叫端會阻塞到程序結束
pub trait ToolRunner {
    fn run(&self, command: Command) -> Result<ToolOutput, RunError>;
}

/// 以子程序執行外部工具
///
/// 兩條讀取執行緒把 stdout/stderr 逐行寫進同一個緩衝區，
/// 主執行緒以 `try_wait` 輪詢，逾時或收到中斷信號時終止子程序。
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl ProcessRunner {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|s| s.load(Ordering::SeqCst))
    }

    fn spawn_output_reader(
        stream: Box<dyn Read + Send>,
        combined: Arc<Mutex<Vec<u8>>>,
    ) -> JoinHandle<()> {
        thread::spawn(move || {
            let mut reader = BufReader::new(stream);
            let mut line = Vec::new();
            while let Ok(bytes) = reader.read_until(b'\n', &mut line) {
                if bytes == 0 {
                    break;
                }
                if let Ok(mut buffer) = combined.lock() {
                    buffer.extend_from_slice(&line);
                }
                line.clear();
            }
        })
    }

    fn collect_output(readers: Vec<JoinHandle<()>>, combined: &Arc<Mutex<Vec<u8>>>) -> String {
        for reader in readers {
            let _ = reader.join();
        }
        combined
            .lock()
            .map(|buffer| String::from_utf8_lossy(&buffer).into_owned())
            .unwrap_or_default()
    }

    fn terminate(child: &mut Child, program: &str) {
        warn!("終止程序 [{}] {program}", child.id());
        let _ = child.kill();
        let _ = child.wait();
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&self, mut command: Command) -> Result<ToolOutput, RunError> {
        let program = command.get_program().to_string_lossy().into_owned();
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(|source| RunError::Launch {
            program: program.clone(),
            source,
        })?;
        debug!("啟動程序 [{}] {program}", child.id());

        let combined = Arc::new(Mutex::new(Vec::new()));
        let streams: [Option<Box<dyn Read + Send>>; 2] = [
            child.stdout.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
            child.stderr.take().map(|s| Box::new(s) as Box<dyn Read + Send>),
        ];
        let readers: Vec<JoinHandle<()>> = streams
            .into_iter()
            .flatten()
            .map(|stream| Self::spawn_output_reader(stream, Arc::clone(&combined)))
            .collect();

        let started = Instant::now();
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(source) => {
                    Self::terminate(&mut child, &program);
                    let _ = Self::collect_output(readers, &combined);
                    return Err(RunError::Wait { program, source });
                }
            }

            if self.is_shutdown_requested() {
                Self::terminate(&mut child, &program);
                let output = Self::collect_output(readers, &combined);
                return Err(RunError::Interrupted { program, output });
            }

            if let Some(timeout) = self.timeout.filter(|t| started.elapsed() >= *t) {
                Self::terminate(&mut child, &program);
                let output = Self::collect_output(readers, &combined);
                return Err(RunError::TimedOut {
                    program,
                    timeout,
                    output,
                });
            }

            thread::sleep(POLL_INTERVAL);
        };

        let output = Self::collect_output(readers, &combined);
        Ok(ToolOutput {
            exit_code: status.code(),
            success: status.success(),
            output,
        })
    }
}

/// 將指令轉為可閱讀的命令列字串（僅供診斷訊息使用）
pub struct CommandLine<'a>(pub &'a Command);

impl fmt::Display for CommandLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.get_program().to_string_lossy())?;
        for arg in self.0.get_args() {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_quotes_whitespace() {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-i", "/videos/my clip.mp4", "-f", "null", "-"]);
        assert_eq!(
            CommandLine(&cmd).to_string(),
            "ffmpeg -i \"/videos/my clip.mp4\" -f null -"
        );
    }

    #[test]
    fn test_launch_missing_program() {
        let runner = ProcessRunner::new();
        let err = runner
            .run(Command::new("/nonexistent/tool_12345"))
            .unwrap_err();
        assert!(matches!(err, RunError::Launch { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_combined_output_and_exit_code() {
        let runner = ProcessRunner::new();
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "echo out; echo err 1>&2; exit 3"]);
        let output = runner.run(cmd).unwrap();
        assert!(!output.success);
        assert_eq!(output.exit_code, Some(3));
        assert!(output.output.contains("out"));
        assert!(output.output.contains("err"));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_child() {
        let runner = ProcessRunner::new().with_timeout(Some(Duration::from_millis(200)));
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);
        let started = Instant::now();
        let err = runner.run(cmd).unwrap_err();
        assert!(matches!(err, RunError::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_shutdown_signal_interrupts_child() {
        let signal = Arc::new(AtomicBool::new(true));
        let runner = ProcessRunner::new().with_shutdown_signal(signal);
        let mut cmd = Command::new("sh");
        cmd.args(["-c", "exec sleep 5"]);
        let err = runner.run(cmd).unwrap_err();
        assert!(matches!(err, RunError::Interrupted { .. }));
    }
}
