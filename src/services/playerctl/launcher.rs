use std::{io, pin::Pin, process::Stdio};

use async_stream::stream;
use async_trait::async_trait;
use futures::Stream;
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    process::{Child, Command},
};
use tracing::{debug, warn};

/// Boxed stream of lines produced by a follow process.
pub type LineStream = Pin<Box<dyn Stream<Item = String> + Send>>;

/// Result of a process that ran to completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    /// Captured standard output
    pub stdout: String,
    /// Captured standard error
    pub stderr: String,
}

impl ProcessOutput {
    /// Successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Failed output with the given exit code and stderr.
    pub fn failed(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// Whether the process exited with status zero.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// A long running process whose stdout is consumed line by line.
pub struct FollowProcess {
    lines: LineStream,
    child: Option<Child>,
}

impl FollowProcess {
    /// Wrap a line stream that has no OS process behind it.
    pub fn from_stream(lines: LineStream) -> Self {
        Self { lines, child: None }
    }

    /// Wrap a line stream read from `child`.
    pub fn with_child(lines: LineStream, child: Child) -> Self {
        Self {
            lines,
            child: Some(child),
        }
    }

    /// Split into the line stream and the owning process, if any.
    pub fn into_parts(self) -> (LineStream, Option<Child>) {
        (self.lines, self.child)
    }
}

/// Spawns the control binary.
///
/// The seam between the supervisor and the operating system: production
/// code uses [`SystemLauncher`], tests script the output.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Run the binary to completion and capture its output.
    ///
    /// # Errors
    /// Returns the spawn error if the process could not be started.
    async fn output(&self, args: Vec<String>) -> io::Result<ProcessOutput>;

    /// Start a long running invocation and stream its stdout lines.
    ///
    /// # Errors
    /// Returns the spawn error if the process could not be started.
    fn spawn_lines(&self, args: Vec<String>) -> io::Result<FollowProcess>;
}

/// Launches the real control binary through `tokio::process`.
#[derive(Debug, Clone)]
pub struct SystemLauncher {
    binary: String,
}

impl SystemLauncher {
    /// Create a launcher for the given binary name or path.
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Binary this launcher invokes.
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[async_trait]
impl ProcessLauncher for SystemLauncher {
    async fn output(&self, args: Vec<String>) -> io::Result<ProcessOutput> {
        let output = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }

    fn spawn_lines(&self, args: Vec<String>) -> io::Result<FollowProcess> {
        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("follow process has no stdout"))?;

        let lines: LineStream = Box::pin(stream! {
            let mut reader = BufReader::new(stdout);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => {
                        debug!(?args, "Follow process closed stdout");
                        break;
                    }
                    Ok(_) => {
                        yield decode_line(&buf);
                    }
                    Err(e) => {
                        warn!(?args, error = %e, "Failed reading follow process output");
                        break;
                    }
                }
            }
        });

        Ok(FollowProcess::with_child(lines, child))
    }
}

/// Strip the line terminator and decode, replacing invalid UTF-8.
fn decode_line(raw: &[u8]) -> String {
    let line = raw.strip_suffix(b"\n").unwrap_or(raw);
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

#[cfg(test)]
mod tests {
    use futures::StreamExt;

    use super::*;

    #[test]
    fn line_terminators_are_stripped() {
        assert_eq!(decode_line(b"status\n"), "status");
        assert_eq!(decode_line(b"status\r\n"), "status");
        assert_eq!(decode_line(b"status"), "status");
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        assert_eq!(decode_line(b"title:B\xff\n"), "title:B\u{fffd}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn undecodable_line_does_not_end_the_stream() {
        let launcher = SystemLauncher::new("printf");
        let process = launcher
            .spawn_lines(vec![
                "title:A\\ntitle:B\\377\\nplayer:strawberry\\n".to_string(),
            ])
            .unwrap();
        let (lines, _child) = process.into_parts();

        let lines: Vec<String> = lines.collect().await;

        assert_eq!(
            lines,
            vec!["title:A", "title:B\u{fffd}", "player:strawberry"]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn captured_output_reports_exit_code() {
        let output = SystemLauncher::new("sh")
            .output(vec!["-c".to_string(), "echo ok; exit 3".to_string()])
            .await
            .unwrap();

        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout, "ok\n");
        assert!(!output.success());
    }
}
