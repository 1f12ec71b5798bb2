use crate::{Result, VimHelpError};
use std::ffi::OsStr;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::debug;

pub const MAX_OUTPUT_CAPTURE_BYTES: usize = 1_048_576;
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct StreamCapture {
    pub bytes: Vec<u8>,
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    #[must_use]
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Turns a failed run into an `Exec` error, preferring stderr for the text.
    ///
    /// # Errors
    ///
    /// Returns `VimHelpError::Exec` when the process exited unsuccessfully.
    pub fn into_success(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }
        let error_text = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(VimHelpError::exec(self.status.code(), self.stdout, error_text))
    }
}

pub async fn capture_stream_limited<R>(mut stream: R, max_bytes: usize) -> Result<StreamCapture>
where
    R: AsyncRead + Unpin,
{
    let mut bytes = Vec::new();
    let mut truncated = false;
    let mut chunk = [0_u8; 8_192];

    loop {
        let read = stream.read(&mut chunk).await?;
        if read == 0 {
            break;
        }

        let remaining = max_bytes.saturating_sub(bytes.len());
        if remaining == 0 {
            truncated = true;
            continue;
        }

        let to_copy = remaining.min(read);
        bytes.extend_from_slice(&chunk[..to_copy]);
        if to_copy < read {
            truncated = true;
        }
    }

    Ok(StreamCapture { bytes, truncated })
}

/// Runs `program` to completion, capturing both output streams.
///
/// The child is killed when it outlives `timeout`.
///
/// # Errors
///
/// Returns `IoError` when the program cannot be started and `Timeout` when it
/// runs too long. A non-zero exit status is not an error here; see
/// [`CommandOutput::into_success`].
pub async fn run_command<I, S>(
    program: &str,
    args: I,
    envs: &[(&str, &str)],
    timeout: Duration,
) -> Result<CommandOutput>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut child = Command::new(program)
        .args(args)
        .envs(envs.iter().copied())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|err| {
            VimHelpError::IoError(std::io::Error::new(
                err.kind(),
                format!("Failed to execute {program}: {err}"),
            ))
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| VimHelpError::Internal(format!("Failed to capture {program} stdout")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| VimHelpError::Internal(format!("Failed to capture {program} stderr")))?;

    let stdout_task =
        tokio::spawn(async move { capture_stream_limited(stdout, MAX_OUTPUT_CAPTURE_BYTES).await });
    let stderr_task =
        tokio::spawn(async move { capture_stream_limited(stderr, MAX_OUTPUT_CAPTURE_BYTES).await });

    let status = if let Ok(wait_result) = tokio::time::timeout(timeout, child.wait()).await {
        wait_result?
    } else {
        let _ = child.kill().await;
        return Err(VimHelpError::Timeout {
            operation: program.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        });
    };

    let stdout_capture = stdout_task
        .await
        .map_err(|err| VimHelpError::Internal(format!("Failed to read {program} stdout: {err}")))??;
    let stderr_capture = stderr_task
        .await
        .map_err(|err| VimHelpError::Internal(format!("Failed to read {program} stderr: {err}")))??;

    debug!(
        "{} exited with {} (stdout {} bytes{}, stderr {} bytes)",
        program,
        status,
        stdout_capture.bytes.len(),
        if stdout_capture.truncated { ", truncated" } else { "" },
        stderr_capture.bytes.len()
    );

    Ok(CommandOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout_capture.bytes).into_owned(),
        stderr: String::from_utf8_lossy(&stderr_capture.bytes).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::capture_stream_limited;

    #[tokio::test]
    async fn capture_stops_at_limit() {
        let input: &[u8] = b"0123456789";
        let capture = capture_stream_limited(input, 4).await.expect("capture");
        assert_eq!(capture.bytes, b"0123");
        assert!(capture.truncated);
    }

    #[tokio::test]
    async fn capture_keeps_short_streams_whole() {
        let input: &[u8] = b"vim";
        let capture = capture_stream_limited(input, 1024).await.expect("capture");
        assert_eq!(capture.bytes, b"vim");
        assert!(!capture.truncated);
    }

    #[tokio::test]
    async fn missing_program_is_an_io_error() {
        let result = super::run_command(
            "definitely-not-a-real-program-vimhelp",
            ["--version"],
            &[],
            super::DEFAULT_COMMAND_TIMEOUT,
        )
        .await;
        assert!(matches!(result, Err(crate::VimHelpError::IoError(_))));
    }
}
