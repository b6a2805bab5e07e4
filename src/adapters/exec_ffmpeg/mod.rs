//! FFmpeg execution adapter
//!
//! Spawns the ffmpeg/ffprobe binaries as child processes and captures their
//! output. Each call is a single bounded unit of work; an optional timeout
//! kills the child when it expires.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::adapters::probe_ffprobe;
use crate::domain::errors::{ExecutionError, ProbeError};
use crate::domain::model::MediaInfo;
use crate::ports::{EngineCommand, EngineOutput, EnginePort};

/// Output captured from a finished tool process
#[derive(Debug, Clone)]
pub(crate) struct ToolOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn `program` with `args`, wait for it and capture stdout/stderr.
pub(crate) async fn run_tool(
    program: &Path,
    args: &[String],
    timeout: Option<Duration>,
    capture_stdout: bool,
) -> Result<ToolOutput, ExecutionError> {
    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(if capture_stdout {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = cmd.spawn().map_err(|e| ExecutionError::SpawnFailed {
        program: program.display().to_string(),
        message: e.to_string(),
    })?;

    let waited = match timeout {
        Some(limit) => tokio::time::timeout(limit, child.wait_with_output())
            .await
            .map_err(|_| ExecutionError::TimedOut(limit))?,
        None => child.wait_with_output().await,
    };

    let output = waited.map_err(|e| ExecutionError::SpawnFailed {
        program: program.display().to_string(),
        message: format!("failed while waiting: {}", e),
    })?;

    Ok(ToolOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    })
}

/// Look `name` up on `PATH`, falling back to the bare name so a missing
/// engine surfaces as a spawn failure at first use.
pub fn locate_binary(name: &str) -> PathBuf {
    match which::which(name) {
        Ok(path) => {
            info!(binary = name, path = %path.display(), "Located engine binary");
            path
        }
        Err(e) => {
            warn!(binary = name, error = %e, "Engine binary not found on PATH");
            PathBuf::from(name)
        }
    }
}

/// FFmpeg-based engine adapter
#[derive(Debug, Clone)]
pub struct FfmpegEngine {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
    timeout: Option<Duration>,
}

impl FfmpegEngine {
    /// Create an adapter for explicit binary paths
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
            timeout: None,
        }
    }

    /// Kill any engine process running longer than `timeout`
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl EnginePort for FfmpegEngine {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        probe_ffprobe::probe_file(&self.ffprobe, path, self.timeout).await
    }

    async fn run(&self, command: &EngineCommand) -> Result<EngineOutput, ExecutionError> {
        debug!(program = %self.ffmpeg.display(), operation = command.operation, "Spawning ffmpeg");
        let output = run_tool(&self.ffmpeg, &command.args, self.timeout, false).await?;

        Ok(EngineOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stderr: output.stderr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_spawn_failure() {
        let engine = FfmpegEngine::new(
            "/nonexistent/vidtask-test/ffmpeg",
            "/nonexistent/vidtask-test/ffprobe",
        );
        let command = EngineCommand {
            operation: "clip",
            args: vec!["-version".to_string()],
            output: PathBuf::from("unused.mp4"),
        };

        let err = engine.run(&command).await.unwrap_err();
        assert!(matches!(err, ExecutionError::SpawnFailed { .. }));
    }

    #[tokio::test]
    async fn test_missing_probe_binary_is_engine_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = dir.path().join("in.mp4");
        std::fs::write(&source, b"data").unwrap();
        let engine = FfmpegEngine::new("/nonexistent/ffmpeg", "/nonexistent/ffprobe");

        let err = engine.probe(&source).await.unwrap_err();
        assert!(matches!(err, ProbeError::EngineUnavailable(_)));
    }
}
