// Ports - Interface definitions (contracts)

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::{ExecutionError, ProbeError};
use crate::domain::model::MediaInfo;

/// Port for the external media engine.
///
/// The production adapter shells out to ffprobe/ffmpeg; tests use a
/// scripted adapter so planning and orchestration run without the binaries.
#[async_trait]
pub trait EnginePort: Send + Sync {
    /// Report duration, size, bitrate and codecs for a source file.
    /// Spawns at most one engine process and never retries.
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;

    /// Run one transcoding invocation to completion.
    ///
    /// Spawn failures and timeouts are errors; a process that ran is always
    /// reported through [`EngineOutput`], whatever its exit status.
    async fn run(&self, command: &EngineCommand) -> Result<EngineOutput, ExecutionError>;
}

/// One fully built engine invocation
#[derive(Debug, Clone, PartialEq)]
pub struct EngineCommand {
    /// Short operation name for logs ("download", "segment", "clip")
    pub operation: &'static str,
    /// Arguments passed after the engine binary
    pub args: Vec<String>,
    /// File the invocation is expected to produce
    pub output: PathBuf,
}

/// What a finished engine process left behind
#[derive(Debug, Clone, PartialEq)]
pub struct EngineOutput {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stderr: String,
}

impl EngineOutput {
    pub fn ok() -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stderr: String::new(),
        }
    }

    pub fn exited(code: i32, stderr: impl Into<String>) -> Self {
        Self {
            success: code == 0,
            exit_code: Some(code),
            stderr: stderr.into(),
        }
    }
}
