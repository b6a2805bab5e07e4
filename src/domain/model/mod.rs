// Domain models - Core types and data structures

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{ConfigError, ExecutionError};

/// Snapshot of what the engine reported about one source file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaInfo {
    pub duration_seconds: f64,
    pub size_bytes: u64,
    pub average_bitrate_bps: f64,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub format_name: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl MediaInfo {
    /// Build a snapshot, deriving the bitrate from size and duration when
    /// the engine did not report a usable one.
    pub fn new(duration_seconds: f64, size_bytes: u64, reported_bitrate_bps: Option<f64>) -> Self {
        let average_bitrate_bps = match reported_bitrate_bps {
            Some(bps) if bps.is_finite() && bps > 0.0 => bps,
            _ => Self::derive_bitrate(duration_seconds, size_bytes),
        };

        Self {
            duration_seconds,
            size_bytes,
            average_bitrate_bps,
            video_codec: None,
            audio_codec: None,
            format_name: None,
            width: None,
            height: None,
        }
    }

    /// Attach codec names
    pub fn with_codecs(mut self, video: Option<String>, audio: Option<String>) -> Self {
        self.video_codec = video;
        self.audio_codec = audio;
        self
    }

    /// size * 8 / duration, or zero when the duration is unusable
    fn derive_bitrate(duration_seconds: f64, size_bytes: u64) -> f64 {
        if duration_seconds.is_finite() && duration_seconds > 0.0 {
            size_bytes as f64 * 8.0 / duration_seconds
        } else {
            0.0
        }
    }
}

/// End of a planned segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SegmentEnd {
    At(f64),
    /// Last segment: runs to the end of the source
    ToEnd,
}

/// One time range of a split plan
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentRange {
    pub index: usize,
    pub start_seconds: f64,
    pub end: SegmentEnd,
}

impl SegmentRange {
    /// Resolve the end against the source duration
    pub fn end_seconds(&self, duration_seconds: f64) -> f64 {
        match self.end {
            SegmentEnd::At(end) => end,
            SegmentEnd::ToEnd => duration_seconds,
        }
    }
}

/// Ordered, contiguous cut points covering a whole source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitPlan {
    pub duration_seconds: f64,
    pub estimated_segment_seconds: f64,
    segments: Vec<SegmentRange>,
}

impl SplitPlan {
    pub(crate) fn new(
        duration_seconds: f64,
        estimated_segment_seconds: f64,
        segments: Vec<SegmentRange>,
    ) -> Self {
        Self {
            duration_seconds,
            estimated_segment_seconds,
            segments,
        }
    }

    pub fn segments(&self) -> &[SegmentRange] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// (start, end) pairs with the open end resolved to the duration
    pub fn bounds(&self) -> Vec<(f64, f64)> {
        self.segments
            .iter()
            .map(|s| (s.start_seconds, s.end_seconds(self.duration_seconds)))
            .collect()
    }
}

/// A validated clip request, already clamped to the source
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClipInterval {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl ClipInterval {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

impl fmt::Display for ClipInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s-{:.3}s", self.start_seconds, self.end_seconds)
    }
}

/// Task type tag as it appears in task documents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Download,
    Split,
    Clip,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Download => "download",
            TaskKind::Split => "split",
            TaskKind::Clip => "clip",
        };
        f.write_str(name)
    }
}

/// Codec selection for clip extraction; `None` means stream copy
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CodecChoice {
    pub video: Option<String>,
    pub audio: Option<String>,
}

impl CodecChoice {
    /// Normalize raw codec names: empty and "copy" both mean stream copy
    pub fn from_names(video: Option<&str>, audio: Option<&str>) -> Self {
        fn explicit(name: Option<&str>) -> Option<String> {
            name.map(str::trim)
                .filter(|n| !n.is_empty() && !n.eq_ignore_ascii_case("copy"))
                .map(str::to_string)
        }

        Self {
            video: explicit(video),
            audio: explicit(audio),
        }
    }

    pub fn is_stream_copy(&self) -> bool {
        self.video.is_none() && self.audio.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DownloadParams {
    pub url: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SplitParams {
    pub source: PathBuf,
    /// Output path without extension; segment numbers are appended to it
    pub output_base: PathBuf,
    pub output_extension: String,
    pub max_size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipParams {
    pub source: PathBuf,
    pub output_base: PathBuf,
    pub output_extension: String,
    /// Requested (start, end) pairs in seconds, not yet validated
    pub intervals: Vec<(f64, f64)>,
    pub codecs: CodecChoice,
}

/// A single unit of work, closed over the supported kinds
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Task {
    Download(DownloadParams),
    Split(SplitParams),
    Clip(ClipParams),
}

impl Task {
    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Download(_) => TaskKind::Download,
            Task::Split(_) => TaskKind::Split,
            Task::Clip(_) => TaskKind::Clip,
        }
    }

    /// Short human label used in logs and summaries
    pub fn label(&self) -> String {
        match self {
            Task::Download(p) => format!("download {}", p.url),
            Task::Split(p) => format!("split {}", p.source.display()),
            Task::Clip(p) => format!("clip {}", p.source.display()),
        }
    }
}

/// A task with an explicit execution position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderedTask {
    pub order: i64,
    pub task: Task,
}

/// Same-kind tasks executed together, sequentially or concurrently
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchGroup {
    kind: TaskKind,
    path: PathBuf,
    is_parallel: bool,
    tasks: Vec<Task>,
}

impl BatchGroup {
    /// Create a group, rejecting tasks of a different kind
    pub fn new(
        position: usize,
        kind: TaskKind,
        path: impl Into<PathBuf>,
        is_parallel: bool,
        tasks: Vec<Task>,
    ) -> Result<Self, ConfigError> {
        if let Some(other) = tasks.iter().find(|t| t.kind() != kind) {
            return Err(ConfigError::MixedGroup {
                group: position,
                expected: kind.to_string(),
                found: other.kind().to_string(),
            });
        }

        Ok(Self {
            kind,
            path: path.into(),
            is_parallel,
            tasks,
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_parallel(&self) -> bool {
        self.is_parallel
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Everything a task document declares, already typed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TaskDocument {
    pub ordered: Vec<OrderedTask>,
    pub groups: Vec<BatchGroup>,
}

impl TaskDocument {
    pub fn total_tasks(&self) -> usize {
        self.ordered.len() + self.groups.iter().map(BatchGroup::len).sum::<usize>()
    }
}

/// Outcome of one engine invocation or one task
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcessResult {
    pub success: bool,
    pub output_files: Vec<PathBuf>,
    pub error_message: Option<String>,
    pub exit_diagnostics: Option<String>,
    pub warnings: Vec<String>,
}

impl ProcessResult {
    pub fn succeeded(output_files: Vec<PathBuf>) -> Self {
        Self {
            success: true,
            output_files,
            ..Default::default()
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Failure carrying whatever the engine printed
    pub fn from_execution_error(error: &ExecutionError) -> Self {
        Self {
            success: false,
            error_message: Some(error.to_string()),
            exit_diagnostics: error.diagnostics().map(str::to_string),
            ..Default::default()
        }
    }

    /// Slot filled for a task that never ran because the batch aborted
    pub fn skipped(reason: &str) -> Self {
        Self::failed(format!("Skipped: {}", reason))
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    /// Fold the per-invocation results of one task into a single outcome.
    /// The task succeeds only if every part did.
    pub fn merge(parts: Vec<ProcessResult>) -> Self {
        if parts.is_empty() {
            return Self::failed("Nothing was executed");
        }

        let success = parts.iter().all(|p| p.success);
        let mut merged = Self {
            success,
            ..Default::default()
        };
        let mut errors = Vec::new();
        let mut diagnostics = Vec::new();

        for (index, part) in parts.into_iter().enumerate() {
            merged.output_files.extend(part.output_files);
            merged.warnings.extend(part.warnings);
            if let Some(message) = part.error_message {
                errors.push(format!("#{}: {}", index + 1, message));
            }
            if let Some(diag) = part.exit_diagnostics {
                diagnostics.push(diag);
            }
        }

        if !errors.is_empty() {
            merged.error_message = Some(errors.join("; "));
        }
        if !diagnostics.is_empty() {
            merged.exit_diagnostics = Some(diagnostics.join("\n"));
        }
        merged
    }
}

/// Lifecycle of one batch run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Idle,
    Running,
    Completed,
    Aborted,
}

/// Per-task outcomes of a run, in declaration order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub per_task: Vec<ProcessResult>,
    pub overall_success: bool,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchResult {
    pub fn new(
        per_task: Vec<ProcessResult>,
        state: RunState,
        started_at: DateTime<Utc>,
    ) -> Self {
        let overall_success = per_task.iter().all(|r| r.success);
        Self {
            per_task,
            overall_success,
            state,
            started_at,
            finished_at: Utc::now(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.per_task.iter().filter(|r| !r.success).count()
    }

    pub fn output_files(&self) -> impl Iterator<Item = &PathBuf> {
        self.per_task.iter().flat_map(|r| r.output_files.iter())
    }
}
