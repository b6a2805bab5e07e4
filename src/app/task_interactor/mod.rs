// Task interactor - Probe, plan and execute a single task

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::domain::errors::ProbeError;
use crate::domain::model::*;
use crate::domain::rules::OutputNaming;
use crate::engine::{Operation, ProcessExecutor};
use crate::output::OutputVerifier;
use crate::planner::{plan_clips, plan_split_with, SplitOptions};
use crate::probe::MediaProbe;
use crate::utils::path::PathUtils;

/// Safety factor used when cutting an oversized segment again
const RESPLIT_SAFETY_FACTOR: f64 = 0.95;

/// Runs one task end to end.
///
/// Never returns an error: probe, plan and engine failures all become a
/// failed [`ProcessResult`] for the task's slot.
#[derive(Clone)]
pub struct TaskInteractor {
    probe: MediaProbe,
    executor: ProcessExecutor,
    split_options: SplitOptions,
}

impl TaskInteractor {
    pub fn new(probe: MediaProbe, executor: ProcessExecutor, split_options: SplitOptions) -> Self {
        Self {
            probe,
            executor,
            split_options,
        }
    }

    pub async fn run_task(&self, task: &Task) -> ProcessResult {
        debug!(task = %task.label(), "Running task");
        let result = match task {
            Task::Download(params) => self.download(params).await,
            Task::Split(params) => self.split(params).await,
            Task::Clip(params) => self.clip(params).await,
        };

        if result.success {
            info!(task = %task.label(), outputs = result.output_files.len(), "Task succeeded");
        } else {
            warn!(
                task = %task.label(),
                error = result.error_message.as_deref().unwrap_or("unknown"),
                "Task failed"
            );
        }
        result
    }

    async fn download(&self, params: &DownloadParams) -> ProcessResult {
        self.executor
            .execute(Operation::Download {
                url: params.url.clone(),
                destination: params.output.clone(),
            })
            .await
    }

    async fn split(&self, params: &SplitParams) -> ProcessResult {
        let info = match self.probe.probe(&params.source).await {
            Ok(info) => info,
            Err(e) => return ProcessResult::failed(e.to_string()),
        };

        // Sizes beyond i64 cannot be real targets; saturate instead of wrapping
        let target = i64::try_from(params.max_size_bytes).unwrap_or(i64::MAX);
        let plan = match plan_split_with(&info, target, &self.split_options) {
            Ok(plan) => plan,
            Err(e) => return ProcessResult::failed(e.to_string()),
        };
        info!(
            source = %params.source.display(),
            segments = plan.len(),
            segment_seconds = plan.estimated_segment_seconds,
            "Split planned"
        );

        let mut parts = Vec::with_capacity(plan.len());
        for range in plan.segments() {
            let destination = OutputNaming::segment_path(
                &params.output_base,
                &params.output_extension,
                range.index,
                plan.len(),
            );
            parts.push(
                self.executor
                    .execute(Operation::ExtractSegment {
                        source: params.source.clone(),
                        range: *range,
                        destination,
                    })
                    .await,
            );
        }

        let mut merged = ProcessResult::merge(parts);
        let produced = std::mem::take(&mut merged.output_files);
        merged.output_files = self.refine_oversized(produced, params.max_size_bytes).await;

        // Whatever is still too large after the last round is only reported
        let warnings = OutputVerifier::oversized(&merged.output_files, params.max_size_bytes).await;
        merged.with_warnings(warnings)
    }

    /// Cut segments that exceed `limit_bytes` again, for up to `max_rounds`
    /// passes. Order is preserved: sub-segments replace their parent in place.
    async fn refine_oversized(&self, files: Vec<PathBuf>, limit_bytes: u64) -> Vec<PathBuf> {
        let mut current = files;
        for round in 1..=self.split_options.max_rounds {
            let mut next = Vec::with_capacity(current.len());
            let mut refined = false;
            for file in current {
                match self.resplit(&file, limit_bytes).await {
                    Some(parts) => {
                        info!(
                            round,
                            segment = %file.display(),
                            parts = parts.len(),
                            "Re-split oversized segment"
                        );
                        refined = true;
                        next.extend(parts);
                    }
                    None => next.push(file),
                }
            }
            current = next;
            if !refined {
                break;
            }
        }
        current
    }

    /// Split one oversized segment into `<segment>_sub_NNN` parts.
    ///
    /// Returns `None` when the segment fits, cannot be probed or planned, or
    /// any part fails; the segment is then kept as it is.
    async fn resplit(&self, segment: &Path, limit_bytes: u64) -> Option<Vec<PathBuf>> {
        let size = OutputVerifier::check_output(segment).await.ok()?;
        if size <= limit_bytes {
            return None;
        }

        let info = match self.probe.probe(segment).await {
            Ok(info) => info,
            Err(e) => {
                debug!(segment = %segment.display(), error = %e, "Cannot probe oversized segment");
                return None;
            }
        };
        // Plan from the measured size, not the bitrate the container reports
        let measured = MediaInfo::new(info.duration_seconds, size, None);
        let options = SplitOptions {
            safety_factor: RESPLIT_SAFETY_FACTOR,
            ..self.split_options
        };
        let target = i64::try_from(limit_bytes).unwrap_or(i64::MAX);
        let plan = match plan_split_with(&measured, target, &options) {
            Ok(plan) if plan.len() > 1 => plan,
            Ok(_) => return None,
            Err(e) => {
                debug!(
                    segment = %segment.display(),
                    error = %e,
                    "Cannot re-plan oversized segment"
                );
                return None;
            }
        };

        let (base, extension) = PathUtils::split_extension(segment);
        let mut sub_base = base.into_os_string();
        sub_base.push("_sub");
        let sub_base = PathBuf::from(sub_base);
        let extension = extension.unwrap_or_default();

        let mut produced = Vec::with_capacity(plan.len());
        for range in plan.segments() {
            let destination =
                OutputNaming::segment_path(&sub_base, &extension, range.index, plan.len());
            let result = self
                .executor
                .execute(Operation::ExtractSegment {
                    source: segment.to_path_buf(),
                    range: *range,
                    destination,
                })
                .await;
            if !result.success {
                warn!(
                    segment = %segment.display(),
                    error = result.error_message.as_deref().unwrap_or("unknown"),
                    "Re-split failed, keeping the oversized segment"
                );
                for file in produced.iter().chain(result.output_files.iter()) {
                    let _ = tokio::fs::remove_file(file).await;
                }
                return None;
            }
            produced.extend(result.output_files);
        }

        if let Err(e) = tokio::fs::remove_file(segment).await {
            warn!(segment = %segment.display(), error = %e, "Cannot remove re-split segment");
        }
        Some(produced)
    }

    async fn clip(&self, params: &ClipParams) -> ProcessResult {
        let info = match self.probe.probe(&params.source).await {
            Ok(info) => info,
            Err(e) => return ProcessResult::failed(e.to_string()),
        };

        let intervals = match plan_clips(&info, &params.intervals) {
            Ok(intervals) => intervals,
            Err(e) => return ProcessResult::failed(e.to_string()),
        };

        let mut parts = Vec::with_capacity(intervals.len());
        for (index, interval) in intervals.into_iter().enumerate() {
            let destination =
                OutputNaming::clip_path(&params.output_base, &params.output_extension, index);
            debug!(clip = index + 1, interval = %interval, "Extracting clip");
            parts.push(
                self.executor
                    .execute(Operation::ExtractClip {
                        source: params.source.clone(),
                        interval,
                        destination,
                        codecs: params.codecs.clone(),
                    })
                    .await,
            );
        }

        ProcessResult::merge(parts)
    }

    /// Probe a source outside of any task
    pub async fn inspect(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        self.probe.probe(path).await
    }
}
