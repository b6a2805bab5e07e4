//! Stream copy invocations
//!
//! Everything here repackages existing streams without decoding them.

use std::path::Path;

use crate::domain::model::{ClipInterval, SegmentEnd, SegmentRange};
use crate::engine::{base_args, seconds_arg};
use crate::ports::EngineCommand;

/// Fetch a remote stream into a local container
pub fn download(url: &str, destination: &Path, overwrite: bool) -> EngineCommand {
    let mut args = base_args(overwrite);
    args.extend([
        "-i".to_string(),
        url.to_string(),
        "-c".to_string(),
        "copy".to_string(),
        destination.to_string_lossy().to_string(),
    ]);

    EngineCommand {
        operation: "download",
        args,
        output: destination.to_path_buf(),
    }
}

/// Cut one planned segment out of the source.
///
/// The open-ended last segment carries no `-to` so trailing packets past the
/// estimated boundary are kept.
pub fn segment(
    source: &Path,
    range: &SegmentRange,
    destination: &Path,
    overwrite: bool,
) -> EngineCommand {
    let mut args = base_args(overwrite);
    args.push("-ss".to_string());
    args.push(seconds_arg(range.start_seconds));
    if let SegmentEnd::At(end) = range.end {
        args.push("-to".to_string());
        args.push(seconds_arg(end));
    }
    args.extend([
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-map".to_string(),
        "0".to_string(),
        "-c".to_string(),
        "copy".to_string(),
        "-avoid_negative_ts".to_string(),
        "make_zero".to_string(),
        destination.to_string_lossy().to_string(),
    ]);

    EngineCommand {
        operation: "segment",
        args,
        output: destination.to_path_buf(),
    }
}

/// Extract one interval with both streams copied
pub fn clip(
    source: &Path,
    interval: &ClipInterval,
    destination: &Path,
    overwrite: bool,
) -> EngineCommand {
    let mut args = base_args(overwrite);
    args.extend([
        "-ss".to_string(),
        seconds_arg(interval.start_seconds),
        "-to".to_string(),
        seconds_arg(interval.end_seconds),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-c:v".to_string(),
        "copy".to_string(),
        "-c:a".to_string(),
        "copy".to_string(),
        destination.to_string_lossy().to_string(),
    ]);

    EngineCommand {
        operation: "clip",
        args,
        output: destination.to_path_buf(),
    }
}
