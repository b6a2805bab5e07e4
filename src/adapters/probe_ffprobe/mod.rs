//! FFprobe adapter for media file probing
//!
//! Runs `ffprobe -print_format json -show_format -show_streams` and maps the
//! report onto [`MediaInfo`].

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::adapters::exec_ffmpeg::run_tool;
use crate::domain::errors::{ExecutionError, ProbeError};
use crate::domain::model::MediaInfo;

#[derive(Debug, Deserialize)]
struct FfprobeReport {
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

// ffprobe prints numeric format fields as strings
#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
    bit_rate: Option<String>,
    size: Option<String>,
    format_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// Probe `path` with the ffprobe binary at `ffprobe`
pub async fn probe_file(
    ffprobe: &Path,
    path: &Path,
    timeout: Option<Duration>,
) -> Result<MediaInfo, ProbeError> {
    let size_bytes = tokio::fs::metadata(path)
        .await
        .map(|m| m.len())
        .map_err(|e| ProbeError::NotFound(format!("{}: {}", path.display(), e)))?;

    let args = vec![
        "-v".to_string(),
        "error".to_string(),
        "-print_format".to_string(),
        "json".to_string(),
        "-show_format".to_string(),
        "-show_streams".to_string(),
        path.to_string_lossy().to_string(),
    ];

    let output = run_tool(ffprobe, &args, timeout, true)
        .await
        .map_err(|e| match e {
            ExecutionError::SpawnFailed { .. } | ExecutionError::TimedOut(_) => {
                ProbeError::EngineUnavailable(e.to_string())
            }
            other => ProbeError::UnreadableMedia(other.to_string()),
        })?;

    if !output.status.success() {
        return Err(ProbeError::UnreadableMedia(format!(
            "{}: ffprobe exited with {}: {}",
            path.display(),
            output.status,
            output.stderr.trim()
        )));
    }

    let info = parse_report(&output.stdout, Some(size_bytes))?;
    debug!(
        path = %path.display(),
        duration = info.duration_seconds,
        bitrate = info.average_bitrate_bps,
        "Probed media"
    );
    Ok(info)
}

/// Map an ffprobe JSON report onto [`MediaInfo`].
///
/// `size_bytes` overrides the size in the report when the caller measured
/// the file itself.
pub fn parse_report(json: &str, size_bytes: Option<u64>) -> Result<MediaInfo, ProbeError> {
    let report: FfprobeReport = serde_json::from_str(json)
        .map_err(|e| ProbeError::UnreadableMedia(format!("invalid ffprobe report: {}", e)))?;

    let format = report
        .format
        .ok_or_else(|| ProbeError::UnreadableMedia("report has no format section".to_string()))?;

    let duration = format
        .duration
        .as_deref()
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ProbeError::UnreadableMedia("report has no usable duration".to_string()))?;

    let size = size_bytes
        .or_else(|| format.size.as_deref().and_then(|s| s.trim().parse().ok()))
        .unwrap_or(0);
    let bitrate = format
        .bit_rate
        .as_deref()
        .and_then(|b| b.trim().parse::<f64>().ok());

    let first_of = |kind: &str| {
        report
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some(kind))
    };
    let video = first_of("video");
    let audio = first_of("audio");

    let mut info = MediaInfo::new(duration, size, bitrate).with_codecs(
        video.and_then(|s| s.codec_name.clone()),
        audio.and_then(|s| s.codec_name.clone()),
    );
    info.format_name = format.format_name;
    info.width = video.and_then(|s| s.width);
    info.height = video.and_then(|s| s.height);
    Ok(info)
}
