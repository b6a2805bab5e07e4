//! Re-encoding clip invocation, used only when explicit codecs are requested

use std::path::Path;

use crate::domain::model::{ClipInterval, CodecChoice};
use crate::engine::{base_args, seconds_arg};
use crate::ports::EngineCommand;

/// Extract one interval, re-encoding whichever streams name a codec.
/// A stream without an explicit codec is still copied.
pub fn clip(
    source: &Path,
    interval: &ClipInterval,
    destination: &Path,
    codecs: &CodecChoice,
    overwrite: bool,
) -> EngineCommand {
    let video = codecs.video.as_deref().unwrap_or("copy");
    let audio = codecs.audio.as_deref().unwrap_or("copy");

    let mut args = base_args(overwrite);
    args.extend([
        "-ss".to_string(),
        seconds_arg(interval.start_seconds),
        "-to".to_string(),
        seconds_arg(interval.end_seconds),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-c:v".to_string(),
        video.to_string(),
        "-c:a".to_string(),
        audio.to_string(),
        destination.to_string_lossy().to_string(),
    ]);

    EngineCommand {
        operation: "clip",
        args,
        output: destination.to_path_buf(),
    }
}
