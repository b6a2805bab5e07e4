//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task document (.json, .yaml/.yml or .toml)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Print the batch result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Task document (.json, .yaml/.yml or .toml)
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the split command
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output path without extension; segment numbers are appended
    #[arg(short, long)]
    pub output_name: PathBuf,

    /// Target size per segment (e.g. 500MB, 1.5G, 2048)
    #[arg(short, long)]
    pub max_size: String,

    /// Output extension (default: the input's extension)
    #[arg(long)]
    pub ext: Option<String>,
}

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Input media file
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output path without extension; clip numbers are appended
    #[arg(short, long)]
    pub output_name: PathBuf,

    /// Interval as START-END (HH:MM:SS, MM:SS or seconds); repeatable
    #[arg(long = "interval", required = true)]
    pub intervals: Vec<String>,

    /// Output extension (default: the input's extension)
    #[arg(long)]
    pub ext: Option<String>,

    /// Video codec; omitted or "copy" keeps the stream as is
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Audio codec; omitted or "copy" keeps the stream as is
    #[arg(long)]
    pub audio_codec: Option<String>,
}

/// Arguments for the download command
#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// http(s) URL of the stream
    #[arg(short, long)]
    pub url: String,

    /// Local output file
    #[arg(short, long)]
    pub output: PathBuf,
}
