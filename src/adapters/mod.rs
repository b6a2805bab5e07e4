// Adapters - External system implementations

pub mod exec_ffmpeg;
pub mod probe_ffprobe;
/// Engine without external binaries, for tests of code built on this crate
pub mod scripted;
pub mod task_file;
pub mod toml_config;

// Re-export adapters
pub use exec_ffmpeg::FfmpegEngine;
pub use scripted::ScriptedEngine;
pub use task_file::{DocumentFormat, TaskFileAdapter};
pub use toml_config::TomlConfigAdapter;
