//! vidtask
//!
//! Plans size-bounded splits, validates clip intervals and orchestrates
//! ordered and parallel batches of download/split/clip tasks. All media work
//! is delegated to an external ffmpeg/ffprobe engine behind [`ports::EnginePort`].

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use app::{AppContainer, TaskInteractor, TaskOrchestrator};
pub use config::Settings;
pub use domain::model::{BatchResult, MediaInfo, ProcessResult, Task};
pub use error::{VidtaskError, VidtaskResult};
