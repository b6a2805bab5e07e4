use std::sync::Arc;

use crate::adapters::exec_ffmpeg::locate_binary;
use crate::adapters::FfmpegEngine;
use crate::app::batch_interactor::TaskOrchestrator;
use crate::app::task_interactor::TaskInteractor;
use crate::config::Settings;
use crate::domain::errors::OrchestratorError;
use crate::engine::ProcessExecutor;
use crate::ports::EnginePort;
use crate::probe::MediaProbe;

/// Wires the engine adapter into the interactors
pub struct AppContainer {
    task_interactor: Arc<TaskInteractor>,
    workers: usize,
    settings: Settings,
}

impl AppContainer {
    /// Production wiring: ffmpeg/ffprobe from settings, else from `PATH`
    pub fn new(settings: &Settings) -> Self {
        let ffmpeg = settings
            .ffmpeg_path
            .clone()
            .unwrap_or_else(|| locate_binary("ffmpeg"));
        let ffprobe = settings
            .ffprobe_path
            .clone()
            .unwrap_or_else(|| locate_binary("ffprobe"));

        let engine = FfmpegEngine::new(ffmpeg, ffprobe).with_timeout(settings.process_timeout());
        Self::with_engine(Arc::new(engine), settings)
    }

    /// Wiring around any engine implementation
    pub fn with_engine(engine: Arc<dyn EnginePort>, settings: &Settings) -> Self {
        let task_interactor = Arc::new(TaskInteractor::new(
            MediaProbe::new(Arc::clone(&engine)),
            ProcessExecutor::new(engine, settings.overwrite),
            settings.split,
        ));

        Self {
            task_interactor,
            workers: settings.workers,
            settings: settings.clone(),
        }
    }

    pub fn task_interactor(&self) -> Arc<TaskInteractor> {
        Arc::clone(&self.task_interactor)
    }

    pub fn orchestrator(&self) -> Result<TaskOrchestrator, OrchestratorError> {
        TaskOrchestrator::new(
            self.task_interactor(),
            self.workers,
            self.settings.outcome_policy(),
        )
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
