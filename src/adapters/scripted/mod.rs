// Scripted engine adapter - deterministic stand-in for ffmpeg/ffprobe
//
// Probe answers and run outcomes are scripted per path. Every call is logged
// so tests can assert on invocations, completion order and concurrency.
//
// This is part of the public API on purpose: integration tests and library
// users drive `AppContainer::with_engine` with it to exercise planning and
// orchestration without the ffmpeg binaries. It never spawns a process.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::errors::{ExecutionError, ProbeError};
use crate::domain::model::MediaInfo;
use crate::ports::{EngineCommand, EngineOutput, EnginePort};

/// Engine that answers from a script instead of spawning processes
#[derive(Debug)]
pub struct ScriptedEngine {
    media: Mutex<HashMap<PathBuf, Result<MediaInfo, ProbeError>>>,
    default_media: Option<MediaInfo>,
    runs: Mutex<HashMap<PathBuf, Result<EngineOutput, ExecutionError>>>,
    delays: Mutex<HashMap<PathBuf, Duration>>,
    output_sizes: Mutex<HashMap<PathBuf, usize>>,
    write_outputs: bool,
    invocations: Mutex<Vec<EngineCommand>>,
    completions: Mutex<Vec<PathBuf>>,
    running: AtomicUsize,
    peak_running: AtomicUsize,
}

impl Default for ScriptedEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedEngine {
    /// Engine whose runs all succeed and write a small output file.
    /// Probing an unscripted path fails with `UnreadableMedia`.
    pub fn new() -> Self {
        Self {
            media: Mutex::new(HashMap::new()),
            default_media: None,
            runs: Mutex::new(HashMap::new()),
            delays: Mutex::new(HashMap::new()),
            output_sizes: Mutex::new(HashMap::new()),
            write_outputs: true,
            invocations: Mutex::new(Vec::new()),
            completions: Mutex::new(Vec::new()),
            running: AtomicUsize::new(0),
            peak_running: AtomicUsize::new(0),
        }
    }

    /// Answer every unscripted probe with `info`
    pub fn with_default_media(mut self, info: MediaInfo) -> Self {
        self.default_media = Some(info);
        self
    }

    /// Exit successfully without writing anything
    pub fn without_outputs(mut self) -> Self {
        self.write_outputs = false;
        self
    }

    pub fn script_probe(&self, path: impl Into<PathBuf>, answer: Result<MediaInfo, ProbeError>) {
        lock(&self.media).insert(path.into(), answer);
    }

    /// Script the outcome of the run that writes `output`
    pub fn script_run(
        &self,
        output: impl Into<PathBuf>,
        outcome: Result<EngineOutput, ExecutionError>,
    ) {
        lock(&self.runs).insert(output.into(), outcome);
    }

    /// Hold the run that writes `output` for `delay` before it completes
    pub fn delay_run(&self, output: impl Into<PathBuf>, delay: Duration) {
        lock(&self.delays).insert(output.into(), delay);
    }

    /// Make the run that writes `output` leave `bytes` bytes behind
    pub fn script_output_size(&self, output: impl Into<PathBuf>, bytes: usize) {
        lock(&self.output_sizes).insert(output.into(), bytes);
    }

    /// Every run command received, in call order
    pub fn invocations(&self) -> Vec<EngineCommand> {
        lock(&self.invocations).clone()
    }

    /// Output paths of finished runs, in completion order
    pub fn completions(&self) -> Vec<PathBuf> {
        lock(&self.completions).clone()
    }

    /// Highest number of runs observed in flight at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak_running.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EnginePort for ScriptedEngine {
    async fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        if let Some(answer) = lock(&self.media).get(path) {
            return answer.clone();
        }
        self.default_media
            .clone()
            .ok_or_else(|| ProbeError::UnreadableMedia(format!("no script for {}", path.display())))
    }

    async fn run(&self, command: &EngineCommand) -> Result<EngineOutput, ExecutionError> {
        lock(&self.invocations).push(command.clone());
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_running.fetch_max(now, Ordering::SeqCst);

        let delay = lock(&self.delays).get(&command.output).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = lock(&self.runs)
            .get(&command.output)
            .cloned()
            .unwrap_or_else(|| Ok(EngineOutput::ok()));

        if self.write_outputs && matches!(&outcome, Ok(out) if out.success) {
            if let Some(parent) = command.output.parent() {
                let _ = tokio::fs::create_dir_all(parent).await;
            }
            let payload = match lock(&self.output_sizes).get(&command.output) {
                Some(&bytes) => vec![0u8; bytes],
                None => b"scripted output".to_vec(),
            };
            let _ = tokio::fs::write(&command.output, payload).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);
        lock(&self.completions).push(command.output.clone());
        outcome
    }
}

// A poisoned lock only means another test thread panicked; keep the data
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
