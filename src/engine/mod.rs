//! Process execution: build engine invocations, run them, classify the outcome

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::ExecutionError;
use crate::domain::model::{ClipInterval, CodecChoice, ProcessResult, SegmentRange};
use crate::output::verifier::OutputVerifier;
use crate::ports::{EngineCommand, EnginePort};
use crate::utils::path::PathUtils;

pub mod copy;
pub mod reencode;

/// One unit of work for the engine
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Download {
        url: String,
        destination: PathBuf,
    },
    ExtractSegment {
        source: PathBuf,
        range: SegmentRange,
        destination: PathBuf,
    },
    ExtractClip {
        source: PathBuf,
        interval: ClipInterval,
        destination: PathBuf,
        codecs: CodecChoice,
    },
}

impl Operation {
    pub fn destination(&self) -> &PathBuf {
        match self {
            Operation::Download { destination, .. }
            | Operation::ExtractSegment { destination, .. }
            | Operation::ExtractClip { destination, .. } => destination,
        }
    }

    fn with_destination(mut self, path: PathBuf) -> Self {
        match &mut self {
            Operation::Download { destination, .. }
            | Operation::ExtractSegment { destination, .. }
            | Operation::ExtractClip { destination, .. } => *destination = path,
        }
        self
    }
}

/// Runs operations through the engine, one process per call, no retries
#[derive(Clone)]
pub struct ProcessExecutor {
    engine: Arc<dyn EnginePort>,
    overwrite: bool,
}

impl ProcessExecutor {
    pub fn new(engine: Arc<dyn EnginePort>, overwrite: bool) -> Self {
        Self { engine, overwrite }
    }

    /// Build the exact invocation for an operation.
    /// Stream copy unless the clip names explicit codecs.
    pub fn build_command(&self, operation: &Operation) -> EngineCommand {
        match operation {
            Operation::Download { url, destination } => {
                copy::download(url, destination, self.overwrite)
            }
            Operation::ExtractSegment {
                source,
                range,
                destination,
            } => copy::segment(source, range, destination, self.overwrite),
            Operation::ExtractClip {
                source,
                interval,
                destination,
                codecs,
            } => {
                if codecs.is_stream_copy() {
                    copy::clip(source, interval, destination, self.overwrite)
                } else {
                    reencode::clip(source, interval, destination, codecs, self.overwrite)
                }
            }
        }
    }

    /// Run one operation and classify the outcome.
    ///
    /// Success requires a zero exit and a non-empty output file. Anything
    /// else is a failure carrying the engine's diagnostic text.
    pub async fn execute(&self, operation: Operation) -> ProcessResult {
        let operation = self.resolve_destination(operation).await;
        let destination = operation.destination().clone();

        if let Err(e) = PathUtils::ensure_parent_dir(&destination).await {
            return ProcessResult::failed(format!(
                "Cannot create output directory for {}: {}",
                destination.display(),
                e
            ));
        }

        let command = self.build_command(&operation);
        debug!(operation = command.operation, args = ?command.args, "Invoking engine");

        let output = match self.engine.run(&command).await {
            Ok(output) => output,
            Err(e) => {
                warn!(operation = command.operation, error = %e, "Engine invocation failed");
                return ProcessResult::from_execution_error(&e);
            }
        };

        if !output.success {
            let error = ExecutionError::NonZeroExit {
                exit_code: output.exit_code,
                diagnostics: output.stderr.trim().to_string(),
            };
            warn!(
                operation = command.operation,
                exit_code = ?output.exit_code,
                output = %destination.display(),
                "Engine exited with failure"
            );
            return ProcessResult::from_execution_error(&error);
        }

        match OutputVerifier::check_output(&command.output).await {
            Ok(size) => {
                info!(
                    operation = command.operation,
                    output = %command.output.display(),
                    size,
                    "Output written"
                );
                ProcessResult::succeeded(vec![command.output])
            }
            Err(e) => {
                warn!(
                    operation = command.operation,
                    error = %e,
                    "Engine produced no usable output"
                );
                ProcessResult::from_execution_error(&e)
            }
        }
    }

    /// Without overwrite, an existing destination gets a fresh `_NNN` name
    async fn resolve_destination(&self, operation: Operation) -> Operation {
        if self.overwrite {
            return operation;
        }
        let candidate = operation.destination().clone();
        let unique = PathUtils::unique_path(&candidate).await;
        if unique != candidate {
            debug!(
                requested = %candidate.display(),
                chosen = %unique.display(),
                "Destination exists, using a unique name"
            );
        }
        operation.with_destination(unique)
    }
}

/// Arguments shared by every invocation
pub(crate) fn base_args(overwrite: bool) -> Vec<String> {
    vec![
        "-hide_banner".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        if overwrite { "-y" } else { "-n" }.to_string(),
    ]
}

/// Seconds with millisecond precision, as the engine expects them
pub(crate) fn seconds_arg(seconds: f64) -> String {
    format!("{:.3}", seconds)
}
