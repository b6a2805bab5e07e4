// Domain errors - Error types for the domain layer

use std::time::Duration;

use thiserror::Error;

/// Failures while asking the engine about a source file
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProbeError {
    /// Path does not resolve to a readable file
    #[error("Source not found or unreadable: {0}")]
    NotFound(String),
    /// Engine ran but could not make sense of the container
    #[error("Unreadable media: {0}")]
    UnreadableMedia(String),
    /// Engine process could not be spawned
    #[error("Engine unavailable: {0}")]
    EngineUnavailable(String),
}

/// Failures while turning a request into a plan.
///
/// Interval positions are one-based, matching how users number their requests.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanError {
    /// Estimated segment duration is not positive
    #[error("Invalid split target: {0}")]
    InvalidTarget(String),
    /// Interval end is not after its start
    #[error("Interval {position}: end ({end}s) must be greater than start ({start}s)")]
    NonPositiveDuration { position: usize, start: f64, end: f64 },
    /// Interval starts before zero
    #[error("Interval {position}: start ({start}s) cannot be negative")]
    NegativeStart { position: usize, start: f64 },
    /// Interval collapses once clamped to the source duration
    #[error("Interval {position}: start ({start}s) is at or past the end of the source ({duration}s)")]
    OutOfRange {
        position: usize,
        start: f64,
        duration: f64,
    },
}

/// Failures of a single engine invocation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExecutionError {
    #[error("Failed to spawn {program}: {message}")]
    SpawnFailed { program: String, message: String },
    #[error("Engine exited with {}", describe_exit(.exit_code))]
    NonZeroExit {
        exit_code: Option<i32>,
        diagnostics: String,
    },
    #[error("Expected output is missing or empty: {path}")]
    MissingOutput { path: String },
    #[error("Engine did not finish within {0:?}")]
    TimedOut(Duration),
}

/// Errors detected while mapping a task document into typed tasks
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Task {task}: {message}")]
    InvalidTask { task: String, message: String },
    #[error("Batch group {group}: mixes {expected} and {found} tasks")]
    MixedGroup {
        group: usize,
        expected: String,
        found: String,
    },
    #[error("Unsupported task document format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to parse task document: {0}")]
    Parse(String),
    #[error("Invalid setting {key}: {message}")]
    InvalidSetting { key: String, message: String },
}

/// Errors fatal to a whole orchestrator run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OrchestratorError {
    #[error("Worker pool size must be at least 1, got {0}")]
    InvalidPoolSize(usize),
    #[error("Worker pool unavailable: {0}")]
    PoolUnavailable(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl ExecutionError {
    /// Diagnostic text captured from the engine, if any
    pub fn diagnostics(&self) -> Option<&str> {
        match self {
            ExecutionError::NonZeroExit { diagnostics, .. } if !diagnostics.is_empty() => {
                Some(diagnostics.as_str())
            }
            _ => None,
        }
    }
}
