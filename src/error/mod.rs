//! Error handling module for vidtask

use thiserror::Error;

use crate::domain::errors::{ConfigError, ExecutionError, OrchestratorError, PlanError, ProbeError};

/// Main error type for vidtask operations
#[derive(Error, Debug)]
pub enum VidtaskError {
    /// Invalid time format
    #[error("Invalid time format: {time}. Expected HH:MM:SS, MM:SS or seconds")]
    InvalidTimeFormat { time: String },

    /// Invalid size string
    #[error("Invalid size: {size}. Expected a number with an optional B/K/KB/M/MB/G/GB suffix")]
    InvalidSize { size: String },

    /// Invalid clip interval string
    #[error("Invalid interval: {interval}. Expected START-END")]
    InvalidInterval { interval: String },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for vidtask operations
pub type VidtaskResult<T> = std::result::Result<T, VidtaskError>;
