//! Application settings
//!
//! [`Settings`] is the fully resolved configuration. Each source (file,
//! environment, command line) contributes a [`SettingsLayer`] whose set
//! fields override what came before.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::errors::ConfigError;
use crate::domain::rules::OutcomePolicy;
use crate::planner::SplitOptions;
use crate::utils::logging::{LogFormat, LogLevel};

/// Resolved application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// ffmpeg binary; located on `PATH` when unset
    pub ffmpeg_path: Option<PathBuf>,
    /// ffprobe binary; located on `PATH` when unset
    pub ffprobe_path: Option<PathBuf>,
    /// Worker pool size for parallel batch groups
    pub workers: usize,
    pub fail_fast: bool,
    pub overwrite: bool,
    /// Per engine process limit, in seconds
    pub process_timeout_secs: Option<u64>,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
    pub split: SplitOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            workers: num_cpus::get().max(1),
            fail_fast: false,
            overwrite: true,
            process_timeout_secs: None,
            log_level: LogLevel::default(),
            log_format: LogFormat::default(),
            split: SplitOptions::default(),
        }
    }
}

impl Settings {
    /// Override every field the layer sets
    pub fn apply(&mut self, layer: SettingsLayer) {
        if let Some(path) = layer.ffmpeg_path {
            self.ffmpeg_path = Some(path);
        }
        if let Some(path) = layer.ffprobe_path {
            self.ffprobe_path = Some(path);
        }
        if let Some(workers) = layer.workers {
            self.workers = workers;
        }
        if let Some(fail_fast) = layer.fail_fast {
            self.fail_fast = fail_fast;
        }
        if let Some(overwrite) = layer.overwrite {
            self.overwrite = overwrite;
        }
        if let Some(timeout) = layer.process_timeout_secs {
            self.process_timeout_secs = Some(timeout);
        }
        if let Some(level) = layer.log_level {
            self.log_level = level;
        }
        if let Some(format) = layer.log_format {
            self.log_format = format;
        }
        if let Some(split) = layer.split {
            if let Some(factor) = split.safety_factor {
                self.split.safety_factor = factor;
            }
            if let Some(min) = split.min_segment_seconds {
                self.split.min_segment_seconds = min;
            }
            if let Some(rounds) = split.max_rounds {
                self.split.max_rounds = rounds;
            }
        }
    }

    /// Reject values no run could use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "workers".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let factor = self.split.safety_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::InvalidSetting {
                key: "split.safety_factor".to_string(),
                message: format!("must be in (0, 1], got {}", factor),
            });
        }

        let min = self.split.min_segment_seconds;
        if !min.is_finite() || min < 0.0 {
            return Err(ConfigError::InvalidSetting {
                key: "split.min_segment_seconds".to_string(),
                message: format!("must be a non-negative number, got {}", min),
            });
        }

        if self.process_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidSetting {
                key: "process_timeout_secs".to_string(),
                message: "must be at least 1 when set".to_string(),
            });
        }

        Ok(())
    }

    pub fn outcome_policy(&self) -> OutcomePolicy {
        OutcomePolicy::from_fail_fast(self.fail_fast)
    }

    pub fn process_timeout(&self) -> Option<Duration> {
        self.process_timeout_secs.map(Duration::from_secs)
    }
}

/// One source of settings; unset fields leave earlier values alone
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub workers: Option<usize>,
    pub fail_fast: Option<bool>,
    pub overwrite: Option<bool>,
    pub process_timeout_secs: Option<u64>,
    pub log_level: Option<LogLevel>,
    pub log_format: Option<LogFormat>,
    pub split: Option<SplitLayer>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitLayer {
    pub safety_factor: Option<f64>,
    pub min_segment_seconds: Option<f64>,
    pub max_rounds: Option<u32>,
}
