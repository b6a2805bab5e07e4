// Domain rules - Batch outcome policy and output naming

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// What a run does after a task fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomePolicy {
    /// Record the failure and keep going
    #[default]
    BestEffort,
    /// Record the failure, then mark every task not yet started as skipped
    FailFast,
}

impl OutcomePolicy {
    pub fn from_fail_fast(fail_fast: bool) -> Self {
        if fail_fast {
            OutcomePolicy::FailFast
        } else {
            OutcomePolicy::BestEffort
        }
    }

    /// Whether a failure in the current run stops tasks not yet started
    pub fn stops_on_failure(&self) -> bool {
        matches!(self, OutcomePolicy::FailFast)
    }
}

/// Deterministic output names for planned work
pub struct OutputNaming;

impl OutputNaming {
    /// `<base>.<ext>` for a single segment, `<base>_NNN.<ext>` (zero-based) otherwise
    pub fn segment_path(base: &Path, extension: &str, index: usize, total: usize) -> PathBuf {
        if total <= 1 {
            Self::with_extension(base, "", extension)
        } else {
            Self::with_extension(base, &format!("_{:03}", index), extension)
        }
    }

    /// `<base>_NNN.<ext>`, numbered from one
    pub fn clip_path(base: &Path, extension: &str, index: usize) -> PathBuf {
        Self::with_extension(base, &format!("_{:03}", index + 1), extension)
    }

    fn with_extension(base: &Path, suffix: &str, extension: &str) -> PathBuf {
        let extension = extension.trim().trim_start_matches('.');
        let mut name = base.as_os_str().to_os_string();
        name.push(suffix);
        if !extension.is_empty() {
            name.push(".");
            name.push(extension);
        }
        PathBuf::from(name)
    }
}
