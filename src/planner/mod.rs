//! Split and clip planning
//!
//! Planners are pure: they take a [`MediaInfo`] snapshot and a request and
//! return a plan without touching the engine or the filesystem.

use serde::{Deserialize, Serialize};

pub mod clip;
pub mod split;

pub use clip::plan_clips;
pub use split::{plan_split, plan_split_with};

#[cfg(doc)]
use crate::domain::model::MediaInfo;

/// Tuning for split planning
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    /// Multiplier applied to the estimated segment duration, in (0, 1]
    pub safety_factor: f64,
    /// Lower bound on the segment duration after scaling
    pub min_segment_seconds: f64,
    /// Re-split passes over segments that still exceed the target
    pub max_rounds: u32,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            safety_factor: 1.0,
            min_segment_seconds: 0.5,
            max_rounds: 4,
        }
    }
}
