//! Clip interval validation and normalization

use tracing::warn;

use crate::domain::errors::PlanError;
use crate::domain::model::{ClipInterval, MediaInfo};

/// Validate requested `(start, end)` pairs against the source, in input order.
///
/// Ends past the source duration are clamped instead of rejected. Overlapping
/// or duplicate requests are kept as-is so each one yields exactly one clip.
pub fn plan_clips(
    info: &MediaInfo,
    requested: &[(f64, f64)],
) -> Result<Vec<ClipInterval>, PlanError> {
    let duration = info.duration_seconds;

    requested
        .iter()
        .enumerate()
        .map(|(i, &(start, end))| {
            let position = i + 1;

            // NaN fails this comparison too
            if !(end > start) {
                return Err(PlanError::NonPositiveDuration {
                    position,
                    start,
                    end,
                });
            }
            if start < 0.0 {
                return Err(PlanError::NegativeStart { position, start });
            }

            let clamped_end = if end > duration {
                warn!(position, end, duration, "Clamping clip end to source duration");
                duration
            } else {
                end
            };

            if clamped_end <= start {
                return Err(PlanError::OutOfRange {
                    position,
                    start,
                    duration,
                });
            }

            Ok(ClipInterval {
                start_seconds: start,
                end_seconds: clamped_end,
            })
        })
        .collect()
}
