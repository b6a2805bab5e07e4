//! Size-bounded split planning

use tracing::debug;

use crate::domain::errors::PlanError;
use crate::domain::model::{MediaInfo, SegmentEnd, SegmentRange, SplitPlan};
use crate::planner::SplitOptions;

/// Upper bound on the number of segments in one plan
pub const MAX_SEGMENTS: usize = 100_000;

/// Shortest segment the engine can address
pub const MIN_SEGMENT_RESOLUTION: f64 = 0.001;

/// A boundary this close to the end counts as reaching it
const END_TOLERANCE: f64 = 1e-6;

/// Plan contiguous segments whose estimated size stays under `target_size_bytes`.
///
/// The segment duration is estimated from the average bitrate, so actual
/// output sizes are approximate; the number of segments and their time
/// ranges are deterministic for a given input.
pub fn plan_split(info: &MediaInfo, target_size_bytes: i64) -> Result<SplitPlan, PlanError> {
    plan_split_with(info, target_size_bytes, &SplitOptions::default())
}

/// [`plan_split`] with an explicit safety factor and minimum segment length
pub fn plan_split_with(
    info: &MediaInfo,
    target_size_bytes: i64,
    options: &SplitOptions,
) -> Result<SplitPlan, PlanError> {
    if target_size_bytes <= 0 {
        return Err(PlanError::InvalidTarget(format!(
            "target size must be positive, got {} bytes",
            target_size_bytes
        )));
    }

    let estimated = target_size_bytes as f64 * 8.0 / info.average_bitrate_bps;
    if !estimated.is_finite() || estimated <= 0.0 {
        return Err(PlanError::InvalidTarget(format!(
            "cannot estimate segment duration from bitrate {} bps",
            info.average_bitrate_bps
        )));
    }

    let segment_seconds = (estimated * options.safety_factor).max(options.min_segment_seconds);
    if !segment_seconds.is_finite() || segment_seconds <= 0.0 {
        return Err(PlanError::InvalidTarget(format!(
            "safety factor {} leaves no usable segment duration",
            options.safety_factor
        )));
    }
    // Engine arguments carry millisecond precision
    if segment_seconds < MIN_SEGMENT_RESOLUTION {
        return Err(PlanError::InvalidTarget(format!(
            "segment duration {}s is below the {}s engine resolution",
            segment_seconds, MIN_SEGMENT_RESOLUTION
        )));
    }

    let duration = info.duration_seconds.max(0.0);
    if duration / segment_seconds > MAX_SEGMENTS as f64 {
        return Err(PlanError::InvalidTarget(format!(
            "{}s segments would split {}s into more than {} parts",
            segment_seconds, duration, MAX_SEGMENTS
        )));
    }
    let count = segment_count(duration, segment_seconds);

    // Starts are computed from the index rather than accumulated so that
    // rounding error cannot add or drop a segment.
    let segments = (0..count)
        .map(|index| {
            let start_seconds = index as f64 * segment_seconds;
            let end = if index + 1 == count {
                SegmentEnd::ToEnd
            } else {
                SegmentEnd::At((index + 1) as f64 * segment_seconds)
            };
            SegmentRange {
                index,
                start_seconds,
                end,
            }
        })
        .collect::<Vec<_>>();

    debug!(
        duration,
        segment_seconds,
        segments = segments.len(),
        "Planned split"
    );

    Ok(SplitPlan::new(duration, segment_seconds, segments))
}

/// Smallest `n >= 1` with `n * segment_seconds` reaching `duration`.
///
/// `ceil` alone can overshoot by one when the quotient rounds up, which would
/// leave a trailing segment starting at the very end of the source.
fn segment_count(duration: f64, segment_seconds: f64) -> usize {
    let mut count = ((duration / segment_seconds).ceil() as usize).max(1);
    let end = duration - END_TOLERANCE;
    while count > 1 && (count - 1) as f64 * segment_seconds >= end {
        count -= 1;
    }
    while (count as f64) * segment_seconds < end {
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitrate that makes `target` bytes last exactly `seconds`
    fn info_with_segment_seconds(duration: f64, target: i64, seconds: f64) -> MediaInfo {
        let bps = target as f64 * 8.0 / seconds;
        MediaInfo::new(duration, (bps * duration / 8.0) as u64, Some(bps))
    }

    #[test]
    fn test_split_scenario_four_segments_last_shorter() {
        let info = info_with_segment_seconds(100.0, 30_000, 30.0);
        let plan = plan_split(&info, 30_000).unwrap();

        assert_eq!(
            plan.bounds(),
            vec![(0.0, 30.0), (30.0, 60.0), (60.0, 90.0), (90.0, 100.0)]
        );
        assert_eq!(plan.segments()[3].end, SegmentEnd::ToEnd);
    }

    #[test]
    fn test_split_zero_target_is_invalid() {
        let info = MediaInfo::new(100.0, 1_000_000, None);
        assert!(matches!(
            plan_split(&info, 0),
            Err(PlanError::InvalidTarget(_))
        ));
        assert!(matches!(
            plan_split(&info, -5),
            Err(PlanError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_split_zero_bitrate_is_invalid() {
        let info = MediaInfo::new(0.0, 0, None);
        assert!(matches!(
            plan_split(&info, 1024),
            Err(PlanError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_split_estimate_longer_than_source_gives_single_segment() {
        let info = info_with_segment_seconds(20.0, 1_000_000, 500.0);
        let plan = plan_split(&info, 1_000_000).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.bounds(), vec![(0.0, 20.0)]);
    }

    #[test]
    fn test_split_exact_multiple_has_no_empty_tail() {
        let info = info_with_segment_seconds(90.0, 30_000, 30.0);
        let plan = plan_split(&info, 30_000).unwrap();
        assert_eq!(plan.len(), 3);
        assert_eq!(plan.bounds().last(), Some(&(60.0, 90.0)));
    }

    /// Reference count: step a cursor by `seconds` until it reaches the end
    fn cursor_count(duration: f64, seconds: f64) -> usize {
        let mut count = 1;
        let mut cursor = seconds;
        while cursor < duration - END_TOLERANCE {
            cursor += seconds;
            count += 1;
        }
        count
    }

    fn assert_well_formed(plan: &SplitPlan, duration: f64) {
        let bounds = plan.bounds();
        assert_eq!(bounds[0].0, 0.0);
        assert_eq!(bounds.last().unwrap().1, duration);
        for (start, end) in &bounds {
            assert!(end > start, "empty range ({}, {}) for {}s", start, end, duration);
        }
        for pair in bounds.windows(2) {
            assert_eq!(pair[0].1, pair[1].0);
            assert!(pair[1].0 > pair[0].0);
        }
        for (i, segment) in plan.segments().iter().enumerate() {
            assert_eq!(segment.index, i);
        }
    }

    #[test]
    fn test_split_quotient_rounding_up_adds_no_empty_tail() {
        let info = info_with_segment_seconds(1180.056, 49_169, 49.169);
        let plan = plan_split(&info, 49_169).unwrap();

        let seconds = plan.estimated_segment_seconds;
        assert_eq!(plan.len(), cursor_count(1180.056, seconds));
        assert_well_formed(&plan, 1180.056);

        let floored = SplitOptions {
            min_segment_seconds: 49.169,
            ..SplitOptions::default()
        };
        let plan = plan_split_with(&info, 49_169, &floored).unwrap();
        assert_well_formed(&plan, 1180.056);
    }

    #[test]
    fn test_split_sweep_matches_cursor_count() {
        let durations = [0.9, 1.0, 12.0, 59.94, 100.0, 1180.056, 3600.0, 5400.333, 7199.999];
        let seconds = [0.5, 0.7, 1.1, 7.0, 12.0, 29.97, 49.169, 61.5, 333.3, 1000.0];

        for &duration in &durations {
            for &segment in &seconds {
                let info = info_with_segment_seconds(duration, 50_000, segment);
                let plan = plan_split(&info, 50_000).unwrap();

                let expected = cursor_count(duration, plan.estimated_segment_seconds);
                assert_eq!(plan.len(), expected, "count for {}s / {}s", duration, segment);
                assert_well_formed(&plan, duration);
            }
        }

        for step in 1..400 {
            let duration = step as f64 * 3.7 + 0.013;
            let segment = 0.5 + (step % 37) as f64 * 1.31;
            let info = info_with_segment_seconds(duration, 50_000, segment);
            let plan = plan_split(&info, 50_000).unwrap();
            assert_eq!(plan.len(), cursor_count(duration, plan.estimated_segment_seconds));
            assert_well_formed(&plan, duration);
        }
    }

    #[test]
    fn test_split_tiny_target_is_floored() {
        // 1 byte of a 50 Mb/s source; the default floor keeps half-second segments
        let info = MediaInfo::new(7200.0, 45_000_000_000, Some(50.0e6));
        let plan = plan_split(&info, 1).unwrap();
        assert_eq!(plan.estimated_segment_seconds, 0.5);
        assert_eq!(plan.len(), 14_400);
    }

    #[test]
    fn test_split_without_floor_rejects_unaddressable_segments() {
        let info = MediaInfo::new(7200.0, 45_000_000_000, Some(50.0e6));
        let unfloored = SplitOptions {
            min_segment_seconds: 0.0,
            ..SplitOptions::default()
        };
        assert!(matches!(
            plan_split_with(&info, 1, &unfloored),
            Err(PlanError::InvalidTarget(_))
        ));
    }

    #[test]
    fn test_split_rejects_plans_beyond_segment_limit() {
        // Ten days in 5 ms segments
        let info = info_with_segment_seconds(864_000.0, 1_000, 0.005);
        let unfloored = SplitOptions {
            min_segment_seconds: 0.0,
            ..SplitOptions::default()
        };
        let err = plan_split_with(&info, 1_000, &unfloored).unwrap_err();
        assert!(err.to_string().contains("more than"));
    }

    #[test]
    fn test_split_is_idempotent() {
        let info = info_with_segment_seconds(250.0, 10_000, 13.0);
        assert_eq!(plan_split(&info, 10_000), plan_split(&info, 10_000));
    }

    #[test]
    fn test_split_safety_factor_shortens_segments() {
        let info = info_with_segment_seconds(100.0, 40_000, 40.0);
        let options = SplitOptions {
            safety_factor: 0.5,
            min_segment_seconds: 0.0,
            ..SplitOptions::default()
        };
        let plan = plan_split_with(&info, 40_000, &options).unwrap();
        assert_eq!(plan.estimated_segment_seconds, 20.0);
        assert_eq!(plan.len(), 5);
    }

    #[test]
    fn test_split_minimum_segment_floor() {
        let info = info_with_segment_seconds(10.0, 1_000, 0.1);
        let options = SplitOptions {
            min_segment_seconds: 2.5,
            ..SplitOptions::default()
        };
        let plan = plan_split_with(&info, 1_000, &options).unwrap();
        assert_eq!(plan.len(), 4);
    }
}
