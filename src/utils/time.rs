//! Time parsing and formatting utilities

use crate::error::{VidtaskError, VidtaskResult};

/// Parser for timecodes in task documents and on the command line
pub struct TimeParser;

impl TimeParser {
    /// Parse `HH:MM:SS`, `MM:SS` or plain seconds (fractions allowed) to seconds
    pub fn parse_time(time_str: &str) -> VidtaskResult<f64> {
        let time_str = time_str.trim();
        let invalid = || VidtaskError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        if time_str.is_empty() {
            return Err(invalid());
        }

        let parts: Vec<&str> = time_str.split(':').collect();
        if parts.len() > 3 {
            return Err(invalid());
        }

        let mut values = Vec::with_capacity(parts.len());
        for part in &parts {
            let value: f64 = part.trim().parse().map_err(|_| invalid())?;
            if !value.is_finite() {
                return Err(invalid());
            }
            values.push(value);
        }

        // Only a bare number may be negative; the interval validator rejects it later
        if values.len() > 1 && values.iter().any(|v| *v < 0.0) {
            return Err(invalid());
        }

        let seconds = match values.as_slice() {
            [s] => *s,
            [m, s] => m * 60.0 + s,
            [h, m, s] => h * 3600.0 + m * 60.0 + s,
            _ => return Err(invalid()),
        };
        Ok(seconds)
    }

    /// Parse a `START-END` interval, each side a timecode
    pub fn parse_interval(interval: &str) -> VidtaskResult<(f64, f64)> {
        let invalid = || VidtaskError::InvalidInterval {
            interval: interval.to_string(),
        };
        // Split on the first '-' after position 0 so a negative start still parses
        let split_at = interval
            .char_indices()
            .skip(1)
            .find(|(_, c)| *c == '-')
            .map(|(i, _)| i)
            .ok_or_else(invalid)?;

        let start = Self::parse_time(&interval[..split_at])?;
        let end = Self::parse_time(&interval[split_at + 1..])?;
        Ok((start, end))
    }

    /// Format seconds as HH:MM:SS.mmm, dropping the hours when zero
    pub fn format_time(seconds: f64) -> String {
        let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let secs = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!(
                "{:02}:{:02}:{:02}.{:03}",
                hours, minutes, secs, milliseconds
            )
        } else {
            format!("{:02}:{:02}.{:03}", minutes, secs, milliseconds)
        }
    }
}
