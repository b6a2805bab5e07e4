//! Human-readable batch summaries

use std::fmt::Write;

use crate::domain::model::{BatchResult, RunState};
use crate::utils::Utils;

/// Render one line per task slot plus a totals line
pub fn render_summary(result: &BatchResult) -> String {
    let mut out = String::new();

    for (index, slot) in result.per_task.iter().enumerate() {
        let status = if slot.success { "ok" } else { "FAILED" };
        let _ = writeln!(out, "[{}] task {}", status, index + 1);
        for file in &slot.output_files {
            let _ = writeln!(out, "    -> {}", file.display());
        }
        if let Some(error) = &slot.error_message {
            let _ = writeln!(out, "    error: {}", error);
        }
        for warning in &slot.warnings {
            let _ = writeln!(out, "    warning: {}", warning);
        }
    }

    let elapsed = (result.finished_at - result.started_at)
        .to_std()
        .unwrap_or_default();
    let state = match result.state {
        RunState::Aborted => " (aborted)",
        _ => "",
    };
    let _ = write!(
        out,
        "{} of {} tasks succeeded in {}{}",
        result.per_task.len() - result.failed_count(),
        result.per_task.len(),
        Utils::format_duration(elapsed),
        state
    );
    out
}
