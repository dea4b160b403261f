use crate::domain::models::{parse_hhmm, Task, TaskStatus};
use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed clock time '{value}': must be HH:MM")]
pub struct MalformedTimeError {
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskWindow {
    pub elapsed_seconds: i64,
    pub remaining_seconds: i64,
    pub percentage: f64,
    pub active: bool,
}

impl TaskWindow {
    pub fn inactive() -> Self {
        Self {
            elapsed_seconds: 0,
            remaining_seconds: 0,
            percentage: 0.0,
            active: false,
        }
    }
}

/// Progress of an in-progress task against the wall clock. Tasks in any
/// other status yield the inactive zero window. An end time numerically
/// earlier than the start time means the task runs past midnight; the end
/// boundary is advanced by one day for duration arithmetic only.
pub fn compute_window(task: &Task, now: DateTime<Utc>) -> Result<TaskWindow, MalformedTimeError> {
    if task.status != TaskStatus::InProgress {
        return Ok(TaskWindow::inactive());
    }

    let start = parse_hhmm(&task.start_time).ok_or_else(|| MalformedTimeError {
        value: task.start_time.clone(),
    })?;
    let end = parse_hhmm(&task.end_time).ok_or_else(|| MalformedTimeError {
        value: task.end_time.clone(),
    })?;

    let anchor = now.date_naive();
    let start_at = Utc.from_utc_datetime(&anchor.and_time(start));
    let mut end_at = Utc.from_utc_datetime(&anchor.and_time(end));
    if end_at < start_at {
        end_at += Duration::days(1);
    }

    let elapsed_seconds = (now - start_at).num_seconds().max(0);
    let total_seconds = (end_at - start_at).num_seconds();
    let remaining_seconds = (total_seconds - elapsed_seconds).max(0);
    let percentage = if total_seconds > 0 {
        (elapsed_seconds as f64 / total_seconds as f64 * 100.0).min(100.0)
    } else {
        0.0
    };

    Ok(TaskWindow {
        elapsed_seconds,
        remaining_seconds,
        percentage,
        active: true,
    })
}

pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}
