use crate::domain::models::{Task, TaskStatus};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Comparison key for start-time matching: `now` truncated to a zero-padded
/// `HH:MM` string. Lexicographic order on these strings is chronological.
pub fn clock_minute(now: DateTime<Utc>) -> String {
    now.format("%H:%M").to_string()
}

pub fn tasks_for_date(tasks: &[Task], date: &str) -> Vec<Task> {
    let mut scoped = tasks
        .iter()
        .filter(|task| task.date == date)
        .cloned()
        .collect::<Vec<_>>();
    scoped.sort_by(|left, right| left.start_time.cmp(&right.start_time));
    scoped
}

pub fn tasks_in_range(tasks: &[Task], start_date: &str, end_date: &str) -> Vec<Task> {
    let mut scoped = tasks
        .iter()
        .filter(|task| task.date.as_str() >= start_date && task.date.as_str() <= end_date)
        .cloned()
        .collect::<Vec<_>>();
    scoped.sort_by(|left, right| {
        left.date
            .cmp(&right.date)
            .then_with(|| left.start_time.cmp(&right.start_time))
    });
    scoped
}

/// The task to display "now": the first in-progress task in list order, or,
/// when nothing is running, the earliest not-started task still ahead of the
/// clock. Tasks with malformed clock times are not considered.
pub fn current_task<'a>(tasks: &'a [Task], now: DateTime<Utc>) -> Option<&'a Task> {
    if let Some(in_progress) = tasks
        .iter()
        .filter(|task| task.has_valid_times())
        .find(|task| task.status == TaskStatus::InProgress)
    {
        return Some(in_progress);
    }
    next_task(tasks, now)
}

pub fn next_task<'a>(tasks: &'a [Task], now: DateTime<Utc>) -> Option<&'a Task> {
    let minute = clock_minute(now);
    tasks
        .iter()
        .filter(|task| task.has_valid_times())
        .filter(|task| task.status == TaskStatus::NotStarted && task.start_time > minute)
        .min_by(|left, right| left.start_time.cmp(&right.start_time))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductivityStats {
    pub total: u32,
    pub completed: u32,
    pub half_completed: u32,
    pub not_started: u32,
    pub not_completed: u32,
    pub completion_rate: u32,
}

/// Aggregate outcomes over `[start_date, end_date]` inclusive.
/// `not_completed` is derived by subtraction, so a task still in progress
/// when the statistics are computed counts as not completed.
pub fn productivity_stats(tasks: &[Task], start_date: &str, end_date: &str) -> ProductivityStats {
    let scoped = tasks_in_range(tasks, start_date, end_date);

    let total = scoped.len() as u32;
    let completed = count_status(&scoped, TaskStatus::Completed);
    let half_completed = count_status(&scoped, TaskStatus::HalfCompleted);
    let not_started = count_status(&scoped, TaskStatus::NotStarted);
    let not_completed = total - completed - half_completed - not_started;

    let completion_rate = if total > 0 {
        (f64::from(completed) / f64::from(total) * 100.0).round() as u32
    } else {
        0
    };

    ProductivityStats {
        total,
        completed,
        half_completed,
        not_started,
        not_completed,
        completion_rate,
    }
}

fn count_status(tasks: &[Task], status: TaskStatus) -> u32 {
    tasks.iter().filter(|task| task.status == status).count() as u32
}
