use crate::domain::models::{Task, TaskStatus};
use crate::domain::query::clock_minute;
use crate::infrastructure::alarm_sink::AlarmSignal;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

const DEDUP_WINDOW_SECONDS: i64 = 60;

/// Detects start-time arrival and emits at most one signal per task per
/// arrival. Dedup state is an `id -> fired_at` map swept lazily on every
/// `evaluate` call; an entry expires 60 seconds after it was added.
#[derive(Debug, Default)]
pub struct AlarmEngine {
    triggered: HashMap<String, DateTime<Utc>>,
}

impl AlarmEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// One evaluation pass over the snapshot. A task alarms when it is still
    /// not started and its start time equals `now` truncated to the minute;
    /// matching is by `HH:MM` string, never by second. Malformed tasks are
    /// skipped. Never fails.
    pub fn evaluate(&mut self, tasks: &[Task], now: DateTime<Utc>) -> Vec<AlarmSignal> {
        self.sweep_expired(now);

        let minute = clock_minute(now);
        let mut signals = Vec::new();
        for task in tasks {
            if task.status != TaskStatus::NotStarted {
                continue;
            }
            if !task.has_valid_times() {
                continue;
            }
            if task.start_time != minute {
                continue;
            }
            if self.triggered.contains_key(&task.id) {
                continue;
            }

            self.triggered.insert(task.id.clone(), now);
            signals.push(AlarmSignal { task: task.clone() });
        }
        signals
    }

    fn sweep_expired(&mut self, now: DateTime<Utc>) {
        let window = Duration::seconds(DEDUP_WINDOW_SECONDS);
        self.triggered.retain(|_, fired_at| now - *fired_at < window);
    }

    pub fn is_armed(&self, task_id: &str) -> bool {
        self.triggered.contains_key(task_id)
    }

    pub fn armed_len(&self) -> usize {
        self.triggered.len()
    }
}
