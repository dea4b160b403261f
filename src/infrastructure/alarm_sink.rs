use crate::domain::models::Task;
use crate::infrastructure::error::PlannerError;
use async_trait::async_trait;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub struct AlarmSignal {
    pub task: Task,
}

/// Delivery seam for alarm cues. The engine decides when to signal; whatever
/// plays a sound or raises a notification lives behind this trait. Delivery
/// is fire-and-forget: the caller neither retries nor learns whether the cue
/// reached the user.
#[async_trait]
pub trait AlarmSink: Send + Sync {
    async fn deliver(&self, signal: AlarmSignal) -> Result<(), PlannerError>;
}

/// Forwards signals into an mpsc channel; the embedding layer (or a test)
/// consumes them on the other end.
pub struct ChannelAlarmSink {
    sender: mpsc::Sender<AlarmSignal>,
}

impl ChannelAlarmSink {
    pub fn new(sender: mpsc::Sender<AlarmSignal>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl AlarmSink for ChannelAlarmSink {
    async fn deliver(&self, signal: AlarmSignal) -> Result<(), PlannerError> {
        self.sender
            .send(signal)
            .await
            .map_err(|_| PlannerError::InvalidInput("alarm channel closed".to_string()))
    }
}

/// Appends one JSON line per signal to a log file.
pub struct LogAlarmSink {
    path: PathBuf,
    guard: Mutex<()>,
}

impl LogAlarmSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }
}

#[async_trait]
impl AlarmSink for LogAlarmSink {
    async fn deliver(&self, signal: AlarmSignal) -> Result<(), PlannerError> {
        let _guard = self
            .guard
            .lock()
            .map_err(|error| PlannerError::InvalidInput(format!("alarm log lock poisoned: {error}")))?;
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "taskId": signal.task.id,
            "name": signal.task.name,
            "startTime": signal.task.start_time,
            "endTime": signal.task.end_time,
        });

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{payload}")?;
        Ok(())
    }
}
