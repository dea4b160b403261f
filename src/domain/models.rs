use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    HalfCompleted,
    Completed,
    NotCompleted,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::HalfCompleted => "half-completed",
            Self::Completed => "completed",
            Self::NotCompleted => "not-completed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    pub status: TaskStatus,
    pub date: String,
    pub created_at: DateTime<Utc>,
}

impl Task {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.id, "task.id")?;
        validate_non_empty(&self.name, "task.name")?;
        validate_hhmm(&self.start_time, "task.startTime")?;
        validate_hhmm(&self.end_time, "task.endTime")?;
        validate_date(&self.date, "task.date")?;
        Ok(())
    }

    pub fn has_valid_times(&self) -> bool {
        parse_hhmm(&self.start_time).is_some() && parse_hhmm(&self.end_time).is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub color: String,
    #[serde(default = "default_draft_status")]
    pub status: TaskStatus,
    pub date: String,
}

fn default_draft_status() -> TaskStatus {
    TaskStatus::NotStarted
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), String> {
        validate_non_empty(&self.name, "task.name")?;
        validate_hhmm(&self.start_time, "task.startTime")?;
        validate_hhmm(&self.end_time, "task.endTime")?;
        validate_date(&self.date, "task.date")?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl TaskPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = self.name.as_deref() {
            validate_non_empty(name, "task.name")?;
        }
        if let Some(start_time) = self.start_time.as_deref() {
            validate_hhmm(start_time, "task.startTime")?;
        }
        if let Some(end_time) = self.end_time.as_deref() {
            validate_hhmm(end_time, "task.endTime")?;
        }
        if let Some(date) = self.date.as_deref() {
            validate_date(date, "task.date")?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
            && self.color.is_none()
            && self.status.is_none()
            && self.date.is_none()
    }

    pub fn apply_to(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(start_time) = &self.start_time {
            task.start_time = start_time.clone();
        }
        if let Some(end_time) = &self.end_time {
            task.end_time = end_time.clone();
        }
        if let Some(color) = &self.color {
            task.color = color.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(date) = &self.date {
            task.date = date.clone();
        }
    }
}

pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field_name} must not be empty"));
    }
    Ok(())
}

pub fn validate_hhmm(value: &str, field_name: &str) -> Result<(), String> {
    let mut split = value.split(':');
    let Some(hour_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    let Some(minute_str) = split.next() else {
        return Err(format!("{field_name} must be HH:MM"));
    };
    if split.next().is_some() {
        return Err(format!("{field_name} must be HH:MM"));
    }
    if hour_str.len() != 2 || minute_str.len() != 2 {
        return Err(format!("{field_name} must be zero-padded HH:MM"));
    }

    let hour = hour_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    let minute = minute_str
        .parse::<u8>()
        .map_err(|_| format!("{field_name} must be HH:MM"))?;
    if hour > 23 || minute > 59 {
        return Err(format!("{field_name} must be HH:MM"));
    }
    Ok(())
}

pub fn validate_date(value: &str, field_name: &str) -> Result<(), String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("{field_name} must be YYYY-MM-DD"))?;
    Ok(())
}

pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    if validate_hhmm(value, "time").is_err() {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

pub fn parse_task_status(value: &str) -> Option<TaskStatus> {
    match value.trim().to_ascii_lowercase().as_str() {
        "not-started" => Some(TaskStatus::NotStarted),
        "in-progress" => Some(TaskStatus::InProgress),
        "half-completed" => Some(TaskStatus::HalfCompleted),
        "completed" => Some(TaskStatus::Completed),
        "not-completed" => Some(TaskStatus::NotCompleted),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_time(value: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(value)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn sample_task() -> Task {
        Task {
            id: "task-1".to_string(),
            name: "Morning review".to_string(),
            start_time: "09:00".to_string(),
            end_time: "09:30".to_string(),
            color: "#3b82f6".to_string(),
            status: TaskStatus::NotStarted,
            date: "2026-08-07".to_string(),
            created_at: fixed_time("2026-08-07T08:00:00Z"),
        }
    }

    #[test]
    fn task_validate_accepts_valid_task() {
        assert!(sample_task().validate().is_ok());
    }

    #[test]
    fn task_validate_rejects_blank_name() {
        let mut task = sample_task();
        task.name = "   ".to_string();
        assert!(task.validate().is_err());
    }

    #[test]
    fn validate_hhmm_rejects_out_of_range_and_unpadded_values() {
        assert!(validate_hhmm("09:00", "t").is_ok());
        assert!(validate_hhmm("23:59", "t").is_ok());
        assert!(validate_hhmm("24:00", "t").is_err());
        assert!(validate_hhmm("12:60", "t").is_err());
        assert!(validate_hhmm("9:00", "t").is_err());
        assert!(validate_hhmm("09:0", "t").is_err());
        assert!(validate_hhmm("09:00:00", "t").is_err());
        assert!(validate_hhmm("morning", "t").is_err());
    }

    #[test]
    fn validate_date_rejects_malformed_dates() {
        assert!(validate_date("2026-08-07", "d").is_ok());
        assert!(validate_date("2026-13-01", "d").is_err());
        assert!(validate_date("not-a-date", "d").is_err());
    }

    #[test]
    fn parse_hhmm_requires_zero_padded_input() {
        assert_eq!(parse_hhmm("09:05"), NaiveTime::from_hms_opt(9, 5, 0));
        assert_eq!(parse_hhmm("9:05"), None);
        assert_eq!(parse_hhmm("25:00"), None);
    }

    #[test]
    fn parse_task_status_accepts_kebab_case_strings() {
        assert_eq!(parse_task_status("not-started"), Some(TaskStatus::NotStarted));
        assert_eq!(parse_task_status("In-Progress"), Some(TaskStatus::InProgress));
        assert_eq!(
            parse_task_status("half-completed"),
            Some(TaskStatus::HalfCompleted)
        );
        assert_eq!(parse_task_status("completed"), Some(TaskStatus::Completed));
        assert_eq!(
            parse_task_status("not-completed"),
            Some(TaskStatus::NotCompleted)
        );
        assert_eq!(parse_task_status("done"), None);
    }

    #[test]
    fn task_serializes_with_record_field_names() {
        let task = sample_task();
        let value = serde_json::to_value(&task).expect("serialize task");
        assert_eq!(value["startTime"], "09:00");
        assert_eq!(value["endTime"], "09:30");
        assert_eq!(value["status"], "not-started");
        assert!(value["createdAt"].is_string());
    }

    #[test]
    fn task_supports_serde_roundtrip() {
        let task = sample_task();
        let roundtrip: Task =
            serde_json::from_str(&serde_json::to_string(&task).expect("serialize task"))
                .expect("deserialize task");
        assert_eq!(roundtrip, task);
    }

    #[test]
    fn patch_apply_overwrites_only_provided_fields() {
        let mut task = sample_task();
        let patch = TaskPatch {
            status: Some(TaskStatus::InProgress),
            color: Some("#ef4444".to_string()),
            ..TaskPatch::default()
        };
        patch.apply_to(&mut task);

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.color, "#ef4444");
        assert_eq!(task.name, "Morning review");
        assert_eq!(task.start_time, "09:00");
    }

    #[test]
    fn patch_validate_rejects_malformed_provided_fields() {
        let patch = TaskPatch {
            start_time: Some("26:00".to_string()),
            ..TaskPatch::default()
        };
        assert!(patch.validate().is_err());
        assert!(TaskPatch::default().validate().is_ok());
        assert!(TaskPatch::default().is_empty());
    }

    #[test]
    fn draft_deserializes_with_default_status() {
        let draft: TaskDraft = serde_json::from_str(
            r##"{"name":"Gym","startTime":"18:00","endTime":"19:00","color":"#222","date":"2026-08-07"}"##,
        )
        .expect("deserialize draft");
        assert_eq!(draft.status, TaskStatus::NotStarted);
        assert!(draft.validate().is_ok());
    }
}
