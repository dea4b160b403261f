use crate::domain::models::{validate_date, Task, TaskDraft, TaskPatch};
use crate::domain::query::{self, ProductivityStats};
use crate::domain::window::{compute_window, TaskWindow};
use crate::infrastructure::error::PlannerError;
use crate::infrastructure::task_store::TaskStore;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub type NowProvider = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Service facade over the task store: validated mutations, date-scoped
/// listings, clock-driven derivations, and a JSON-line operation log.
pub struct Planner {
    store: Arc<dyn TaskStore>,
    logs_dir: PathBuf,
    log_guard: Mutex<()>,
    now_provider: NowProvider,
}

impl Planner {
    pub fn new(store: Arc<dyn TaskStore>, logs_dir: impl AsRef<Path>) -> Self {
        Self {
            store,
            logs_dir: logs_dir.as_ref().to_path_buf(),
            log_guard: Mutex::new(()),
            now_provider: Arc::new(Utc::now),
        }
    }

    pub fn with_now_provider(mut self, now_provider: NowProvider) -> Self {
        self.now_provider = now_provider;
        self
    }

    pub fn now_provider(&self) -> NowProvider {
        Arc::clone(&self.now_provider)
    }

    fn now(&self) -> DateTime<Utc> {
        (self.now_provider)()
    }

    pub fn create_task(&self, draft: TaskDraft) -> Result<Task, PlannerError> {
        let draft = TaskDraft {
            name: draft.name.trim().to_string(),
            start_time: draft.start_time.trim().to_string(),
            end_time: draft.end_time.trim().to_string(),
            color: draft.color.trim().to_string(),
            status: draft.status,
            date: draft.date.trim().to_string(),
        };
        draft.validate().map_err(PlannerError::InvalidInput)?;

        let task = self.store.create(draft)?;
        self.log_info("create_task", &format!("created task_id={}", task.id));
        Ok(task)
    }

    pub fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, PlannerError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(PlannerError::InvalidInput("id must not be empty".to_string()));
        }
        patch.validate().map_err(PlannerError::InvalidInput)?;

        let updated = self.store.update(id, patch)?;
        match &updated {
            Some(task) => self.log_info("update_task", &format!("updated task_id={}", task.id)),
            None => self.log_info("update_task", &format!("no such task_id={id}, skipped")),
        }
        Ok(updated)
    }

    pub fn delete_task(&self, id: &str) -> Result<bool, PlannerError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(PlannerError::InvalidInput("id must not be empty".to_string()));
        }

        let removed = self.store.delete(id)?;
        if removed {
            self.log_info("delete_task", &format!("deleted task_id={id}"));
        } else {
            self.log_info("delete_task", &format!("no such task_id={id}, skipped"));
        }
        Ok(removed)
    }

    pub fn list_tasks(&self, date: Option<&str>) -> Result<Vec<Task>, PlannerError> {
        let tasks = self.store.list()?;
        match date {
            Some(date) => {
                let date = date.trim();
                validate_date(date, "date").map_err(PlannerError::InvalidInput)?;
                Ok(query::tasks_for_date(&tasks, date))
            }
            None => {
                let mut all = tasks;
                all.sort_by(|left, right| {
                    left.date
                        .cmp(&right.date)
                        .then_with(|| left.start_time.cmp(&right.start_time))
                });
                Ok(all)
            }
        }
    }

    pub fn current_task(&self, date: &str) -> Result<Option<Task>, PlannerError> {
        let scoped = self.list_tasks(Some(date))?;
        Ok(query::current_task(&scoped, self.now()).cloned())
    }

    pub fn next_task(&self, date: &str) -> Result<Option<Task>, PlannerError> {
        let scoped = self.list_tasks(Some(date))?;
        Ok(query::next_task(&scoped, self.now()).cloned())
    }

    /// Live progress window for one task. `Ok(None)` when the id is unknown;
    /// a malformed clock time surfaces as `PlannerError::MalformedTime` and
    /// the task stays non-computable until corrected.
    pub fn task_window(&self, id: &str) -> Result<Option<TaskWindow>, PlannerError> {
        let tasks = self.store.list()?;
        let Some(task) = tasks.iter().find(|task| task.id == id) else {
            return Ok(None);
        };
        Ok(Some(compute_window(task, self.now())?))
    }

    pub fn productivity_stats(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> Result<ProductivityStats, PlannerError> {
        let start_date = start_date.trim();
        let end_date = end_date.trim();
        validate_date(start_date, "startDate").map_err(PlannerError::InvalidInput)?;
        validate_date(end_date, "endDate").map_err(PlannerError::InvalidInput)?;

        let tasks = self.store.list()?;
        Ok(query::productivity_stats(&tasks, start_date, end_date))
    }

    pub fn log_info(&self, operation: &str, message: &str) {
        self.append_log("info", operation, message);
    }

    pub fn log_error(&self, operation: &str, message: &str) {
        self.append_log("error", operation, message);
    }

    fn append_log(&self, level: &str, operation: &str, message: &str) {
        let Ok(_guard) = self.log_guard.lock() else {
            return;
        };
        let path = self.logs_dir.join("planner.log");
        let payload = serde_json::json!({
            "timestamp": self.now().to_rfc3339(),
            "level": level,
            "operation": operation,
            "message": message,
        });

        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let _ = writeln!(file, "{payload}");
        }
    }
}
