use crate::domain::models::{parse_task_status, Task, TaskDraft, TaskPatch};
use crate::infrastructure::error::PlannerError;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

fn next_task_id() -> String {
    let sequence = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    format!("task-{}-{sequence}", Utc::now().timestamp_micros())
}

/// Persistence collaborator for task records. Assigns `id` and `created_at`
/// on create; `update`/`delete` report an unknown id as `None`/`false`
/// rather than an error.
pub trait TaskStore: Send + Sync {
    fn list(&self) -> Result<Vec<Task>, PlannerError>;
    fn create(&self, draft: TaskDraft) -> Result<Task, PlannerError>;
    fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, PlannerError>;
    fn delete(&self, id: &str) -> Result<bool, PlannerError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    tasks: HashMap<String, Task>,
    order: Vec<String>,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: Mutex<InMemoryState>,
}

impl InMemoryTaskStore {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, InMemoryState>, PlannerError> {
        self.state
            .lock()
            .map_err(|error| PlannerError::InvalidInput(format!("task store lock poisoned: {error}")))
    }
}

impl TaskStore for InMemoryTaskStore {
    fn list(&self) -> Result<Vec<Task>, PlannerError> {
        let state = self.lock()?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.tasks.get(id).cloned())
            .collect())
    }

    fn create(&self, draft: TaskDraft) -> Result<Task, PlannerError> {
        let task = Task {
            id: next_task_id(),
            name: draft.name,
            start_time: draft.start_time,
            end_time: draft.end_time,
            color: draft.color,
            status: draft.status,
            date: draft.date,
            created_at: Utc::now(),
        };

        let mut state = self.lock()?;
        state.order.push(task.id.clone());
        state.tasks.insert(task.id.clone(), task.clone());
        Ok(task)
    }

    fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, PlannerError> {
        let mut state = self.lock()?;
        let Some(task) = state.tasks.get_mut(id) else {
            return Ok(None);
        };
        patch.apply_to(task);
        Ok(Some(task.clone()))
    }

    fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        let mut state = self.lock()?;
        if state.tasks.remove(id).is_none() {
            return Ok(false);
        }
        state.order.retain(|candidate| candidate != id);
        Ok(true)
    }
}

#[derive(Debug, Clone)]
pub struct SqliteTaskStore {
    db_path: PathBuf,
}

impl SqliteTaskStore {
    pub fn new(db_path: impl AsRef<Path>) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    fn connect(&self) -> Result<Connection, PlannerError> {
        Connection::open(&self.db_path).map_err(PlannerError::from)
    }
}

type TaskRow = (String, String, String, String, String, String, String, String);

fn task_from_row(row: TaskRow) -> Result<Task, PlannerError> {
    let (id, name, start_time, end_time, color, status_raw, date, created_at_raw) = row;
    let status = parse_task_status(&status_raw).ok_or_else(|| {
        PlannerError::InvalidInput(format!("unknown task status '{status_raw}' for task {id}"))
    })?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_raw)
        .map_err(|error| {
            PlannerError::InvalidInput(format!(
                "invalid tasks.created_at '{created_at_raw}': {error}"
            ))
        })?
        .with_timezone(&Utc);

    Ok(Task {
        id,
        name,
        start_time,
        end_time,
        color,
        status,
        date,
        created_at,
    })
}

impl TaskStore for SqliteTaskStore {
    fn list(&self) -> Result<Vec<Task>, PlannerError> {
        let connection = self.connect()?;
        let mut statement = connection.prepare(
            "SELECT id, name, start_time, end_time, color, status, date, created_at
             FROM tasks ORDER BY rowid",
        )?;
        let rows = statement
            .query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?
            .collect::<Result<Vec<TaskRow>, _>>()?;

        rows.into_iter().map(task_from_row).collect()
    }

    fn create(&self, draft: TaskDraft) -> Result<Task, PlannerError> {
        let task = Task {
            id: next_task_id(),
            name: draft.name,
            start_time: draft.start_time,
            end_time: draft.end_time,
            color: draft.color,
            status: draft.status,
            date: draft.date,
            created_at: Utc::now(),
        };

        let connection = self.connect()?;
        connection.execute(
            "INSERT INTO tasks (id, name, start_time, end_time, color, status, date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                task.id,
                task.name,
                task.start_time,
                task.end_time,
                task.color,
                task.status.as_str(),
                task.date,
                task.created_at.to_rfc3339(),
            ],
        )?;
        Ok(task)
    }

    fn update(&self, id: &str, patch: TaskPatch) -> Result<Option<Task>, PlannerError> {
        let existing = {
            let connection = self.connect()?;
            let mut statement = connection.prepare(
                "SELECT id, name, start_time, end_time, color, status, date, created_at
                 FROM tasks WHERE id = ?1",
            )?;
            let mut rows = statement.query_map(params![id], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                ))
            })?;
            match rows.next() {
                Some(row) => Some(task_from_row(row?)?),
                None => None,
            }
        };
        let Some(mut task) = existing else {
            return Ok(None);
        };

        patch.apply_to(&mut task);
        let connection = self.connect()?;
        connection.execute(
            "UPDATE tasks
             SET name = ?2, start_time = ?3, end_time = ?4, color = ?5, status = ?6, date = ?7
             WHERE id = ?1",
            params![
                task.id,
                task.name,
                task.start_time,
                task.end_time,
                task.color,
                task.status.as_str(),
                task.date,
            ],
        )?;
        Ok(Some(task))
    }

    fn delete(&self, id: &str) -> Result<bool, PlannerError> {
        let connection = self.connect()?;
        let affected = connection.execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}
