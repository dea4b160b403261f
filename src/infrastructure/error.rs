use crate::domain::window::MalformedTimeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    MalformedTime(#[from] MalformedTimeError),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}
