pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::alarm::AlarmEngine;
pub use application::bootstrap::{bootstrap_workspace, BootstrapResult};
pub use application::planner::{NowProvider, Planner};
pub use application::scheduler::{ScheduleSnapshot, SchedulingCoordinator, TickConfig};
pub use domain::models::{Task, TaskDraft, TaskPatch, TaskStatus};
pub use domain::query::{current_task, next_task, productivity_stats, ProductivityStats};
pub use domain::window::{compute_window, format_duration, MalformedTimeError, TaskWindow};
pub use infrastructure::alarm_sink::{AlarmSignal, AlarmSink, ChannelAlarmSink, LogAlarmSink};
pub use infrastructure::error::PlannerError;
pub use infrastructure::task_store::{InMemoryTaskStore, SqliteTaskStore, TaskStore};
