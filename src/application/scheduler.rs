use crate::application::alarm::AlarmEngine;
use crate::application::planner::Planner;
use crate::domain::models::Task;
use crate::domain::query;
use crate::domain::window::{compute_window, TaskWindow};
use crate::infrastructure::alarm_sink::AlarmSink;
use crate::infrastructure::config::{AlarmSettings, TickSettings};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickConfig {
    pub fast: Duration,
    pub slow: Duration,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            fast: Duration::from_secs(1),
            slow: Duration::from_secs(60),
        }
    }
}

impl TickConfig {
    pub fn from_settings(settings: TickSettings) -> Self {
        Self {
            fast: Duration::from_secs(settings.fast_tick_seconds),
            slow: Duration::from_secs(settings.slow_tick_seconds),
        }
    }
}

/// Derived view state published after every slow pass; the fast pass only
/// refreshes `window` for the task currently on display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleSnapshot {
    pub date: String,
    pub current: Option<Task>,
    pub next: Option<Task>,
    pub window: Option<TaskWindow>,
}

struct CoordinatorInner {
    planner: Arc<Planner>,
    sink: Arc<dyn AlarmSink>,
    engine: Mutex<AlarmEngine>,
    snapshot_tx: watch::Sender<ScheduleSnapshot>,
    refresh: Notify,
    alarms_enabled: bool,
}

impl CoordinatorInner {
    async fn run_slow_pass(&self) {
        let now = (self.planner.now_provider())();
        let date = now.format("%Y-%m-%d").to_string();

        let tasks = match self.planner.list_tasks(Some(&date)) {
            Ok(tasks) => tasks,
            Err(error) => {
                self.planner.log_error("slow_tick", &error.to_string());
                return;
            }
        };

        let current = query::current_task(&tasks, now).cloned();
        let next = query::next_task(&tasks, now).cloned();
        let window = current
            .as_ref()
            .and_then(|task| compute_window(task, now).ok())
            .filter(|window| window.active);

        let signals = if self.alarms_enabled {
            match self.engine.lock() {
                Ok(mut engine) => engine.evaluate(&tasks, now),
                Err(error) => {
                    self.planner
                        .log_error("slow_tick", &format!("alarm engine lock poisoned: {error}"));
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        self.snapshot_tx.send_replace(ScheduleSnapshot {
            date,
            current,
            next,
            window,
        });

        // Each signal is routed once; a failing sink is logged and dropped.
        for signal in signals {
            if let Err(error) = self.sink.deliver(signal).await {
                self.planner
                    .log_error("alarm_dispatch", &error.to_string());
            }
        }
    }

    fn run_fast_pass(&self) {
        let now = (self.planner.now_provider())();
        self.snapshot_tx.send_if_modified(|snapshot| {
            let Some(current) = &snapshot.current else {
                return snapshot.window.take().is_some();
            };
            match compute_window(current, now) {
                Ok(window) if window.active => {
                    let changed = snapshot.window != Some(window);
                    snapshot.window = Some(window);
                    changed
                }
                _ => snapshot.window.take().is_some(),
            }
        });
    }
}

/// Owns the two recurring ticks: a fast one re-deriving the active task's
/// progress window and a slow one re-deriving current/next and running the
/// alarm engine. Both loops stop together on `shutdown` (or drop); a tick
/// never fires against torn-down state.
pub struct SchedulingCoordinator {
    inner: Arc<CoordinatorInner>,
    ticks: TickConfig,
    fast_handle: Option<JoinHandle<()>>,
    slow_handle: Option<JoinHandle<()>>,
}

impl SchedulingCoordinator {
    pub fn new(planner: Arc<Planner>, sink: Arc<dyn AlarmSink>) -> Self {
        let (snapshot_tx, _) = watch::channel(ScheduleSnapshot::default());
        Self {
            inner: Arc::new(CoordinatorInner {
                planner,
                sink,
                engine: Mutex::new(AlarmEngine::new()),
                snapshot_tx,
                refresh: Notify::new(),
                alarms_enabled: true,
            }),
            ticks: TickConfig::default(),
            fast_handle: None,
            slow_handle: None,
        }
    }

    pub fn with_tick_config(mut self, ticks: TickConfig) -> Self {
        self.ticks = ticks;
        self
    }

    pub fn with_alarm_settings(mut self, settings: AlarmSettings) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("alarm settings must be applied before the coordinator starts");
        inner.alarms_enabled = settings.enabled;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ScheduleSnapshot> {
        self.inner.snapshot_tx.subscribe()
    }

    /// Requests an immediate slow pass, on top of the regular cadence.
    /// Callers invoke this after every create/update/delete.
    pub fn notify_tasks_changed(&self) {
        self.inner.refresh.notify_one();
    }

    pub fn start(&mut self) {
        if self.slow_handle.is_some() {
            return;
        }

        let slow_inner = Arc::clone(&self.inner);
        let slow_period = self.ticks.slow;
        self.slow_handle = Some(tokio::spawn(async move {
            let mut ticker = interval(slow_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = slow_inner.refresh.notified() => {}
                }
                slow_inner.run_slow_pass().await;
            }
        }));

        let fast_inner = Arc::clone(&self.inner);
        let fast_period = self.ticks.fast;
        self.fast_handle = Some(tokio::spawn(async move {
            let mut ticker = interval(fast_period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                fast_inner.run_fast_pass();
            }
        }));
    }

    pub fn shutdown(&mut self) {
        if let Some(handle) = self.fast_handle.take() {
            handle.abort();
        }
        if let Some(handle) = self.slow_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for SchedulingCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
