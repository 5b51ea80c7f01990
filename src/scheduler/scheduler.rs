// Task scheduler - owns the task table, its timers and the in-flight guard
use crate::client::{DataFeed, GameClient};
use crate::error::BotError;
use crate::models::{TaskOutcome, TaskResult};
use crate::scheduler::task::{wait_delay, wait_reschedule_at, ScheduledTask, TaskId, TaskPatch};
use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Runs the body of a task. Implementations never panic on game failures;
/// they report them in the returned [`TaskOutcome`].
#[async_trait]
pub trait TaskRunner: Send + Sync {
    async fn run(&self, task: TaskId) -> TaskOutcome;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatus {
    pub is_running: bool,
    pub tasks: Vec<ScheduledTask>,
}

struct SchedulerState {
    running: bool,
    tasks: Vec<ScheduledTask>,
    timers: HashMap<TaskId, JoinHandle<()>>,
    /// Bumped on every (re)arm so a superseded one-shot never re-arms.
    timer_epochs: HashMap<TaskId, u64>,
    in_flight: HashSet<TaskId>,
}

impl SchedulerState {
    fn task(&self, id: TaskId) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn task_mut(&mut self, id: TaskId) -> Option<&mut ScheduledTask> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    fn is_enabled(&self, id: TaskId) -> bool {
        self.task(id).is_some_and(|t| t.enabled)
    }

    fn cancel_timer(&mut self, id: TaskId) {
        if let Some(handle) = self.timers.remove(&id) {
            handle.abort();
        }
        *self.timer_epochs.entry(id).or_insert(0) += 1;
    }

    fn epoch(&self, id: TaskId) -> u64 {
        self.timer_epochs.get(&id).copied().unwrap_or(0)
    }
}

struct SchedulerInner {
    state: Mutex<SchedulerState>,
    client: Arc<dyn GameClient>,
    feed: Arc<dyn DataFeed>,
    runner: Arc<dyn TaskRunner>,
    wait_margin_seconds: u64,
}

/// Cheap to clone; every clone drives the same task table.
#[derive(Clone)]
pub struct TaskScheduler {
    inner: Arc<SchedulerInner>,
}

impl TaskScheduler {
    pub fn new(
        client: Arc<dyn GameClient>,
        feed: Arc<dyn DataFeed>,
        runner: Arc<dyn TaskRunner>,
        tasks: Vec<ScheduledTask>,
        wait_margin_seconds: u64,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                state: Mutex::new(SchedulerState {
                    running: false,
                    tasks,
                    timers: HashMap::new(),
                    timer_epochs: HashMap::new(),
                    in_flight: HashSet::new(),
                }),
                client,
                feed,
                runner,
                wait_margin_seconds,
            }),
        }
    }

    pub fn tasks(&self) -> Vec<ScheduledTask> {
        self.inner.state.lock().tasks.clone()
    }

    pub fn task(&self, id: TaskId) -> Option<ScheduledTask> {
        self.inner.state.lock().task(id).cloned()
    }

    pub fn is_running(&self) -> bool {
        self.inner.state.lock().running
    }

    pub fn status(&self) -> SchedulerStatus {
        let state = self.inner.state.lock();
        SchedulerStatus { is_running: state.running, tasks: state.tasks.clone() }
    }

    /// Arm a periodic timer for every enabled task. Must be called from within
    /// a tokio runtime.
    pub fn start(&self) {
        let mut state = self.inner.state.lock();
        if state.running {
            return;
        }
        state.running = true;
        let enabled: Vec<TaskId> = state.tasks.iter().filter(|t| t.enabled).map(|t| t.id).collect();
        for id in enabled {
            arm_periodic(&self.inner, &mut state, id);
        }
        info!("▶️  Scheduler started ({} tasks armed)", state.timers.len());
    }

    /// Disarm every timer. Runs already in flight finish on their own.
    pub fn stop(&self) {
        let mut state = self.inner.state.lock();
        state.running = false;
        let ids: Vec<TaskId> = state.timers.keys().copied().collect();
        for id in ids {
            state.cancel_timer(id);
        }
        for task in state.tasks.iter_mut() {
            task.next_run = None;
        }
        info!("⏹️  Scheduler stopped");
    }

    pub fn update_task(&self, id: TaskId, patch: TaskPatch) -> Result<ScheduledTask, BotError> {
        let mut state = self.inner.state.lock();
        let task = state
            .task_mut(id)
            .ok_or_else(|| BotError::UnknownTask(id.to_string()))?;
        task.apply(&patch);
        let enabled = task.enabled;

        state.cancel_timer(id);
        if enabled && state.running {
            arm_periodic(&self.inner, &mut state, id);
        } else if let Some(task) = state.task_mut(id) {
            task.next_run = None;
        }

        let updated = state.task(id).cloned().ok_or_else(|| BotError::UnknownTask(id.to_string()))?;
        info!(
            "🛠️  Task {} updated: enabled={} interval={}min",
            id, updated.enabled, updated.interval_minutes
        );
        Ok(updated)
    }

    pub async fn execute_task(&self, id: TaskId) -> TaskResult {
        execute(&self.inner, id).await
    }
}

/// One execution of `id` with all guards, bookkeeping and wait handling.
async fn execute(inner: &Arc<SchedulerInner>, id: TaskId) -> TaskResult {
    {
        let mut state = inner.state.lock();
        if !state.running {
            return TaskResult::failed("Scheduler is not running");
        }
        if !state.in_flight.insert(id) {
            return TaskResult::failed(format!("Task {} is already running", id));
        }
    }

    let dispatched = dispatch(inner, id).await;

    let mut state = inner.state.lock();
    state.in_flight.remove(&id);
    let Some(outcome) = dispatched else {
        return TaskResult::failed(BotError::NoActiveSession.to_string());
    };
    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(error) => return error.into(),
    };

    let now = Utc::now();
    let running = state.running;
    if let Some(task) = state.task_mut(id) {
        let interval = chrono::Duration::minutes(task.interval_minutes as i64);
        task.last_run = Some(now);
        task.next_run = running.then(|| now + interval);
    }
    debug!("✔️  Task {} finished: {}", id, outcome.result.message);

    if let Some(remaining) = outcome.wait_seconds {
        if state.running && state.is_enabled(id) {
            arm_one_shot(inner, &mut state, id, remaining);
        }
    }
    outcome.result
}

/// `None` when there is no session; `Err` when a precondition fails.
async fn dispatch(inner: &Arc<SchedulerInner>, id: TaskId) -> Option<Result<TaskOutcome, BotError>> {
    if !inner.client.is_session_active().await {
        return None;
    }
    if id.needs_data_feed() && !inner.feed.is_enabled() {
        return Some(Err(BotError::DataFeedDisabled));
    }
    info!("🚀 Running task {}", id);
    Some(Ok(inner.runner.run(id).await))
}

fn arm_periodic(inner: &Arc<SchedulerInner>, state: &mut SchedulerState, id: TaskId) {
    state.cancel_timer(id);
    let Some(task) = state.task_mut(id) else {
        return;
    };
    let period = task.interval();
    task.next_run = Some(Utc::now() + chrono::Duration::seconds(period.as_secs() as i64));

    let weak: Weak<SchedulerInner> = Arc::downgrade(inner);
    let handle = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let Some(inner) = weak.upgrade() else {
                break;
            };
            // Detached so disarming the timer never aborts a run midway.
            tokio::spawn(async move {
                let result = execute(&inner, id).await;
                if !result.success {
                    warn!("⚠️  Task {}: {}", id, result.message);
                }
            });
        }
    });
    state.timers.insert(id, handle);
}

/// Replace the periodic timer with a single run after `remaining + margin`
/// seconds, then go back to periodic if nothing rescheduled in between.
fn arm_one_shot(inner: &Arc<SchedulerInner>, state: &mut SchedulerState, id: TaskId, remaining_seconds: u64) {
    let margin = inner.wait_margin_seconds;
    state.cancel_timer(id);
    let epoch = state.epoch(id);
    let fire_at = wait_reschedule_at(Utc::now(), remaining_seconds, margin);
    if let Some(task) = state.task_mut(id) {
        task.next_run = Some(fire_at);
    }
    info!("⏰ Task {} rescheduled for {} (wait {}s + {}s)", id, fire_at, remaining_seconds, margin);

    let weak: Weak<SchedulerInner> = Arc::downgrade(inner);
    let delay = wait_delay(remaining_seconds, margin);
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let Some(inner) = weak.upgrade() else {
            return;
        };
        let run = tokio::spawn({
            let inner = Arc::clone(&inner);
            async move { execute(&inner, id).await }
        });
        if let Ok(result) = run.await {
            if !result.success {
                warn!("⚠️  Task {}: {}", id, result.message);
            }
        }

        let mut state = inner.state.lock();
        if state.running && state.is_enabled(id) && state.epoch(id) == epoch {
            arm_periodic(&inner, &mut state, id);
        }
    });
    state.timers.insert(id, handle);
}
