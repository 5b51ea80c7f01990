// Result shapes returned across the task and control surface boundary
use crate::error::BotError;
use serde::{Deserialize, Serialize};

/// Outcome of a task or control-surface call. Failures are values, never panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResult {
    pub success: bool,
    pub message: String,
}

impl TaskResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self { success: true, message: message.into() }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { success: false, message: message.into() }
    }
}

impl From<BotError> for TaskResult {
    fn from(error: BotError) -> Self {
        TaskResult::failed(error.to_string())
    }
}

/// What a task body hands back to the scheduler: the result, plus an optional
/// in-game wait after which the task should run again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub result: TaskResult,
    pub wait_seconds: Option<u64>,
}

impl TaskOutcome {
    pub fn done(result: TaskResult) -> Self {
        Self { result, wait_seconds: None }
    }

    pub fn wait(result: TaskResult, remaining_seconds: u64) -> Self {
        Self { result, wait_seconds: Some(remaining_seconds) }
    }
}

impl From<TaskResult> for TaskOutcome {
    fn from(result: TaskResult) -> Self {
        TaskOutcome::done(result)
    }
}

impl From<BotError> for TaskOutcome {
    fn from(error: BotError) -> Self {
        TaskOutcome::done(error.into())
    }
}
