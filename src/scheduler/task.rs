// Scheduled task definitions and reschedule arithmetic
use crate::error::BotError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskId {
    MaximizeMines,
    ExpansionPolicy,
}

impl TaskId {
    pub const ALL: [TaskId; 2] = [TaskId::MaximizeMines, TaskId::ExpansionPolicy];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskId::MaximizeMines => "maximize-mines",
            TaskId::ExpansionPolicy => "expansion-policy",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TaskId::MaximizeMines => "Maximize Mines",
            TaskId::ExpansionPolicy => "Expansion Policy",
        }
    }

    /// Tasks that read from the data feed refuse to run while it is disabled.
    pub fn needs_data_feed(&self) -> bool {
        matches!(self, TaskId::MaximizeMines)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskId {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| BotError::UnknownTask(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTask {
    pub id: TaskId,
    pub name: String,
    pub enabled: bool,
    pub interval_minutes: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub next_run: Option<DateTime<Utc>>,
}

impl ScheduledTask {
    pub fn new(id: TaskId, enabled: bool, interval_minutes: u64) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            enabled,
            interval_minutes: interval_minutes.max(1),
            last_run: None,
            next_run: None,
        }
    }

    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_minutes.max(1) * 60)
    }

    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(minutes) = patch.interval_minutes {
            self.interval_minutes = minutes.max(1);
        }
    }
}

/// Both tasks start disabled: mines every minute, expansion every half hour.
pub fn default_tasks() -> Vec<ScheduledTask> {
    vec![
        ScheduledTask::new(TaskId::MaximizeMines, false, 1),
        ScheduledTask::new(TaskId::ExpansionPolicy, false, 30),
    ]
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPatch {
    pub enabled: Option<bool>,
    pub interval_minutes: Option<u64>,
}

/// When a task that hit an in-game wait should run again.
pub fn wait_reschedule_at(now: DateTime<Utc>, remaining_seconds: u64, margin_seconds: u64) -> DateTime<Utc> {
    now + Duration::seconds((remaining_seconds + margin_seconds) as i64)
}

pub fn wait_delay(remaining_seconds: u64, margin_seconds: u64) -> std::time::Duration {
    std::time::Duration::from_secs(remaining_seconds + margin_seconds)
}
