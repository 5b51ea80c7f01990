// Scheduler module - Recurring task execution with wait-aware rescheduling
pub mod task;
pub mod scheduler;

pub use scheduler::{SchedulerStatus, TaskRunner, TaskScheduler};
pub use task::{default_tasks, wait_delay, wait_reschedule_at, ScheduledTask, TaskId, TaskPatch};
