// Autopilot - wires the policies, data feed and scheduler behind one control surface
use crate::client::GameClient;
use crate::config::AutopilotConfig;
use crate::data_sync::{DataSyncStatus, GameDataService, SyncOutcome};
use crate::error::BotError;
use crate::expansion::{ExpansionAction, ExpansionConfig, ExpansionConfigPatch, ExpansionPolicy, ExpansionRun, ExpansionStatus};
use crate::mines::MaximizeMinesPolicy;
use crate::models::{ColonizationTarget, TaskOutcome, TaskResult};
use crate::scheduler::{SchedulerStatus, ScheduledTask, TaskId, TaskPatch, TaskRunner, TaskScheduler};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinHandle;
use tracing::info;

/// Dispatches scheduled task ids to their policy.
struct PolicyRunner {
    mines: MaximizeMinesPolicy,
    expansion: Arc<AsyncMutex<ExpansionPolicy>>,
}

#[async_trait]
impl TaskRunner for PolicyRunner {
    async fn run(&self, task: TaskId) -> TaskOutcome {
        match task {
            TaskId::MaximizeMines => self.mines.run().await,
            TaskId::ExpansionPolicy => {
                let run = self.expansion.lock().await.run_cycle().await;
                expansion_outcome(run, Utc::now())
            }
        }
    }
}

/// A pending colonization turns into a wait until its arrival.
fn expansion_outcome(run: ExpansionRun, now: DateTime<Utc>) -> TaskOutcome {
    match run.action {
        Some(ExpansionAction::Wait { wait_until: Some(until), .. }) if until > now => {
            TaskOutcome::wait(run.result, (until - now).num_seconds().max(0) as u64)
        }
        _ => TaskOutcome::done(run.result),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AutopilotStatus {
    pub scheduler: SchedulerStatus,
    pub data_sync: DataSyncStatus,
}

pub struct Autopilot {
    client: Arc<dyn GameClient>,
    data: Arc<GameDataService>,
    expansion: Arc<AsyncMutex<ExpansionPolicy>>,
    scheduler: TaskScheduler,
    sync_loop: parking_lot::Mutex<Option<JoinHandle<()>>>,
}

impl Autopilot {
    pub fn new(client: Arc<dyn GameClient>, config: &AutopilotConfig) -> Self {
        let data = Arc::new(GameDataService::new(config.data_sync.clone()));
        let expansion = Arc::new(AsyncMutex::new(ExpansionPolicy::new(
            Arc::clone(&client),
            config.expansion.clone(),
        )));
        let runner = PolicyRunner {
            mines: MaximizeMinesPolicy::new(
                Arc::clone(&client),
                data.clone(),
                config.economy,
                config.data_sync.max_age_seconds,
            ),
            expansion: Arc::clone(&expansion),
        };
        let scheduler = TaskScheduler::new(
            Arc::clone(&client),
            data.clone(),
            Arc::new(runner),
            config.scheduler.tasks(),
            config.scheduler.wait_margin_seconds,
        );

        Self {
            client,
            data,
            expansion,
            scheduler,
            sync_loop: parking_lot::Mutex::new(None),
        }
    }

    pub fn data(&self) -> &Arc<GameDataService> {
        &self.data
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    // Scheduler controls

    /// Start the data sync loop (when enabled) and the scheduler.
    pub fn start(&self) {
        let mut sync_loop = self.sync_loop.lock();
        if sync_loop.is_none() && self.data.config().enabled {
            *sync_loop = Some(self.data.spawn_sync_loop(Arc::clone(&self.client)));
        }
        self.scheduler.start();
    }

    pub fn stop(&self) {
        self.scheduler.stop();
        if let Some(handle) = self.sync_loop.lock().take() {
            handle.abort();
        }
    }

    pub fn status(&self) -> AutopilotStatus {
        AutopilotStatus {
            scheduler: self.scheduler.status(),
            data_sync: self.data.status(),
        }
    }

    pub async fn sync_now(&self) -> Result<SyncOutcome, BotError> {
        self.data.sync_all(self.client.as_ref()).await
    }

    // Task controls

    pub fn tasks(&self) -> Vec<ScheduledTask> {
        self.scheduler.tasks()
    }

    pub fn task_status(&self, name: &str) -> Result<ScheduledTask, BotError> {
        let id: TaskId = name.parse()?;
        self.scheduler.task(id).ok_or_else(|| BotError::UnknownTask(name.to_string()))
    }

    pub fn update_task(&self, name: &str, patch: TaskPatch) -> Result<ScheduledTask, BotError> {
        self.scheduler.update_task(name.parse()?, patch)
    }

    pub async fn execute_task(&self, name: &str) -> TaskResult {
        match name.parse::<TaskId>() {
            Ok(id) => self.scheduler.execute_task(id).await,
            Err(e) => e.into(),
        }
    }

    // Expansion controls

    pub async fn expansion_config(&self) -> ExpansionConfig {
        self.expansion.lock().await.config().clone()
    }

    pub async fn update_expansion_config(&self, patch: ExpansionConfigPatch) -> ExpansionConfig {
        let mut policy = self.expansion.lock().await;
        policy.update_config(patch);
        policy.config().clone()
    }

    pub async fn expansion_status(&self) -> Result<ExpansionStatus, BotError> {
        self.expansion.lock().await.status().await
    }

    pub async fn scan_for_targets(&self) -> Result<Vec<ColonizationTarget>, BotError> {
        self.expansion.lock().await.scan_and_get_targets().await
    }

    pub async fn colonization_targets(&self) -> Vec<ColonizationTarget> {
        self.expansion.lock().await.cached_targets()
    }

    pub async fn execute_expansion(&self) -> ExpansionRun {
        self.expansion.lock().await.execute().await
    }

    pub async fn clear_expansion_cache(&self) {
        self.expansion.lock().await.clear_cache();
    }

    /// Push a reloaded configuration into the running components.
    pub async fn apply_config(&self, config: &AutopilotConfig) -> Result<(), BotError> {
        for id in TaskId::ALL {
            let settings = config.scheduler.task_config(id);
            let current = self.scheduler.task(id).ok_or_else(|| BotError::UnknownTask(id.to_string()))?;
            if current.enabled != settings.enabled || current.interval_minutes != settings.interval_minutes {
                self.scheduler.update_task(
                    id,
                    TaskPatch { enabled: Some(settings.enabled), interval_minutes: Some(settings.interval_minutes) },
                )?;
            }
        }
        self.expansion.lock().await.replace_config(config.expansion.clone());
        self.data.update_config(config.data_sync.clone());
        info!("🔄 Configuration applied to running autopilot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColonizationTarget, Coordinates, ProductionBonus, Range};
    use chrono::Duration;

    fn target() -> ColonizationTarget {
        ColonizationTarget {
            coordinates: Coordinates::new(1, 2, 8),
            score: 100,
            estimated_field_range: Range { min: 178, max: 310 },
            temperature_range: Range { min: 30, max: 70 },
            production_bonus: ProductionBonus { metal: 35, crystal: 0 },
            distance_from_home: 2,
            travel_time_seconds: 60,
        }
    }

    #[test]
    fn pending_colonization_becomes_a_wait() {
        let now = Utc::now();
        let run = ExpansionRun {
            result: TaskResult::ok("Colonization in progress"),
            action: Some(ExpansionAction::Wait { reason: "in flight".into(), wait_until: Some(now + Duration::seconds(90)) }),
        };
        assert_eq!(expansion_outcome(run, now).wait_seconds, Some(90));

        let colonize = ExpansionRun {
            result: TaskResult::ok("sent"),
            action: Some(ExpansionAction::Colonize { target: target() }),
        };
        assert_eq!(expansion_outcome(colonize, now).wait_seconds, None);
    }
}
