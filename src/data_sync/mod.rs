// Data sync module - Periodically refreshed in-memory copy of the game state
use crate::client::{DataFeed, GameClient};
use crate::error::BotError;
use crate::models::{ConstructionStatus, MineLevels, ResourceState, StorageLevels};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSyncConfig {
    pub enabled: bool,
    pub interval_seconds: u64,
    /// Data older than this is not trusted by the mines task.
    pub max_age_seconds: u64,
}

impl Default for DataSyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_seconds: 60,
            max_age_seconds: 300,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced,
    SkippedDisabled,
    SkippedNoSession,
    SkippedAlreadyRunning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSyncStatus {
    pub enabled: bool,
    pub interval_seconds: u64,
    pub last_update: Option<DateTime<Utc>>,
    pub sync_count: u64,
    pub is_syncing: bool,
}

#[derive(Debug, Default)]
struct SyncedState {
    resources: Option<ResourceState>,
    mine_levels: Option<MineLevels>,
    storage_levels: Option<StorageLevels>,
    construction: Option<ConstructionStatus>,
    /// When the running construction finishes.
    construction_ends_at: Option<DateTime<Utc>>,
    last_update: Option<DateTime<Utc>>,
    sync_count: u64,
    syncing: bool,
}

struct Snapshot {
    resources: ResourceState,
    mine_levels: MineLevels,
    storage_levels: StorageLevels,
    construction: ConstructionStatus,
}

/// Data freshness collaborator: pulls every read the policies need from the
/// game client in one pass and serves it from memory afterwards.
pub struct GameDataService {
    config: Mutex<DataSyncConfig>,
    state: Mutex<SyncedState>,
}

impl GameDataService {
    pub fn new(config: DataSyncConfig) -> Self {
        Self {
            config: Mutex::new(config),
            state: Mutex::new(SyncedState::default()),
        }
    }

    pub fn config(&self) -> DataSyncConfig {
        self.config.lock().clone()
    }

    pub fn update_config(&self, config: DataSyncConfig) {
        *self.config.lock() = config;
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.config.lock().enabled = enabled;
        info!("🔄 Data sync {}", if enabled { "enabled" } else { "disabled" });
    }

    pub async fn sync_all(&self, client: &dyn GameClient) -> Result<SyncOutcome, BotError> {
        self.sync_all_at(client, Utc::now()).await
    }

    /// One full refresh. Overlapping calls are skipped, not queued.
    pub async fn sync_all_at(&self, client: &dyn GameClient, now: DateTime<Utc>) -> Result<SyncOutcome, BotError> {
        if !self.config.lock().enabled {
            return Ok(SyncOutcome::SkippedDisabled);
        }
        if !client.is_session_active().await {
            debug!("🔄 Sync skipped: no active session");
            return Ok(SyncOutcome::SkippedNoSession);
        }
        {
            let mut state = self.state.lock();
            if state.syncing {
                return Ok(SyncOutcome::SkippedAlreadyRunning);
            }
            state.syncing = true;
        }

        let fetched = Self::fetch(client).await;

        let mut state = self.state.lock();
        state.syncing = false;
        let snapshot = fetched?;
        state.construction_ends_at = snapshot
            .construction
            .in_production
            .then(|| now + Duration::seconds(snapshot.construction.remaining_seconds as i64));
        state.resources = Some(snapshot.resources);
        state.mine_levels = Some(snapshot.mine_levels);
        state.storage_levels = Some(snapshot.storage_levels);
        state.construction = Some(snapshot.construction);
        state.last_update = Some(now);
        state.sync_count += 1;
        debug!("🔄 Game data synced (#{})", state.sync_count);
        Ok(SyncOutcome::Synced)
    }

    async fn fetch(client: &dyn GameClient) -> Result<Snapshot, BotError> {
        Ok(Snapshot {
            resources: client.get_resources().await?,
            mine_levels: client.get_mine_levels().await?,
            storage_levels: client.get_storage_levels().await?,
            construction: client.get_construction_status().await?,
        })
    }

    /// Sync immediately, then every `interval_seconds` until the handle is aborted.
    pub fn spawn_sync_loop(self: &Arc<Self>, client: Arc<dyn GameClient>) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                if let Err(e) = service.sync_all(client.as_ref()).await {
                    warn!("⚠️  Data sync failed: {}", e);
                }
                let interval = service.config.lock().interval_seconds.max(1);
                tokio::time::sleep(std::time::Duration::from_secs(interval)).await;
            }
        })
    }

    pub fn is_data_fresh_at(&self, max_age_seconds: u64, now: DateTime<Utc>) -> bool {
        match self.state.lock().last_update {
            Some(last) => now - last < Duration::seconds(max_age_seconds as i64),
            None => false,
        }
    }

    pub fn construction_status_at(&self, now: DateTime<Utc>) -> Option<ConstructionStatus> {
        let state = self.state.lock();
        let status = state.construction.clone()?;
        let Some(ends_at) = state.construction_ends_at else {
            return Some(status);
        };
        let remaining = (ends_at - now).num_seconds().max(0) as u64;
        Some(ConstructionStatus {
            in_production: remaining > 0,
            remaining_seconds: remaining,
            name: status.name,
        })
    }

    pub fn status(&self) -> DataSyncStatus {
        let config = self.config.lock().clone();
        let state = self.state.lock();
        DataSyncStatus {
            enabled: config.enabled,
            interval_seconds: config.interval_seconds,
            last_update: state.last_update,
            sync_count: state.sync_count,
            is_syncing: state.syncing,
        }
    }
}

impl DataFeed for GameDataService {
    fn is_enabled(&self) -> bool {
        self.config.lock().enabled
    }

    fn is_data_fresh(&self, max_age_seconds: u64) -> bool {
        self.is_data_fresh_at(max_age_seconds, Utc::now())
    }

    fn resources(&self) -> Option<ResourceState> {
        self.state.lock().resources
    }

    fn mine_levels(&self) -> Option<MineLevels> {
        self.state.lock().mine_levels
    }

    fn storage_levels(&self) -> Option<StorageLevels> {
        self.state.lock().storage_levels
    }

    fn construction_status(&self) -> Option<ConstructionStatus> {
        self.construction_status_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SimulatedClient, SimulatedWorld};

    #[tokio::test]
    async fn sync_fills_the_cache_and_counts() {
        let client = SimulatedClient::new(SimulatedWorld::default());
        let service = GameDataService::new(DataSyncConfig::default());
        assert!(service.resources().is_none());

        let now = Utc::now();
        let outcome = service.sync_all_at(&client, now).await.expect("sync");
        assert_eq!(outcome, SyncOutcome::Synced);
        assert_eq!(service.resources().map(|r| r.metal), Some(500));
        assert_eq!(service.status().sync_count, 1);
        assert_eq!(service.status().last_update, Some(now));
    }

    #[tokio::test]
    async fn freshness_is_strictly_younger_than_max_age() {
        let client = SimulatedClient::new(SimulatedWorld::default());
        let service = GameDataService::new(DataSyncConfig::default());
        let now = Utc::now();
        assert!(!service.is_data_fresh_at(300, now));
        service.sync_all_at(&client, now).await.expect("sync");
        assert!(service.is_data_fresh_at(300, now + Duration::seconds(299)));
        assert!(!service.is_data_fresh_at(300, now + Duration::seconds(300)));
    }

    #[tokio::test]
    async fn skips_when_disabled_or_logged_out() {
        let client = SimulatedClient::new(SimulatedWorld { session_active: false, ..SimulatedWorld::default() });
        let service = GameDataService::new(DataSyncConfig::default());
        assert_eq!(service.sync_all(&client).await, Ok(SyncOutcome::SkippedNoSession));
        service.set_enabled(false);
        assert_eq!(service.sync_all(&client).await, Ok(SyncOutcome::SkippedDisabled));
        assert_eq!(service.status().sync_count, 0);
    }

    #[tokio::test]
    async fn construction_remaining_counts_down() {
        let client = SimulatedClient::new(SimulatedWorld {
            construction: ConstructionStatus { in_production: true, remaining_seconds: 120, name: Some("Metal Mine".into()) },
            ..SimulatedWorld::default()
        });
        let service = GameDataService::new(DataSyncConfig::default());
        let now = Utc::now();
        service.sync_all_at(&client, now).await.expect("sync");

        let later = service.construction_status_at(now + Duration::seconds(50)).expect("status");
        assert!(later.in_production);
        assert_eq!(later.remaining_seconds, 70);

        let done = service.construction_status_at(now + Duration::seconds(130)).expect("status");
        assert!(!done.in_production);
        assert_eq!(done.remaining_seconds, 0);
    }
}
