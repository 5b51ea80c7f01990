// Maximize mines policy - the recurring mine upgrade task body
use crate::client::{DataFeed, GameClient};
use crate::error::BotError;
use crate::game::Economy;
use crate::mines::{decide_next_upgrade, determine_storage_needed};
use crate::models::{TaskOutcome, TaskResult};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Reads the synced game state, then builds at most one storage or mine level
/// per run. A running construction turns into a wait request for the scheduler.
pub struct MaximizeMinesPolicy {
    client: Arc<dyn GameClient>,
    feed: Arc<dyn DataFeed>,
    economy: Economy,
    max_data_age_seconds: u64,
}

impl MaximizeMinesPolicy {
    pub fn new(client: Arc<dyn GameClient>, feed: Arc<dyn DataFeed>, economy: Economy, max_data_age_seconds: u64) -> Self {
        Self { client, feed, economy, max_data_age_seconds }
    }

    pub async fn run(&self) -> TaskOutcome {
        match self.try_run().await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!("⚠️  Maximize mines: {}", error);
                error.into()
            }
        }
    }

    async fn try_run(&self) -> Result<TaskOutcome, BotError> {
        if !self.client.is_session_active().await {
            return Err(BotError::NoActiveSession);
        }
        if !self.feed.is_enabled() {
            return Err(BotError::DataFeedDisabled);
        }
        if !self.feed.is_data_fresh(self.max_data_age_seconds) {
            return Err(BotError::StaleCache {
                what: "game data".to_string(),
                max_age_seconds: self.max_data_age_seconds,
            });
        }

        let resources = self.feed.resources().ok_or_else(|| BotError::read_failed("cached resources"))?;
        let levels = self.feed.mine_levels().ok_or_else(|| BotError::read_failed("cached mine levels"))?;
        debug!(
            metal = resources.metal,
            crystal = resources.crystal,
            deuterium = resources.deuterium,
            energy = resources.energy,
            "📦 Cached resources"
        );

        let construction = self.feed.construction_status().unwrap_or_default();
        if construction.in_production {
            let name = construction.name.as_deref().unwrap_or("building");
            let minutes = construction.remaining_seconds.div_ceil(60);
            info!("⏳ Construction in progress: {} ({} min left)", name, minutes);
            return Ok(TaskOutcome::wait(
                TaskResult::ok(format!("Construction in progress ({}), {} min remaining", name, minutes)),
                construction.remaining_seconds,
            ));
        }

        if let Some(storage) = self.feed.storage_levels() {
            let need = determine_storage_needed(&levels, &storage, &resources);
            if let (true, Some(kind), Some(stats)) = (need.needed, need.storage_type, need.stats) {
                info!("🏚️  Storage needed: {}", need.reason);
                if !resources.covers(&stats.cost) {
                    return Err(BotError::InsufficientResources { missing: resources.shortfall(&stats.cost) });
                }
                if !self.client.build_storage(kind).await {
                    return Err(BotError::action_failed(format!("build {} storage", kind)));
                }
                return Ok(TaskResult::ok(format!("{} storage level {} started. {}", kind, stats.level, need.reason)).into());
            }
        }

        let decision = decide_next_upgrade(&levels, &resources, &self.economy);
        info!("🎯 Mine decision: {}", decision.reason);
        for alternative in &decision.alternatives {
            debug!("   alternative {}: {}", alternative.building, alternative.reason);
        }

        let (Some(building), Some(stats)) = (decision.recommendation, decision.stats) else {
            return Ok(TaskResult::failed(decision.reason).into());
        };
        if !decision.can_afford {
            return Ok(TaskResult::failed(format!("Waiting for resources for {}. {}", building, decision.reason)).into());
        }

        // The cached snapshot may be stale; check the live stockpile before acting.
        let live = self.client.get_resources().await?;
        if !live.covers(&stats.cost) {
            return Err(BotError::InsufficientResources { missing: live.shortfall(&stats.cost) });
        }
        // Only energy consumers are gated on the live balance.
        if stats.energy_consumption_delta > 0 {
            let energy_after = live.energy - stats.energy_consumption_delta;
            if energy_after < 0 {
                return Err(BotError::InsufficientEnergy { missing: -energy_after });
            }
        }

        if !self.client.build_mine(building).await {
            return Err(BotError::action_failed(format!("build {}", building)));
        }
        info!("🏗️  {} level {} started", building, stats.next_level);
        Ok(TaskResult::ok(format!("{} level {} started. {}", building, stats.next_level, decision.reason)).into())
    }
}
