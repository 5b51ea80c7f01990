// Expansion policy - decides and executes the next colonization step
use crate::client::GameClient;
use crate::error::BotError;
use crate::expansion::colonization::{astrophysics_cost, read_astrophysics_info};
use crate::expansion::positions::{min_acceptable_fields, COLONY_SHIP_COST};
use crate::expansion::scanner::{GalaxyScanner, MAX_SCAN_RADIUS, SCAN_CACHE_TTL_MINUTES};
use crate::models::*;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    pub enabled: bool,
    pub max_colonies: u32,
    /// Most preferred slot first.
    pub preferred_positions: Vec<u32>,
    /// Reserved. Target selection uses the per-position minimum from
    /// [`min_acceptable_fields`], which this value does not override.
    pub min_planet_fields: u32,
    /// Systems scanned on each side of the homeworld, at most [`MAX_SCAN_RADIUS`].
    pub scan_radius: u32,
    /// Reserved for re-colonizing abandoned slots, which is never actuated.
    pub auto_recolonize: bool,
    pub prioritize_astrophysics: bool,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_colonies: 9,
            preferred_positions: vec![8, 7, 9, 6, 10, 15],
            min_planet_fields: 180,
            scan_radius: 50,
            auto_recolonize: true,
            prioritize_astrophysics: true,
        }
    }
}

/// Partial update for [`ExpansionConfig`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfigPatch {
    pub enabled: Option<bool>,
    pub max_colonies: Option<u32>,
    pub preferred_positions: Option<Vec<u32>>,
    pub min_planet_fields: Option<u32>,
    pub scan_radius: Option<u32>,
    pub auto_recolonize: Option<bool>,
    pub prioritize_astrophysics: Option<bool>,
}

impl ExpansionConfig {
    pub fn apply(&mut self, patch: ExpansionConfigPatch) {
        if let Some(v) = patch.enabled { self.enabled = v; }
        if let Some(v) = patch.max_colonies { self.max_colonies = v; }
        if let Some(v) = patch.preferred_positions { self.preferred_positions = v; }
        if let Some(v) = patch.min_planet_fields { self.min_planet_fields = v; }
        if let Some(v) = patch.scan_radius { self.scan_radius = v.min(MAX_SCAN_RADIUS); }
        if let Some(v) = patch.auto_recolonize { self.auto_recolonize = v; }
        if let Some(v) = patch.prioritize_astrophysics { self.prioritize_astrophysics = v; }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpansionAction {
    Wait {
        reason: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        wait_until: Option<DateTime<Utc>>,
    },
    ResearchAstrophysics { reason: String },
    BuildColonyShip { reason: String },
    ScanGalaxy { home: Coordinates },
    Colonize { target: ColonizationTarget },
    /// Recognised but never chosen or carried out.
    AbandonPlanet { planet_id: String, reason: String },
}

impl ExpansionAction {
    pub fn name(&self) -> &'static str {
        match self {
            ExpansionAction::Wait { .. } => "WAIT",
            ExpansionAction::ResearchAstrophysics { .. } => "RESEARCH_ASTROPHYSICS",
            ExpansionAction::BuildColonyShip { .. } => "BUILD_COLONY_SHIP",
            ExpansionAction::ScanGalaxy { .. } => "SCAN_GALAXY",
            ExpansionAction::Colonize { .. } => "COLONIZE",
            ExpansionAction::AbandonPlanet { .. } => "ABANDON_PLANET",
        }
    }

    fn wait(reason: impl Into<String>) -> Self {
        ExpansionAction::Wait { reason: reason.into(), wait_until: None }
    }
}

/// Result of one expansion cycle and the action it took, if it got that far.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpansionRun {
    pub result: TaskResult,
    pub action: Option<ExpansionAction>,
}

impl From<BotError> for ExpansionRun {
    fn from(error: BotError) -> Self {
        ExpansionRun { result: error.into(), action: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpansionStatus {
    pub config: ExpansionConfig,
    pub astrophysics: AstrophysicsInfo,
    pub colony_ships: ColonyShipStatus,
    pub current_planets: Vec<PlanetInfo>,
    pub pending_colonization: Option<PendingColonization>,
    pub last_scan: Option<DateTime<Utc>>,
    pub next_action: ExpansionAction,
}

/// Owns the target list, the scan cache and the single pending mission.
pub struct ExpansionPolicy {
    client: Arc<dyn GameClient>,
    scanner: GalaxyScanner,
    config: ExpansionConfig,
    cached_targets: Vec<ColonizationTarget>,
    last_scan: Option<DateTime<Utc>>,
    pending: Option<PendingColonization>,
}

impl ExpansionPolicy {
    pub fn new(client: Arc<dyn GameClient>, config: ExpansionConfig) -> Self {
        Self {
            client,
            scanner: GalaxyScanner::new(),
            config,
            cached_targets: Vec::new(),
            last_scan: None,
            pending: None,
        }
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    pub fn update_config(&mut self, patch: ExpansionConfigPatch) {
        self.config.apply(patch);
        info!("⚙️  Expansion config updated: {:?}", self.config);
    }

    pub fn replace_config(&mut self, config: ExpansionConfig) {
        self.config = config;
    }

    pub fn scanner(&self) -> &GalaxyScanner {
        &self.scanner
    }

    pub fn pending_colonization(&self) -> Option<&PendingColonization> {
        self.pending.as_ref()
    }

    pub fn last_scan(&self) -> Option<DateTime<Utc>> {
        self.last_scan
    }

    pub fn cached_targets(&self) -> Vec<ColonizationTarget> {
        self.cached_targets.clone()
    }

    pub fn clear_cache(&mut self) {
        self.cached_targets.clear();
        self.last_scan = None;
        self.scanner.clear_cache();
    }

    /// Entry point for the control surface: refuses while disabled.
    pub async fn execute(&mut self) -> ExpansionRun {
        if !self.config.enabled {
            return ExpansionRun { result: TaskResult::failed("Expansion policy is disabled"), action: None };
        }
        self.run_cycle().await
    }

    /// Entry point for the scheduler, which has its own enabled flag.
    pub async fn run_cycle(&mut self) -> ExpansionRun {
        self.run_cycle_at(Utc::now()).await
    }

    pub async fn run_cycle_at(&mut self, now: DateTime<Utc>) -> ExpansionRun {
        if !self.client.is_session_active().await {
            return BotError::NoActiveSession.into();
        }
        info!("🌍 Expansion cycle starting");

        let astrophysics = match read_astrophysics_info(self.client.as_ref()).await {
            Ok(info) => info,
            Err(e) => return e.into(),
        };
        let colony_ships = match self.client.get_colony_ship_status().await {
            Ok(status) => status,
            Err(e) => return e.into(),
        };
        let action = match self.determine_next_action_at(&astrophysics, &colony_ships, now).await {
            Ok(action) => action,
            Err(e) => return e.into(),
        };
        info!("🎯 Next expansion action: {}", action.name());

        let result = match self.execute_action_at(&action, now).await {
            Ok(result) => result,
            Err(e) => {
                warn!("⚠️  Expansion action {} failed: {}", action.name(), e);
                e.into()
            }
        };
        ExpansionRun { result, action: Some(action) }
    }

    pub async fn determine_next_action(
        &mut self,
        astrophysics: &AstrophysicsInfo,
        colony_ships: &ColonyShipStatus,
    ) -> Result<ExpansionAction, BotError> {
        self.determine_next_action_at(astrophysics, colony_ships, Utc::now()).await
    }

    /// Transition rules in priority order. Clears the pending mission once its
    /// arrival time has passed.
    pub async fn determine_next_action_at(
        &mut self,
        astrophysics: &AstrophysicsInfo,
        colony_ships: &ColonyShipStatus,
        now: DateTime<Utc>,
    ) -> Result<ExpansionAction, BotError> {
        if astrophysics.available_slots <= 0 {
            if !self.config.prioritize_astrophysics {
                return Ok(ExpansionAction::wait(format!(
                    "No colony slots available ({}/{}), astrophysics research needed",
                    astrophysics.current_colonies, astrophysics.max_colonies
                )));
            }
            let resources = self.client.get_resources().await?;
            let cost = astrophysics_cost(astrophysics.level);
            if resources.covers(&cost) {
                return Ok(ExpansionAction::ResearchAstrophysics {
                    reason: format!(
                        "No colony slots available, researching astrophysics {} -> {}",
                        astrophysics.level,
                        astrophysics.level + 1
                    ),
                });
            }
            return Ok(ExpansionAction::wait(format!(
                "No colony slots available, astrophysics level {} needs {} (missing {})",
                astrophysics.level + 1,
                cost,
                resources.shortfall(&cost)
            )));
        }

        if colony_ships.available_count == 0 {
            if colony_ships.in_production {
                return Ok(ExpansionAction::wait("Colony ship in production"));
            }
            if colony_ships.can_build {
                let resources = self.client.get_resources().await?;
                if resources.covers(&COLONY_SHIP_COST) {
                    return Ok(ExpansionAction::BuildColonyShip {
                        reason: "No colony ship available, building one".to_string(),
                    });
                }
                return Ok(ExpansionAction::wait(format!(
                    "No colony ship available, missing {}",
                    resources.shortfall(&COLONY_SHIP_COST)
                )));
            }
            return Ok(ExpansionAction::wait("No colony ship available and the shipyard cannot build one"));
        }

        if let Some(pending) = &self.pending {
            if pending.arrival_timestamp > now {
                return Ok(ExpansionAction::Wait {
                    reason: format!("Colonization in progress towards {}", pending.target.coordinates),
                    wait_until: Some(pending.arrival_timestamp),
                });
            }
            debug!("🛬 Colonization of {} has arrived", pending.target.coordinates);
            self.pending = None;
        }

        if self.needs_scan(now) {
            let planets = self.client.get_current_planets().await?;
            if let Some(home) = homeworld(&planets) {
                return Ok(ExpansionAction::ScanGalaxy { home: home.coordinates });
            }
        }

        match self.select_best_target(astrophysics) {
            Some(target) => Ok(ExpansionAction::Colonize { target }),
            None => Ok(ExpansionAction::wait(
                "No suitable colonization target found, consider a larger scan radius",
            )),
        }
    }

    fn needs_scan(&self, now: DateTime<Utc>) -> bool {
        match self.last_scan {
            None => true,
            Some(last) => self.cached_targets.is_empty() || now - last > Duration::minutes(SCAN_CACHE_TTL_MINUTES),
        }
    }

    /// First cached target inside the colonizable band whose average field
    /// count meets the minimum for its slot.
    pub fn select_best_target(&self, astrophysics: &AstrophysicsInfo) -> Option<ColonizationTarget> {
        let range = astrophysics.colonizable_position_range;
        self.cached_targets
            .iter()
            .find(|target| {
                let position = target.coordinates.position;
                range.contains(position) && target.average_fields() >= min_acceptable_fields(position)
            })
            .cloned()
    }

    pub async fn execute_action(&mut self, action: &ExpansionAction) -> Result<TaskResult, BotError> {
        self.execute_action_at(action, Utc::now()).await
    }

    pub async fn execute_action_at(&mut self, action: &ExpansionAction, now: DateTime<Utc>) -> Result<TaskResult, BotError> {
        match action {
            ExpansionAction::Wait { reason, .. } => {
                info!("⏳ {}", reason);
                Ok(TaskResult::ok(reason.clone()))
            }
            ExpansionAction::ResearchAstrophysics { reason } => {
                info!("🔬 {}", reason);
                if !self.client.research_astrophysics().await {
                    return Err(BotError::action_failed("research astrophysics"));
                }
                Ok(TaskResult::ok("Astrophysics research started"))
            }
            ExpansionAction::BuildColonyShip { reason } => {
                info!("🚀 {}", reason);
                if !self.client.build_colony_ship().await {
                    return Err(BotError::action_failed("build colony ship"));
                }
                Ok(TaskResult::ok("Colony ship under construction"))
            }
            ExpansionAction::ScanGalaxy { home } => {
                let level = self.client.get_astrophysics_level().await?;
                let targets = self.scan_from_at(*home, level, now).await;
                if targets.is_empty() {
                    return Err(BotError::NoValidTarget);
                }
                Ok(TaskResult::ok(format!("Scan complete, {} positions found", targets.len())))
            }
            ExpansionAction::Colonize { target } => {
                info!("🌍 Colonizing {}", target.coordinates);
                if !self.client.send_colonization_mission(target).await {
                    return Err(BotError::action_failed(format!("send colonization mission to {}", target.coordinates)));
                }
                self.cached_targets.retain(|t| t.coordinates != target.coordinates);
                self.pending = Some(PendingColonization {
                    target: target.clone(),
                    arrival_timestamp: now + Duration::seconds(target.travel_time_seconds as i64),
                });
                Ok(TaskResult::ok(format!("Colonization mission sent to {}", target.coordinates)))
            }
            ExpansionAction::AbandonPlanet { reason, .. } => {
                info!("🗑️  Abandon planet requested: {}", reason);
                Ok(TaskResult::failed("Abandoning planets is not implemented"))
            }
        }
    }

    pub async fn scan_and_get_targets(&mut self) -> Result<Vec<ColonizationTarget>, BotError> {
        self.scan_and_get_targets_at(Utc::now()).await
    }

    /// Scan around the homeworld and replace the target list.
    pub async fn scan_and_get_targets_at(&mut self, now: DateTime<Utc>) -> Result<Vec<ColonizationTarget>, BotError> {
        let planets = self.client.get_current_planets().await?;
        let Some(home) = homeworld(&planets) else {
            return Ok(Vec::new());
        };
        let level = self.client.get_astrophysics_level().await?;
        Ok(self.scan_from_at(home.coordinates, level, now).await)
    }

    async fn scan_from_at(&mut self, home: Coordinates, astrophysics_level: u32, now: DateTime<Utc>) -> Vec<ColonizationTarget> {
        let targets = self
            .scanner
            .scan_nearby_systems_at(
                self.client.as_ref(),
                home,
                self.config.scan_radius,
                &self.config.preferred_positions,
                astrophysics_level,
                now,
            )
            .await;
        self.cached_targets = targets.clone();
        self.last_scan = Some(now);
        targets
    }

    pub async fn status(&mut self) -> Result<ExpansionStatus, BotError> {
        self.status_at(Utc::now()).await
    }

    pub async fn status_at(&mut self, now: DateTime<Utc>) -> Result<ExpansionStatus, BotError> {
        if !self.client.is_session_active().await {
            return Err(BotError::NoActiveSession);
        }
        let astrophysics = read_astrophysics_info(self.client.as_ref()).await?;
        let colony_ships = self.client.get_colony_ship_status().await?;
        let current_planets = self.client.get_current_planets().await?;
        let next_action = self.determine_next_action_at(&astrophysics, &colony_ships, now).await?;
        Ok(ExpansionStatus {
            config: self.config.clone(),
            astrophysics,
            colony_ships,
            current_planets,
            pending_colonization: self.pending.clone(),
            last_scan: self.last_scan,
            next_action,
        })
    }
}
