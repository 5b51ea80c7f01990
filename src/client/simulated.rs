// Simulated client - in-memory game world used for dry runs and tests
use crate::client::GameClient;
use crate::error::BotError;
use crate::expansion::{astrophysics_cost, COLONY_SHIP_COST};
use crate::game;
use crate::models::*;
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Snapshot of everything the simulated game knows. Loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatedWorld {
    pub session_active: bool,
    pub resources: ResourceState,
    pub mine_levels: MineLevels,
    pub storage_levels: StorageLevels,
    pub astrophysics_level: u32,
    pub colony_ships: u32,
    pub colony_ship_in_production: bool,
    pub shipyard_ready: bool,
    pub planet_max_temperature: i32,
    pub planets: Vec<PlanetInfo>,
    /// Positions held by other players.
    pub occupied: Vec<Coordinates>,
    pub construction: ConstructionStatus,
    /// Every action call returns false when set.
    pub fail_actions: bool,
}

impl Default for SimulatedWorld {
    fn default() -> Self {
        Self {
            session_active: true,
            resources: ResourceState { metal: 500, crystal: 500, deuterium: 0, energy: 0 },
            mine_levels: MineLevels::default(),
            storage_levels: StorageLevels::default(),
            astrophysics_level: 0,
            colony_ships: 0,
            colony_ship_in_production: false,
            shipyard_ready: true,
            planet_max_temperature: 80,
            planets: vec![PlanetInfo {
                id: "homeworld".to_string(),
                name: "Homeworld".to_string(),
                coordinates: Coordinates::new(1, 100, 8),
                is_homeworld: true,
            }],
            occupied: Vec::new(),
            construction: ConstructionStatus::idle(),
            fail_actions: false,
        }
    }
}

impl SimulatedWorld {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn is_occupied(&self, coordinates: Coordinates) -> bool {
        self.occupied.contains(&coordinates) || self.planets.iter().any(|p| p.coordinates == coordinates)
    }

    fn pay(&mut self, cost: &Cost) -> bool {
        if !self.resources.covers(cost) {
            return false;
        }
        self.resources.metal -= cost.metal;
        self.resources.crystal -= cost.crystal;
        self.resources.deuterium -= cost.deuterium;
        true
    }

    fn refresh_energy(&mut self) {
        self.resources.energy = game::energy_balance(&self.mine_levels, self.planet_max_temperature).balance;
    }
}

/// [`GameClient`] over a [`SimulatedWorld`]. Construction completes instantly.
pub struct SimulatedClient {
    world: Mutex<SimulatedWorld>,
    scan_calls: AtomicUsize,
    actions: Mutex<Vec<String>>,
}

impl SimulatedClient {
    pub fn new(world: SimulatedWorld) -> Self {
        Self {
            world: Mutex::new(world),
            scan_calls: AtomicUsize::new(0),
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> SimulatedWorld {
        self.world.lock().clone()
    }

    pub fn update(&self, change: impl FnOnce(&mut SimulatedWorld)) {
        change(&mut self.world.lock());
    }

    /// Number of `scan_system` calls that reached the world.
    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }

    /// Successful actions in call order, e.g. `build metal`.
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().clone()
    }

    fn perform(&self, name: String, action: impl FnOnce(&mut SimulatedWorld) -> bool) -> bool {
        let mut world = self.world.lock();
        if world.fail_actions || !world.session_active {
            return false;
        }
        let done = action(&mut world);
        if done {
            debug!("🧪 Simulated {}", name);
            self.actions.lock().push(name);
        }
        done
    }

    fn read<T>(&self, what: &str, read: impl FnOnce(&SimulatedWorld) -> T) -> Result<T, BotError> {
        let world = self.world.lock();
        if !world.session_active {
            return Err(BotError::read_failed(what));
        }
        Ok(read(&world))
    }
}

#[async_trait]
impl GameClient for SimulatedClient {
    async fn is_session_active(&self) -> bool {
        self.world.lock().session_active
    }

    async fn get_resources(&self) -> Result<ResourceState, BotError> {
        self.read("resources", |w| w.resources)
    }

    async fn get_mine_levels(&self) -> Result<MineLevels, BotError> {
        self.read("mine levels", |w| w.mine_levels)
    }

    async fn get_storage_levels(&self) -> Result<StorageLevels, BotError> {
        self.read("storage levels", |w| w.storage_levels)
    }

    async fn get_astrophysics_level(&self) -> Result<u32, BotError> {
        self.read("astrophysics level", |w| w.astrophysics_level)
    }

    async fn get_colony_ship_status(&self) -> Result<ColonyShipStatus, BotError> {
        self.read("colony ship status", |w| ColonyShipStatus {
            available_count: w.colony_ships,
            in_production: w.colony_ship_in_production,
            can_build: w.shipyard_ready,
            cost: COLONY_SHIP_COST,
        })
    }

    async fn get_construction_status(&self) -> Result<ConstructionStatus, BotError> {
        self.read("construction status", |w| w.construction.clone())
    }

    async fn scan_system(&self, galaxy: u32, system: u32) -> Result<Vec<GalaxyPosition>, BotError> {
        let positions: Vec<GalaxyPosition> = self.read("galaxy view", |w| {
            (1..=POSITIONS_PER_SYSTEM)
                .map(|position| {
                    if w.is_occupied(Coordinates::new(galaxy, system, position)) {
                        GalaxyPosition { position, is_empty: false, occupant: Some(OccupantMeta::default()) }
                    } else {
                        GalaxyPosition::empty(position)
                    }
                })
                .collect()
        })?;
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        Ok(positions)
    }

    async fn get_current_planets(&self) -> Result<Vec<PlanetInfo>, BotError> {
        self.read("planet list", |w| w.planets.clone())
    }

    async fn build_mine(&self, building: Building) -> bool {
        self.perform(format!("build {}", building), |w| {
            if w.construction.in_production {
                return false;
            }
            let cost = game::upgrade_cost(building, w.mine_levels.level(building) + 1);
            if !w.pay(&cost) {
                return false;
            }
            w.mine_levels = w.mine_levels.with_upgrade(building);
            w.refresh_energy();
            true
        })
    }

    async fn build_storage(&self, kind: ResourceKind) -> bool {
        self.perform(format!("build {} storage", kind), |w| {
            if w.construction.in_production {
                return false;
            }
            let cost = game::storage_cost(kind, w.storage_levels.level(kind) + 1);
            if !w.pay(&cost) {
                return false;
            }
            match kind {
                ResourceKind::Metal => w.storage_levels.metal += 1,
                ResourceKind::Crystal => w.storage_levels.crystal += 1,
                ResourceKind::Deuterium => w.storage_levels.deuterium += 1,
            }
            true
        })
    }

    async fn build_colony_ship(&self) -> bool {
        self.perform("build colony ship".to_string(), |w| {
            if !w.shipyard_ready || !w.pay(&COLONY_SHIP_COST) {
                return false;
            }
            w.colony_ships += 1;
            true
        })
    }

    async fn research_astrophysics(&self) -> bool {
        self.perform("research astrophysics".to_string(), |w| {
            let cost = astrophysics_cost(w.astrophysics_level);
            if !w.pay(&cost) {
                return false;
            }
            w.astrophysics_level += 1;
            true
        })
    }

    async fn send_colonization_mission(&self, target: &ColonizationTarget) -> bool {
        let coordinates = target.coordinates;
        self.perform(format!("colonize {}", coordinates), |w| {
            if w.colony_ships == 0 || w.is_occupied(coordinates) {
                return false;
            }
            w.colony_ships -= 1;
            w.planets.push(PlanetInfo {
                id: format!("colony-{}", w.planets.len()),
                name: "Colony".to_string(),
                coordinates,
                is_homeworld: false,
            });
            true
        })
    }
}
