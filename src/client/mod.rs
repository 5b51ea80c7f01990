// Client module - Game client and data feed collaborator interfaces
pub mod simulated;

pub use simulated::{SimulatedClient, SimulatedWorld};

use crate::error::BotError;
use crate::models::*;
use async_trait::async_trait;

/// Capability interface to the live game. Reads fail with a [`BotError`];
/// actions report plain success or failure and are retried on the next tick.
#[async_trait]
pub trait GameClient: Send + Sync {
    async fn is_session_active(&self) -> bool;

    async fn get_resources(&self) -> Result<ResourceState, BotError>;
    async fn get_mine_levels(&self) -> Result<MineLevels, BotError>;
    async fn get_storage_levels(&self) -> Result<StorageLevels, BotError>;
    async fn get_astrophysics_level(&self) -> Result<u32, BotError>;
    async fn get_colony_ship_status(&self) -> Result<ColonyShipStatus, BotError>;
    async fn get_construction_status(&self) -> Result<ConstructionStatus, BotError>;
    /// All fifteen positions of one solar system.
    async fn scan_system(&self, galaxy: u32, system: u32) -> Result<Vec<GalaxyPosition>, BotError>;
    async fn get_current_planets(&self) -> Result<Vec<PlanetInfo>, BotError>;

    async fn build_mine(&self, building: Building) -> bool;
    async fn build_storage(&self, kind: ResourceKind) -> bool;
    async fn build_colony_ship(&self) -> bool;
    async fn research_astrophysics(&self) -> bool;
    async fn send_colonization_mission(&self, target: &ColonizationTarget) -> bool;
}

/// Periodically synced copy of the game state. Accessors return `None` until
/// the first successful sync.
pub trait DataFeed: Send + Sync {
    fn is_enabled(&self) -> bool;
    fn is_data_fresh(&self, max_age_seconds: u64) -> bool;

    fn resources(&self) -> Option<ResourceState>;
    fn mine_levels(&self) -> Option<MineLevels>;
    fn storage_levels(&self) -> Option<StorageLevels>;
    fn construction_status(&self) -> Option<ConstructionStatus>;
}
