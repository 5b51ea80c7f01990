// Planet, astrophysics and colony ship snapshots
use crate::models::{Coordinates, Cost};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub coordinates: Coordinates,
    #[serde(default)]
    pub is_homeworld: bool,
}

/// Find the homeworld, falling back to the first listed planet.
pub fn homeworld(planets: &[PlanetInfo]) -> Option<&PlanetInfo> {
    planets.iter().find(|p| p.is_homeworld).or_else(|| planets.first())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    pub min: u32,
    pub max: u32,
}

impl PositionRange {
    pub fn contains(&self, position: u32) -> bool {
        position >= self.min && position <= self.max
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AstrophysicsInfo {
    pub level: u32,
    pub max_colonies: u32,
    pub current_colonies: u32,
    pub available_slots: i64,
    pub max_expeditions: u32,
    pub colonizable_position_range: PositionRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColonyShipStatus {
    pub available_count: u32,
    pub in_production: bool,
    pub can_build: bool,
    pub cost: Cost,
}
