// Galaxy coordinates, scan results and colonization targets
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const POSITIONS_PER_SYSTEM: u32 = 15;
pub const MAX_SYSTEM: u32 = 499;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinates {
    pub galaxy: u32,
    pub system: u32,
    pub position: u32,
}

impl Coordinates {
    pub const fn new(galaxy: u32, system: u32, position: u32) -> Self {
        Self { galaxy, system, position }
    }

    /// Parses the in-game `[g:s:p]` notation; the brackets are optional.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim().trim_start_matches('[').trim_end_matches(']');
        let mut parts = trimmed.split(':').map(|part| part.trim().parse::<u32>());
        let galaxy = parts.next()?.ok()?;
        let system = parts.next()?.ok()?;
        let position = parts.next()?.ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { galaxy, system, position })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}:{}]", self.galaxy, self.system, self.position)
    }
}

/// Details about whoever occupies a position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantMeta {
    #[serde(default)]
    pub planet_name: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub is_inactive: bool,
    #[serde(default)]
    pub is_vacation: bool,
    #[serde(default)]
    pub has_moon: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalaxyPosition {
    pub position: u32,
    pub is_empty: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occupant: Option<OccupantMeta>,
}

impl GalaxyPosition {
    pub fn empty(position: u32) -> Self {
        Self { position, is_empty: true, occupant: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalaxyScanResult {
    pub galaxy: u32,
    pub system: u32,
    pub positions: Vec<GalaxyPosition>,
    pub scan_timestamp: DateTime<Utc>,
}

impl GalaxyScanResult {
    pub fn empty_positions(&self) -> impl Iterator<Item = &GalaxyPosition> {
        self.positions.iter().filter(|p| p.is_empty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub min: i32,
    pub max: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionBonus {
    pub metal: i32,
    pub crystal: i32,
}

/// A scored empty position. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColonizationTarget {
    pub coordinates: Coordinates,
    pub score: i64,
    pub estimated_field_range: Range,
    pub temperature_range: Range,
    pub production_bonus: ProductionBonus,
    pub distance_from_home: u32,
    pub travel_time_seconds: u64,
}

impl ColonizationTarget {
    pub fn average_fields(&self) -> f64 {
        (self.estimated_field_range.min + self.estimated_field_range.max) as f64 / 2.0
    }
}

/// The single in-flight colonization mission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingColonization {
    pub target: ColonizationTarget,
    pub arrival_timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_coordinates() {
        assert_eq!(Coordinates::parse("[1:234:8]"), Some(Coordinates::new(1, 234, 8)));
        assert_eq!(Coordinates::parse("2:5:15"), Some(Coordinates::new(2, 5, 15)));
        assert_eq!(Coordinates::parse("[1:2]"), None);
        assert_eq!(Coordinates::parse("[1:2:3:4]"), None);
    }

    #[test]
    fn displays_in_game_notation() {
        assert_eq!(Coordinates::new(3, 42, 7).to_string(), "[3:42:7]");
    }
}
