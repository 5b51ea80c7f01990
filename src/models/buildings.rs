// Building identifiers and level snapshots
use crate::models::ResourceKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supply buildings the mine engine can ask the client to upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Building {
    #[serde(rename = "metal")]
    MetalMine,
    #[serde(rename = "crystal")]
    CrystalMine,
    #[serde(rename = "deuterium")]
    DeuteriumSynthesizer,
    #[serde(rename = "solar")]
    SolarPlant,
}

impl Building {
    /// The three resource extractors, in resource enumeration order.
    pub const MINES: [Building; 3] = [Building::MetalMine, Building::CrystalMine, Building::DeuteriumSynthesizer];

    pub fn for_resource(kind: ResourceKind) -> Building {
        match kind {
            ResourceKind::Metal => Building::MetalMine,
            ResourceKind::Crystal => Building::CrystalMine,
            ResourceKind::Deuterium => Building::DeuteriumSynthesizer,
        }
    }

    /// Resource produced by this building, `None` for the solar plant.
    pub fn resource(&self) -> Option<ResourceKind> {
        match self {
            Building::MetalMine => Some(ResourceKind::Metal),
            Building::CrystalMine => Some(ResourceKind::Crystal),
            Building::DeuteriumSynthesizer => Some(ResourceKind::Deuterium),
            Building::SolarPlant => None,
        }
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Building::MetalMine => "metal",
            Building::CrystalMine => "crystal",
            Building::DeuteriumSynthesizer => "deuterium",
            Building::SolarPlant => "solar",
        }
    }
}

impl fmt::Display for Building {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineLevels {
    pub metal: u32,
    pub crystal: u32,
    pub deuterium: u32,
    pub solar_plant: u32,
    pub solar_satellites: u32,
}

impl MineLevels {
    pub fn level(&self, building: Building) -> u32 {
        match building {
            Building::MetalMine => self.metal,
            Building::CrystalMine => self.crystal,
            Building::DeuteriumSynthesizer => self.deuterium,
            Building::SolarPlant => self.solar_plant,
        }
    }

    /// Copy of these levels with `building` one level higher.
    pub fn with_upgrade(&self, building: Building) -> MineLevels {
        let mut next = *self;
        match building {
            Building::MetalMine => next.metal += 1,
            Building::CrystalMine => next.crystal += 1,
            Building::DeuteriumSynthesizer => next.deuterium += 1,
            Building::SolarPlant => next.solar_plant += 1,
        }
        next
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLevels {
    pub metal: u32,
    pub crystal: u32,
    pub deuterium: u32,
}

impl StorageLevels {
    pub fn level(&self, kind: ResourceKind) -> u32 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }
}

/// Storage capacity per resource, derived from [`StorageLevels`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageCapacity {
    pub metal: i64,
    pub crystal: i64,
    pub deuterium: i64,
}

impl StorageCapacity {
    pub fn capacity(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }
}

/// Building queue state on the current planet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstructionStatus {
    pub in_production: bool,
    pub remaining_seconds: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ConstructionStatus {
    pub fn idle() -> Self {
        Self::default()
    }
}
