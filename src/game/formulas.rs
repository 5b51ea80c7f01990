// Formula library - costs, production, energy, storage and ROI
//
// Everything here is pure and deterministic. Levels are building levels,
// amounts are whole resource units, rates are per hour.
use crate::models::{Building, Cost, MineLevels, ResourceKind, StorageCapacity, StorageLevels};
use serde::{Deserialize, Serialize};

/// Base price and growth factor of a building.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildingSpec {
    pub base: Cost,
    pub factor: f64,
}

pub const METAL_MINE: BuildingSpec = BuildingSpec { base: Cost::new(60, 15, 0), factor: 1.5 };
pub const CRYSTAL_MINE: BuildingSpec = BuildingSpec { base: Cost::new(48, 24, 0), factor: 1.6 };
pub const DEUTERIUM_SYNTHESIZER: BuildingSpec = BuildingSpec { base: Cost::new(225, 75, 0), factor: 1.5 };
pub const SOLAR_PLANT: BuildingSpec = BuildingSpec { base: Cost::new(75, 30, 0), factor: 1.5 };

pub const METAL_STORAGE: BuildingSpec = BuildingSpec { base: Cost::new(1000, 0, 0), factor: 2.0 };
pub const CRYSTAL_STORAGE: BuildingSpec = BuildingSpec { base: Cost::new(1000, 500, 0), factor: 2.0 };
pub const DEUTERIUM_STORAGE: BuildingSpec = BuildingSpec { base: Cost::new(1000, 1000, 0), factor: 2.0 };

/// Capacity of every store before any storage building exists.
pub const BASE_STORAGE_CAPACITY: i64 = 10_000;

/// Target share (percent) of total hourly output per resource.
pub const OPTIMAL_SHARES: [(ResourceKind, f64); 3] = [
    (ResourceKind::Metal, 40.0),
    (ResourceKind::Crystal, 30.0),
    (ResourceKind::Deuterium, 30.0),
];

pub fn building_spec(building: Building) -> BuildingSpec {
    match building {
        Building::MetalMine => METAL_MINE,
        Building::CrystalMine => CRYSTAL_MINE,
        Building::DeuteriumSynthesizer => DEUTERIUM_SYNTHESIZER,
        Building::SolarPlant => SOLAR_PLANT,
    }
}

pub fn storage_spec(kind: ResourceKind) -> BuildingSpec {
    match kind {
        ResourceKind::Metal => METAL_STORAGE,
        ResourceKind::Crystal => CRYSTAL_STORAGE,
        ResourceKind::Deuterium => DEUTERIUM_STORAGE,
    }
}

fn base_production(kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Metal => 30.0,
        ResourceKind::Crystal => 20.0,
        ResourceKind::Deuterium => 10.0,
    }
}

fn base_energy_consumption(kind: ResourceKind) -> f64 {
    match kind {
        ResourceKind::Metal => 10.0,
        ResourceKind::Crystal => 10.0,
        ResourceKind::Deuterium => 20.0,
    }
}

/// `floor(base * factor^(level-1))`, each resource independently.
pub fn building_cost(base: Cost, factor: f64, level: u32) -> Cost {
    let multiplier = factor.powi(level as i32 - 1);
    Cost {
        metal: (base.metal as f64 * multiplier).floor() as i64,
        crystal: (base.crystal as f64 * multiplier).floor() as i64,
        deuterium: (base.deuterium as f64 * multiplier).floor() as i64,
    }
}

/// Price of raising `building` to `level`.
pub fn upgrade_cost(building: Building, level: u32) -> Cost {
    let spec = building_spec(building);
    building_cost(spec.base, spec.factor, level)
}

pub fn storage_cost(kind: ResourceKind, level: u32) -> Cost {
    let spec = storage_spec(kind);
    building_cost(spec.base, spec.factor, level)
}

/// `floor(base * level * 1.1^level * speed)`.
pub fn production(base: f64, level: u32, speed: f64) -> i64 {
    raw_production(base, level, speed).floor() as i64
}

fn raw_production(base: f64, level: u32, speed: f64) -> f64 {
    base * level as f64 * 1.1f64.powi(level as i32) * speed
}

/// Hourly output of a resource mine. The deuterium synthesizer also scales
/// with planet temperature: colder planets produce more.
pub fn mine_production(kind: ResourceKind, level: u32, speed: f64, temperature: i32) -> i64 {
    let raw = raw_production(base_production(kind), level, speed);
    match kind {
        ResourceKind::Deuterium => (raw * deuterium_temperature_factor(temperature)).floor() as i64,
        _ => raw.floor() as i64,
    }
}

pub fn deuterium_temperature_factor(temperature: i32) -> f64 {
    1.36 - 0.004 * temperature as f64
}

pub fn production_increase(kind: ResourceKind, current_level: u32, speed: f64, temperature: i32) -> i64 {
    mine_production(kind, current_level + 1, speed, temperature)
        - mine_production(kind, current_level, speed, temperature)
}

/// `ceil(base * level * 1.1^level)`.
pub fn energy_consumption(base: f64, level: u32) -> i64 {
    (base * level as f64 * 1.1f64.powi(level as i32)).ceil() as i64
}

pub fn mine_energy_consumption(kind: ResourceKind, level: u32) -> i64 {
    energy_consumption(base_energy_consumption(kind), level)
}

pub fn energy_consumption_increase(kind: ResourceKind, current_level: u32) -> i64 {
    mine_energy_consumption(kind, current_level + 1) - mine_energy_consumption(kind, current_level)
}

pub fn solar_plant_production(level: u32) -> i64 {
    (20.0 * level as f64 * 1.1f64.powi(level as i32)).floor() as i64
}

pub fn solar_plant_production_increase(current_level: u32) -> i64 {
    solar_plant_production(current_level + 1) - solar_plant_production(current_level)
}

/// Each satellite yields `floor((maxTemperature + 160) / 6)` energy.
pub fn solar_satellite_production(count: u32, max_temperature: i32) -> i64 {
    let per_satellite = ((max_temperature + 160) as f64 / 6.0).floor() as i64;
    count as i64 * per_satellite
}

/// `10000` at level 0, else `5000 * floor(2.5 * e^(20 * level / 33))`.
pub fn storage_capacity(level: u32) -> i64 {
    if level == 0 {
        return BASE_STORAGE_CAPACITY;
    }
    let growth = (2.5 * (20.0 * level as f64 / 33.0).exp()).floor();
    (5000.0 * growth).floor() as i64
}

pub fn storage_capacities(levels: &StorageLevels) -> StorageCapacity {
    StorageCapacity {
        metal: storage_capacity(levels.metal),
        crystal: storage_capacity(levels.crystal),
        deuterium: storage_capacity(levels.deuterium),
    }
}

/// Hours of production needed to recoup the next level's price, both sides in
/// metal-equivalent units. `f64::INFINITY` when the next level adds nothing.
pub fn roi_hours(kind: ResourceKind, current_level: u32, speed: f64, temperature: i32) -> f64 {
    let increase = production_increase(kind, current_level, speed, temperature);
    if increase <= 0 {
        return f64::INFINITY;
    }
    let cost = upgrade_cost(Building::for_resource(kind), current_level + 1);
    cost.metal_equivalent() / (increase as f64 * kind.equivalence_weight())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyBalance {
    pub production: i64,
    pub consumption: i64,
    pub balance: i64,
    pub solar_plant_production: i64,
    pub solar_satellite_production: i64,
}

pub fn energy_balance(levels: &MineLevels, max_temperature: i32) -> EnergyBalance {
    let solar_plant = solar_plant_production(levels.solar_plant);
    let satellites = solar_satellite_production(levels.solar_satellites, max_temperature);
    let production = solar_plant + satellites;
    let consumption = mine_energy_consumption(ResourceKind::Metal, levels.metal)
        + mine_energy_consumption(ResourceKind::Crystal, levels.crystal)
        + mine_energy_consumption(ResourceKind::Deuterium, levels.deuterium);

    EnergyBalance {
        production,
        consumption,
        balance: production - consumption,
        solar_plant_production: solar_plant,
        solar_satellite_production: satellites,
    }
}

/// Energy balance once `building` has gained a level.
pub fn predict_energy_after_build(levels: &MineLevels, building: Building, max_temperature: i32) -> EnergyBalance {
    energy_balance(&levels.with_upgrade(building), max_temperature)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionRatio {
    pub metal: i64,
    pub crystal: i64,
    pub deuterium: i64,
    pub metal_percent: f64,
    pub crystal_percent: f64,
    pub deuterium_percent: f64,
}

impl ProductionRatio {
    pub fn percent(&self, kind: ResourceKind) -> f64 {
        match kind {
            ResourceKind::Metal => self.metal_percent,
            ResourceKind::Crystal => self.crystal_percent,
            ResourceKind::Deuterium => self.deuterium_percent,
        }
    }
}

pub fn production_ratio(levels: &MineLevels, speed: f64) -> ProductionRatio {
    let metal = mine_production(ResourceKind::Metal, levels.metal, speed, 0);
    let crystal = mine_production(ResourceKind::Crystal, levels.crystal, speed, 0);
    let deuterium = mine_production(ResourceKind::Deuterium, levels.deuterium, speed, 0);
    let total = metal + crystal + deuterium;
    let share = |amount: i64| if total > 0 { amount as f64 / total as f64 * 100.0 } else { 0.0 };

    ProductionRatio {
        metal,
        crystal,
        deuterium,
        metal_percent: share(metal),
        crystal_percent: share(crystal),
        deuterium_percent: share(deuterium),
    }
}

/// The resource whose share sits furthest below its target. Ties go to the
/// earlier resource (metal, crystal, deuterium); `None` when every share meets
/// or exceeds its target.
pub fn most_under_produced(levels: &MineLevels, speed: f64) -> Option<ResourceKind> {
    let ratio = production_ratio(levels, speed);
    let mut worst: Option<(ResourceKind, f64)> = None;
    for (kind, target) in OPTIMAL_SHARES {
        let gap = target - ratio.percent(kind);
        if gap <= 0.0 {
            continue;
        }
        match worst {
            Some((_, best_gap)) if gap <= best_gap => {}
            _ => worst = Some((kind, gap)),
        }
    }
    worst.map(|(kind, _)| kind)
}

/// Everything the decision engine needs to know about one candidate upgrade.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineStats {
    pub building: Building,
    pub next_level: u32,
    pub cost: Cost,
    /// Hourly production gain for mines, energy gain for the solar plant.
    pub output_delta: i64,
    pub energy_consumption_delta: i64,
    pub roi_hours: f64,
}

pub fn upgrade_stats(building: Building, current_level: u32, speed: f64, temperature: i32) -> MineStats {
    let next_level = current_level + 1;
    let cost = upgrade_cost(building, next_level);
    match building.resource() {
        Some(kind) => MineStats {
            building,
            next_level,
            cost,
            output_delta: production_increase(kind, current_level, speed, temperature),
            energy_consumption_delta: energy_consumption_increase(kind, current_level),
            roi_hours: roi_hours(kind, current_level, speed, temperature),
        },
        None => MineStats {
            building,
            next_level,
            cost,
            output_delta: solar_plant_production_increase(current_level),
            energy_consumption_delta: 0,
            roi_hours: f64::INFINITY,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageUpgradeStats {
    pub kind: ResourceKind,
    pub level: u32,
    pub cost: Cost,
    pub current_capacity: i64,
    pub new_capacity: i64,
    pub capacity_increase: i64,
}

pub fn storage_upgrade_stats(kind: ResourceKind, current_level: u32) -> StorageUpgradeStats {
    let level = current_level + 1;
    let current_capacity = storage_capacity(current_level);
    let new_capacity = storage_capacity(level);
    StorageUpgradeStats {
        kind,
        level,
        cost: storage_cost(kind, level),
        current_capacity,
        new_capacity,
        capacity_increase: new_capacity - current_capacity,
    }
}
