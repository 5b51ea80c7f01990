// Colonization - astrophysics derived limits and colony ship bookkeeping
use crate::client::GameClient;
use crate::error::BotError;
use crate::expansion::positions::{ASTROPHYSICS_BASE_COST, ASTROPHYSICS_COST_FACTOR};
use crate::models::{AstrophysicsInfo, Cost, PositionRange};

/// Planets (homeworld included) an empire may hold at an astrophysics level.
pub fn max_colonies(astrophysics_level: u32) -> u32 {
    if astrophysics_level == 0 {
        1
    } else {
        1 + (astrophysics_level + 1) / 2
    }
}

pub fn max_expeditions(astrophysics_level: u32) -> u32 {
    (astrophysics_level as f64).sqrt().floor() as u32
}

pub fn colonizable_position_range(astrophysics_level: u32) -> PositionRange {
    match astrophysics_level {
        8.. => PositionRange { min: 1, max: 15 },
        6 | 7 => PositionRange { min: 2, max: 14 },
        4 | 5 => PositionRange { min: 3, max: 13 },
        _ => PositionRange { min: 4, max: 12 },
    }
}

/// Price of researching the level after `current_level`, each resource
/// rounded to the nearest hundred.
pub fn astrophysics_cost(current_level: u32) -> Cost {
    let multiplier = ASTROPHYSICS_COST_FACTOR.powi(current_level as i32);
    let round = |base: i64| ((base as f64 * multiplier / 100.0).round() * 100.0) as i64;
    Cost {
        metal: round(ASTROPHYSICS_BASE_COST.metal),
        crystal: round(ASTROPHYSICS_BASE_COST.crystal),
        deuterium: round(ASTROPHYSICS_BASE_COST.deuterium),
    }
}

pub fn astrophysics_info(level: u32, current_colonies: u32) -> AstrophysicsInfo {
    let max = max_colonies(level);
    AstrophysicsInfo {
        level,
        max_colonies: max,
        current_colonies,
        available_slots: max as i64 - current_colonies as i64,
        max_expeditions: max_expeditions(level),
        colonizable_position_range: colonizable_position_range(level),
    }
}

pub async fn read_astrophysics_info(client: &dyn GameClient) -> Result<AstrophysicsInfo, BotError> {
    let level = client.get_astrophysics_level().await?;
    let planets = client.get_current_planets().await?;
    Ok(astrophysics_info(level, planets.len() as u32))
}
