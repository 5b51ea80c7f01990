// Position tables - per-slot planet characteristics and scoring weights
use crate::models::{Cost, ProductionBonus, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionData {
    pub fields: Range,
    pub temperature: Range,
    pub bonus: ProductionBonus,
}

const fn row(fields_min: i32, fields_max: i32, temp_min: i32, temp_max: i32, metal: i32, crystal: i32) -> PositionData {
    PositionData {
        fields: Range { min: fields_min, max: fields_max },
        temperature: Range { min: temp_min, max: temp_max },
        bonus: ProductionBonus { metal, crystal },
    }
}

/// Indexed by `position - 1`.
const POSITION_DATA: [PositionData; 15] = [
    row(96, 172, 220, 260, 0, 40),
    row(104, 176, 170, 210, 0, 30),
    row(112, 182, 120, 160, 0, 20),
    row(118, 208, 70, 110, 0, 0),
    row(133, 224, 60, 100, 0, 0),
    row(148, 236, 50, 90, 17, 0),
    row(163, 248, 40, 80, 23, 0),
    row(178, 310, 30, 70, 35, 0),
    row(163, 248, 20, 60, 23, 0),
    row(148, 236, 10, 50, 17, 0),
    row(133, 224, 0, 40, 0, 0),
    row(118, 208, -10, 30, 0, 0),
    row(112, 182, -50, -10, 0, 0),
    row(104, 176, -90, -50, 0, 0),
    row(96, 172, -130, -90, 0, 0),
];

const POSITION_SCORES: [i64; 15] = [25, 30, 35, 40, 55, 70, 85, 100, 85, 70, 55, 40, 45, 50, 60];

pub const DEFAULT_POSITION_SCORE: i64 = 50;
pub const DEFAULT_MIN_FIELDS: f64 = 150.0;

pub const COLONY_SHIP_COST: Cost = Cost::new(10_000, 20_000, 10_000);
pub const ASTROPHYSICS_BASE_COST: Cost = Cost::new(4_000, 8_000, 4_000);
pub const ASTROPHYSICS_COST_FACTOR: f64 = 1.75;

pub fn position_data(position: u32) -> Option<&'static PositionData> {
    position.checked_sub(1).and_then(|index| POSITION_DATA.get(index as usize))
}

pub fn base_position_score(position: u32) -> i64 {
    position
        .checked_sub(1)
        .and_then(|index| POSITION_SCORES.get(index as usize))
        .copied()
        .unwrap_or(DEFAULT_POSITION_SCORE)
}

/// Smallest average field count worth colonizing at a position.
pub fn min_acceptable_fields(position: u32) -> f64 {
    match position {
        6 | 10 => 170.0,
        7 | 9 => 180.0,
        8 => 200.0,
        _ => DEFAULT_MIN_FIELDS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_slots_score_highest() {
        assert_eq!(base_position_score(8), 100);
        assert_eq!(base_position_score(1), 25);
        assert_eq!(base_position_score(15), 60);
        assert_eq!(base_position_score(0), DEFAULT_POSITION_SCORE);
        assert_eq!(base_position_score(16), DEFAULT_POSITION_SCORE);
    }

    #[test]
    fn tables_cover_every_slot() {
        for position in 1..=15 {
            assert!(position_data(position).is_some());
        }
        assert!(position_data(0).is_none());
        assert_eq!(position_data(8).map(|d| d.fields.max), Some(310));
        assert_eq!(position_data(1).map(|d| d.bonus.crystal), Some(40));
    }

    #[test]
    fn field_minimums_are_stricter_in_the_middle() {
        assert_eq!(min_acceptable_fields(8), 200.0);
        assert_eq!(min_acceptable_fields(7), 180.0);
        assert_eq!(min_acceptable_fields(3), 150.0);
    }
}
