// Game module - Pure economic formulas of the game
pub mod formulas;

pub use formulas::*;

use serde::{Deserialize, Serialize};

/// Universe and planet parameters the production formulas depend on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Economy {
    pub universe_speed: f64,
    /// Temperature used for deuterium output.
    pub planet_temperature: i32,
    /// Maximum planet temperature, drives solar satellite output.
    pub planet_max_temperature: i32,
}

impl Default for Economy {
    fn default() -> Self {
        Self {
            universe_speed: 1.0,
            planet_temperature: 0,
            planet_max_temperature: 80,
        }
    }
}
