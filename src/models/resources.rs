// Resource amounts, costs and the resource enumeration
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three stockpiled resources, in their canonical enumeration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Metal,
    Crystal,
    Deuterium,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 3] = [ResourceKind::Metal, ResourceKind::Crystal, ResourceKind::Deuterium];

    pub fn name(&self) -> &'static str {
        match self {
            ResourceKind::Metal => "metal",
            ResourceKind::Crystal => "crystal",
            ResourceKind::Deuterium => "deuterium",
        }
    }

    /// Weight used to convert an amount of this resource into metal-equivalent units.
    pub fn equivalence_weight(&self) -> f64 {
        match self {
            ResourceKind::Metal => 1.0,
            ResourceKind::Crystal => 1.5,
            ResourceKind::Deuterium => 3.0,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Snapshot of a planet's stockpiles as reported by the game client.
/// Energy is the current balance and may be negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState {
    pub metal: i64,
    pub crystal: i64,
    pub deuterium: i64,
    pub energy: i64,
}

impl ResourceState {
    pub fn amount(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }

    pub fn covers(&self, cost: &Cost) -> bool {
        self.metal >= cost.metal && self.crystal >= cost.crystal && self.deuterium >= cost.deuterium
    }

    /// What is still missing to pay `cost`, zero where the stockpile already suffices.
    pub fn shortfall(&self, cost: &Cost) -> Cost {
        Cost {
            metal: (cost.metal - self.metal).max(0),
            crystal: (cost.crystal - self.crystal).max(0),
            deuterium: (cost.deuterium - self.deuterium).max(0),
        }
    }
}

/// A metal/crystal/deuterium price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cost {
    pub metal: i64,
    pub crystal: i64,
    pub deuterium: i64,
}

impl Cost {
    pub const fn new(metal: i64, crystal: i64, deuterium: i64) -> Self {
        Self { metal, crystal, deuterium }
    }

    pub fn amount(&self, kind: ResourceKind) -> i64 {
        match kind {
            ResourceKind::Metal => self.metal,
            ResourceKind::Crystal => self.crystal,
            ResourceKind::Deuterium => self.deuterium,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.metal == 0 && self.crystal == 0 && self.deuterium == 0
    }

    /// Metal-equivalent value of the whole price (metal 1, crystal 1.5, deuterium 3).
    pub fn metal_equivalent(&self) -> f64 {
        ResourceKind::ALL
            .iter()
            .map(|kind| self.amount(*kind) as f64 * kind.equivalence_weight())
            .sum()
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = ResourceKind::ALL
            .iter()
            .filter(|kind| self.amount(**kind) > 0)
            .map(|kind| format!("{} {}", self.amount(*kind), kind))
            .collect();
        if parts.is_empty() {
            f.write_str("nothing")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortfall_only_counts_missing_amounts() {
        let resources = ResourceState { metal: 100, crystal: 500, deuterium: 0, energy: 0 };
        let cost = Cost::new(150, 200, 10);
        assert_eq!(resources.shortfall(&cost), Cost::new(50, 0, 10));
        assert!(!resources.covers(&cost));
    }

    #[test]
    fn cost_display_skips_zero_components() {
        assert_eq!(Cost::new(1200, 0, 30).to_string(), "1200 metal, 30 deuterium");
        assert_eq!(Cost::default().to_string(), "nothing");
    }

    #[test]
    fn metal_equivalent_uses_trade_weights() {
        let cost = Cost::new(100, 100, 100);
        assert!((cost.metal_equivalent() - 550.0).abs() < 1e-9);
    }
}
