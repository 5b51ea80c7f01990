// Storage need evaluator - storage upgrades that must preempt mine upgrades
use crate::game::{self, StorageUpgradeStats};
use crate::models::{Building, MineLevels, ResourceKind, ResourceState, StorageLevels};
use serde::{Deserialize, Serialize};

/// Fill ratio at which a store counts as about to overflow.
pub const STORAGE_URGENT_RATIO: f64 = 0.90;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageNeed {
    pub needed: bool,
    pub storage_type: Option<ResourceKind>,
    pub reason: String,
    pub stats: Option<StorageUpgradeStats>,
}

impl StorageNeed {
    fn not_needed() -> Self {
        Self {
            needed: false,
            storage_type: None,
            reason: "Storage capacity is sufficient".to_string(),
            stats: None,
        }
    }

    fn needed(kind: ResourceKind, storage: &StorageLevels, reason: String) -> Self {
        Self {
            needed: true,
            storage_type: Some(kind),
            reason,
            stats: Some(game::storage_upgrade_stats(kind, storage.level(kind))),
        }
    }
}

/// Decide whether a storage upgrade has to happen before any mine upgrade.
///
/// A store at 90% or more wins outright (the fullest one when several are).
/// Failing that, a store too small to hold the next price of any mine or the
/// solar plant is flagged, metal before crystal.
pub fn determine_storage_needed(levels: &MineLevels, storage: &StorageLevels, resources: &ResourceState) -> StorageNeed {
    let capacity = game::storage_capacities(storage);

    let mut fullest: Option<(ResourceKind, f64)> = None;
    for kind in ResourceKind::ALL {
        let cap = capacity.capacity(kind);
        if cap <= 0 {
            continue;
        }
        let fill = resources.amount(kind) as f64 / cap as f64;
        if fill < STORAGE_URGENT_RATIO {
            continue;
        }
        match fullest {
            Some((_, best)) if fill <= best => {}
            _ => fullest = Some((kind, fill)),
        }
    }
    if let Some((kind, fill)) = fullest {
        return StorageNeed::needed(
            kind,
            storage,
            format!("{} storage at {:.0}% of {}, production would be lost", kind, fill * 100.0, capacity.capacity(kind)),
        );
    }

    let candidates = [Building::MetalMine, Building::CrystalMine, Building::DeuteriumSynthesizer, Building::SolarPlant];
    let costs: Vec<_> = candidates
        .iter()
        .map(|b| (*b, game::upgrade_cost(*b, levels.level(*b) + 1)))
        .collect();

    for kind in [ResourceKind::Metal, ResourceKind::Crystal] {
        let cap = capacity.capacity(kind);
        let largest = costs.iter().max_by_key(|(_, cost)| cost.amount(kind));
        if let Some((building, cost)) = largest {
            if cost.amount(kind) > cap {
                return StorageNeed::needed(
                    kind,
                    storage,
                    format!("{} next level needs {} {} but storage holds {}", building, cost.amount(kind), kind, cap),
                );
            }
        }
    }

    StorageNeed::not_needed()
}
