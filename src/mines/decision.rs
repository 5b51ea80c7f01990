// Mine decision engine - picks the next supply building to upgrade
//
// Rules are evaluated in strict priority order and the first match wins:
// energy deficit, energy-blocked mines, nothing affordable, production ratio
// correction, then plain lowest ROI.
use crate::game::{self, Economy, MineStats};
use crate::models::{Building, Cost, MineLevels, ResourceKind, ResourceState};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A ratio-correcting mine may cost up to this multiple of the best ROI.
pub const RATIO_ROI_TOLERANCE: f64 = 1.5;

/// What is still missing before a recommendation can be paid for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortfall {
    pub resources: Cost,
    pub energy: i64,
}

impl Shortfall {
    pub fn is_empty(&self) -> bool {
        self.resources.is_zero() && self.energy <= 0
    }
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.resources.is_zero(), self.energy > 0) {
            (false, true) => write!(f, "{}, {} energy", self.resources, self.energy),
            (false, false) => write!(f, "{}", self.resources),
            (true, true) => write!(f, "{} energy", self.energy),
            (true, false) => f.write_str("nothing"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alternative {
    pub building: Building,
    pub reason: String,
    pub stats: MineStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineDecision {
    /// `None` means nothing should be built right now.
    pub recommendation: Option<Building>,
    pub reason: String,
    pub stats: Option<MineStats>,
    pub alternatives: Vec<Alternative>,
    pub can_afford: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Shortfall>,
}

impl MineDecision {
    fn build(building: Building, reason: String, stats: MineStats, alternatives: Vec<Alternative>) -> Self {
        Self {
            recommendation: Some(building),
            reason,
            stats: Some(stats),
            alternatives,
            can_afford: true,
            missing: None,
        }
    }

    fn hold(reason: String, stats: Option<MineStats>, alternatives: Vec<Alternative>, missing: Shortfall) -> Self {
        Self {
            recommendation: None,
            reason,
            stats,
            alternatives,
            can_afford: false,
            missing: Some(missing),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    stats: MineStats,
    resources_ok: bool,
    energy_ok: bool,
}

impl Candidate {
    fn affordable(&self) -> bool {
        self.resources_ok && self.energy_ok
    }
}

fn roi_label(stats: &MineStats) -> String {
    if stats.roi_hours.is_finite() {
        format!("ROI: {:.1}h", stats.roi_hours)
    } else {
        "ROI: never".to_string()
    }
}

fn alternatives_from(mut candidates: Vec<Candidate>) -> Vec<Alternative> {
    candidates.sort_by(|a, b| a.stats.roi_hours.total_cmp(&b.stats.roi_hours));
    candidates
        .into_iter()
        .map(|c| Alternative { building: c.stats.building, reason: roi_label(&c.stats), stats: c.stats })
        .collect()
}

/// Decide which of metal, crystal, deuterium or the solar plant to upgrade
/// next. Pure: acting on the result is the caller's job.
pub fn decide_next_upgrade(levels: &MineLevels, resources: &ResourceState, economy: &Economy) -> MineDecision {
    let speed = economy.universe_speed;
    let temperature = economy.planet_temperature;
    let solar = game::upgrade_stats(Building::SolarPlant, levels.solar_plant, speed, temperature);
    let solar_affordable = resources.covers(&solar.cost);
    let solar_missing = Shortfall { resources: resources.shortfall(&solar.cost), energy: 0 };

    // Rule 1: energy deficit
    let balance = game::energy_balance(levels, economy.planet_max_temperature);
    if resources.energy < 0 || balance.balance < 0 {
        let deficit = resources.energy.min(balance.balance);
        if solar_affordable {
            return MineDecision::build(
                Building::SolarPlant,
                format!("Energy deficit ({}), solar plant level {} comes first", deficit, solar.next_level),
                solar,
                Vec::new(),
            );
        }
        return MineDecision::hold(
            format!("Energy deficit ({}) and solar plant level {} is not affordable: missing {}", deficit, solar.next_level, solar_missing),
            Some(solar),
            Vec::new(),
            solar_missing,
        );
    }

    // Rule 2: evaluate every mine independently on resources and energy
    let candidates: Vec<Candidate> = Building::MINES
        .iter()
        .map(|building| {
            let stats = game::upgrade_stats(*building, levels.level(*building), speed, temperature);
            Candidate {
                stats,
                resources_ok: resources.covers(&stats.cost),
                energy_ok: resources.energy - stats.energy_consumption_delta >= 0,
            }
        })
        .collect();

    let affordable: Vec<Candidate> = candidates.iter().copied().filter(Candidate::affordable).collect();

    if affordable.is_empty() {
        // Rule 3: resources are there, energy is not
        if candidates.iter().any(|c| c.resources_ok) {
            if solar_affordable {
                return MineDecision::build(
                    Building::SolarPlant,
                    format!("Mines are affordable but energy is short, solar plant level {} first", solar.next_level),
                    solar,
                    Vec::new(),
                );
            }
            return MineDecision::hold(
                format!("Resources exist for a mine but energy is short, and solar plant level {} is not affordable: missing {}", solar.next_level, solar_missing),
                Some(solar),
                alternatives_from(candidates),
                solar_missing,
            );
        }

        // Rule 4: nothing affordable at all
        if solar_affordable {
            return MineDecision::build(
                Building::SolarPlant,
                format!("No mine is affordable yet, upgrading solar plant to level {} meanwhile", solar.next_level),
                solar,
                Vec::new(),
            );
        }

        let mut by_roi = candidates;
        by_roi.sort_by(|a, b| a.stats.roi_hours.total_cmp(&b.stats.roi_hours));
        let target = by_roi.remove(0);
        let missing = Shortfall {
            resources: resources.shortfall(&target.stats.cost),
            energy: (target.stats.energy_consumption_delta - resources.energy).max(0),
        };
        return MineDecision::hold(
            format!(
                "Saving for {} level {} ({}): missing {}",
                target.stats.building,
                target.stats.next_level,
                roi_label(&target.stats),
                missing
            ),
            Some(target.stats),
            alternatives_from(by_roi),
            missing,
        );
    }

    let mut ranked = affordable;
    ranked.sort_by(|a, b| a.stats.roi_hours.total_cmp(&b.stats.roi_hours));
    let best_roi = ranked[0].stats.roi_hours;

    // Rule 5: correct a production imbalance when it is not much worse
    if let Some(kind) = game::most_under_produced(levels, speed) {
        let building = Building::for_resource(kind);
        if let Some(index) = ranked.iter().position(|c| c.stats.building == building) {
            let pick = ranked[index];
            if pick.stats.roi_hours <= best_roi * RATIO_ROI_TOLERANCE {
                ranked.remove(index);
                let ratio = game::production_ratio(levels, speed);
                let target_share = target_share(kind);
                return MineDecision::build(
                    building,
                    format!(
                        "Balancing production: {} at {:.1}% (target {:.0}%), {}",
                        kind,
                        ratio.percent(kind),
                        target_share,
                        roi_label(&pick.stats)
                    ),
                    pick.stats,
                    alternatives_from(ranked),
                );
            }
        }
    }

    // Rule 6: best ROI
    let best = ranked.remove(0);
    MineDecision::build(
        best.stats.building,
        format!("Best return on investment, {}", roi_label(&best.stats)),
        best.stats,
        alternatives_from(ranked),
    )
}

fn target_share(kind: ResourceKind) -> f64 {
    game::OPTIMAL_SHARES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, share)| *share)
        .unwrap_or(0.0)
}
