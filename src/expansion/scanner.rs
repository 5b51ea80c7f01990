// Galaxy scanner - TTL cache of system scans and colonization target scoring
use crate::client::GameClient;
use crate::error::BotError;
use crate::expansion::colonization::colonizable_position_range;
use crate::expansion::positions::{base_position_score, position_data};
use crate::models::{ColonizationTarget, Coordinates, GalaxyScanResult, MAX_SYSTEM};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const SCAN_CACHE_TTL_MINUTES: i64 = 30;
/// Fleet speed assumed for colony ship travel estimates.
pub const COLONY_FLEET_SPEED: f64 = 2500.0;
/// Widest radius that still fits inside one galaxy.
pub const MAX_SCAN_RADIUS: u32 = MAX_SYSTEM - 1;

pub struct GalaxyScanner {
    cache: Mutex<HashMap<(u32, u32), Arc<GalaxyScanResult>>>,
    ttl: Duration,
}

impl Default for GalaxyScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl GalaxyScanner {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
            ttl: Duration::minutes(SCAN_CACHE_TTL_MINUTES),
        }
    }

    pub async fn scan_system(&self, client: &dyn GameClient, galaxy: u32, system: u32) -> Result<Arc<GalaxyScanResult>, BotError> {
        self.scan_system_at(client, galaxy, system, Utc::now()).await
    }

    /// Cached result when younger than the TTL, otherwise a fresh scan that
    /// replaces the cache entry.
    pub async fn scan_system_at(
        &self,
        client: &dyn GameClient,
        galaxy: u32,
        system: u32,
        now: DateTime<Utc>,
    ) -> Result<Arc<GalaxyScanResult>, BotError> {
        if let Some(cached) = self.cached_at(galaxy, system, now) {
            debug!("📋 Using cached scan for [{}:{}]", galaxy, system);
            return Ok(cached);
        }

        debug!("🔭 Scanning system [{}:{}]", galaxy, system);
        let positions = client.scan_system(galaxy, system).await?;
        let result = Arc::new(GalaxyScanResult { galaxy, system, positions, scan_timestamp: now });
        self.cache.lock().insert((galaxy, system), Arc::clone(&result));
        debug!(
            "✅ System [{}:{}] scanned: {} empty positions",
            galaxy,
            system,
            result.empty_positions().count()
        );
        Ok(result)
    }

    fn cached_at(&self, galaxy: u32, system: u32, now: DateTime<Utc>) -> Option<Arc<GalaxyScanResult>> {
        let cache = self.cache.lock();
        cache
            .get(&(galaxy, system))
            .filter(|result| now - result.scan_timestamp < self.ttl)
            .cloned()
    }

    pub async fn scan_nearby_systems(
        &self,
        client: &dyn GameClient,
        home: Coordinates,
        radius: u32,
        preferred_positions: &[u32],
        astrophysics_level: u32,
    ) -> Vec<ColonizationTarget> {
        self.scan_nearby_systems_at(client, home, radius, preferred_positions, astrophysics_level, Utc::now())
            .await
    }

    /// Scan the home system and `radius` systems either side of it, score every
    /// empty colonizable position and return them best first. Systems that fail
    /// to scan are skipped.
    pub async fn scan_nearby_systems_at(
        &self,
        client: &dyn GameClient,
        home: Coordinates,
        radius: u32,
        preferred_positions: &[u32],
        astrophysics_level: u32,
        now: DateTime<Utc>,
    ) -> Vec<ColonizationTarget> {
        let range = colonizable_position_range(astrophysics_level);
        let systems = systems_to_scan(home, radius);
        info!(
            "🔭 Colonization scan around {} (±{} systems, positions {}-{})",
            home, radius, range.min, range.max
        );

        let mut targets = Vec::new();
        for (galaxy, system) in &systems {
            let scan = match self.scan_system_at(client, *galaxy, *system, now).await {
                Ok(scan) => scan,
                Err(e) => {
                    warn!("❌ Scan of [{}:{}] failed: {}", galaxy, system, e);
                    continue;
                }
            };
            for position in scan.empty_positions() {
                if !range.contains(position.position) {
                    continue;
                }
                let coordinates = Coordinates::new(*galaxy, *system, position.position);
                if let Some(target) = evaluate_position(coordinates, home, preferred_positions) {
                    targets.push(target);
                }
            }
        }

        targets.sort_by(|a, b| b.score.cmp(&a.score));
        info!("📊 Scanned {} systems, {} candidate positions", systems.len(), targets.len());
        for target in targets.iter().take(5) {
            debug!(
                "   🏆 {} score {} fields {}-{}",
                target.coordinates, target.score, target.estimated_field_range.min, target.estimated_field_range.max
            );
        }
        targets
    }

    pub fn clear_cache(&self) {
        self.cache.lock().clear();
        info!("🗑️  Galaxy scan cache cleared");
    }

    pub fn cached_systems(&self) -> Vec<(u32, u32)> {
        let mut systems: Vec<_> = self.cache.lock().keys().copied().collect();
        systems.sort();
        systems
    }
}

/// Home system first, then `+offset` and `-offset` pairs, clipped to the galaxy.
pub fn systems_to_scan(home: Coordinates, radius: u32) -> Vec<(u32, u32)> {
    let mut systems = vec![(home.galaxy, home.system)];
    for offset in 1..=radius.min(MAX_SCAN_RADIUS) {
        let plus = home.system.saturating_add(offset);
        if plus <= MAX_SYSTEM {
            systems.push((home.galaxy, plus));
        }
        if let Some(minus) = home.system.checked_sub(offset).filter(|s| *s >= 1) {
            systems.push((home.galaxy, minus));
        }
    }
    systems
}

/// Deterministic score of an empty position; `None` for slots without table data.
pub fn evaluate_position(coordinates: Coordinates, home: Coordinates, preferred_positions: &[u32]) -> Option<ColonizationTarget> {
    let data = position_data(coordinates.position)?;
    let base = base_position_score(coordinates.position);
    let preference_bonus = preferred_positions
        .iter()
        .position(|p| *p == coordinates.position)
        .map(|index| (preferred_positions.len() - index) as i64 * 5)
        .unwrap_or(0);

    let galaxy_distance = coordinates.galaxy.abs_diff(home.galaxy);
    let system_distance = coordinates.system.abs_diff(home.system);
    let distance = galaxy_distance * 100 + system_distance;
    let proximity_bonus = (20 - distance as i64).max(0);

    Some(ColonizationTarget {
        coordinates,
        score: base + preference_bonus + proximity_bonus,
        estimated_field_range: data.fields,
        temperature_range: data.temperature,
        production_bonus: data.bonus,
        distance_from_home: distance,
        travel_time_seconds: travel_time_seconds(home, coordinates),
    })
}

pub fn travel_distance(from: Coordinates, to: Coordinates) -> u32 {
    if from.galaxy != to.galaxy {
        from.galaxy.abs_diff(to.galaxy) * 20_000
    } else if from.system != to.system {
        from.system.abs_diff(to.system) * 95 + 2_700
    } else {
        from.position.abs_diff(to.position) * 5 + 1_000
    }
}

pub fn travel_time_seconds(from: Coordinates, to: Coordinates) -> u64 {
    let distance = travel_distance(from, to) as f64;
    let time = 10.0 + 35_000.0 / COLONY_FLEET_SPEED * (distance * 10.0 / COLONY_FLEET_SPEED).sqrt();
    time.round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{SimulatedClient, SimulatedWorld};

    fn home() -> Coordinates {
        Coordinates::new(1, 100, 8)
    }

    #[test]
    fn scan_order_starts_at_home_and_clips() {
        assert_eq!(systems_to_scan(home(), 2), vec![(1, 100), (1, 101), (1, 99), (1, 102), (1, 98)]);
        let edge = systems_to_scan(Coordinates::new(2, 2, 5), 3);
        assert_eq!(edge, vec![(2, 2), (2, 3), (2, 1), (2, 4), (2, 5)]);
        let far_edge = systems_to_scan(Coordinates::new(1, 499, 5), 1);
        assert_eq!(far_edge, vec![(1, 499), (1, 498)]);
    }

    #[test]
    fn oversized_radius_covers_the_galaxy_once() {
        let systems = systems_to_scan(home(), u32::MAX);
        assert_eq!(systems.len(), MAX_SYSTEM as usize);
        let mut sorted: Vec<u32> = systems.iter().map(|(_, s)| *s).collect();
        sorted.sort();
        assert_eq!(sorted, (1..=MAX_SYSTEM).collect::<Vec<_>>());
    }

    #[test]
    fn score_adds_preference_and_proximity() {
        let preferred = [8, 7, 9, 6, 10, 15];
        let target = evaluate_position(Coordinates::new(1, 103, 8), home(), &preferred).expect("slot 8");
        // 100 base + 6 * 5 preference + (20 - 3) proximity
        assert_eq!(target.score, 100 + 30 + 17);
        assert_eq!(target.distance_from_home, 3);

        let unlisted = evaluate_position(Coordinates::new(2, 100, 4), home(), &preferred).expect("slot 4");
        assert_eq!(unlisted.score, 40);
        assert_eq!(unlisted.distance_from_home, 100);
    }

    #[test]
    fn travel_distance_by_hop_kind() {
        assert_eq!(travel_distance(home(), Coordinates::new(3, 1, 1)), 40_000);
        assert_eq!(travel_distance(home(), Coordinates::new(1, 104, 8)), 4 * 95 + 2_700);
        assert_eq!(travel_distance(home(), Coordinates::new(1, 100, 10)), 1_010);
        // 10 + 14 * sqrt(1010 * 10 / 2500) = 10 + 14 * 2.0100 = 38.14
        assert_eq!(travel_time_seconds(home(), Coordinates::new(1, 100, 10)), 38);
    }

    #[tokio::test]
    async fn second_scan_within_ttl_hits_the_cache() {
        let client = SimulatedClient::new(SimulatedWorld::default());
        let scanner = GalaxyScanner::new();
        let t0 = Utc::now();

        let first = scanner.scan_system_at(&client, 1, 50, t0).await.expect("scan");
        let second = scanner
            .scan_system_at(&client, 1, 50, t0 + Duration::minutes(29))
            .await
            .expect("scan");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(client.scan_calls(), 1);

        let third = scanner
            .scan_system_at(&client, 1, 50, t0 + Duration::minutes(31))
            .await
            .expect("scan");
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(client.scan_calls(), 2);
    }

    #[tokio::test]
    async fn nearby_scan_respects_range_and_ordering() {
        let client = SimulatedClient::new(SimulatedWorld::default());
        let scanner = GalaxyScanner::new();
        let targets = scanner
            .scan_nearby_systems_at(&client, home(), 3, &[8, 7, 9], 0, Utc::now())
            .await;

        assert_eq!(client.scan_calls(), 7);
        assert!(!targets.is_empty());
        assert!(targets.iter().all(|t| (4..=12).contains(&t.coordinates.position)));
        assert!(targets.windows(2).all(|w| w[0].score >= w[1].score));
        // the homeworld slot is occupied
        assert!(targets.iter().all(|t| t.coordinates != home()));
    }

    #[tokio::test]
    async fn clear_cache_forces_rescan() {
        let client = SimulatedClient::new(SimulatedWorld::default());
        let scanner = GalaxyScanner::new();
        let now = Utc::now();
        scanner.scan_system_at(&client, 1, 10, now).await.expect("scan");
        assert_eq!(scanner.cached_systems(), vec![(1, 10)]);
        scanner.clear_cache();
        assert!(scanner.cached_systems().is_empty());
        scanner.scan_system_at(&client, 1, 10, now).await.expect("scan");
        assert_eq!(client.scan_calls(), 2);
    }
}
