use chrono::{Duration, Utc};
use ogame_autopilot::client::{SimulatedClient, SimulatedWorld};
use ogame_autopilot::expansion::{astrophysics_cost, ExpansionAction, ExpansionConfig, ExpansionConfigPatch, ExpansionPolicy};
use ogame_autopilot::models::{Coordinates, ResourceState};
use std::sync::Arc;

fn rich() -> ResourceState {
    ResourceState { metal: 100_000, crystal: 100_000, deuterium: 100_000, energy: 0 }
}

fn policy_for(world: SimulatedWorld, config: ExpansionConfig) -> (Arc<SimulatedClient>, ExpansionPolicy) {
    let client = Arc::new(SimulatedClient::new(world));
    let policy = ExpansionPolicy::new(client.clone(), config);
    (client, policy)
}

fn small_radius() -> ExpansionConfig {
    ExpansionConfig { enabled: true, scan_radius: 2, ..ExpansionConfig::default() }
}

#[tokio::test]
async fn test_full_slots_research_astrophysics() {
    let world = SimulatedWorld { resources: rich(), ..SimulatedWorld::default() };
    let (client, mut policy) = policy_for(world, small_radius());

    let run = policy.run_cycle().await;
    assert!(run.result.success, "Research should start: {}", run.result.message);
    assert!(matches!(run.action, Some(ExpansionAction::ResearchAstrophysics { .. })));
    assert_eq!(client.snapshot().astrophysics_level, 1);

    println!("✅ Astrophysics research test passed");
}

#[tokio::test]
async fn test_full_slots_without_funds_wait() {
    let (client, mut policy) = policy_for(SimulatedWorld::default(), small_radius());

    let run = policy.run_cycle().await;
    assert!(run.result.success, "Waiting is not a failure");
    match run.action {
        Some(ExpansionAction::Wait { reason, .. }) => {
            assert!(reason.contains(&astrophysics_cost(0).to_string()), "Reason should name the cost: {}", reason)
        }
        other => panic!("Expected WAIT, got {:?}", other),
    }
    assert!(client.actions().is_empty());

    println!("✅ Astrophysics wait test passed");
}

#[tokio::test]
async fn test_free_slot_builds_colony_ship() {
    let world = SimulatedWorld { resources: rich(), astrophysics_level: 1, ..SimulatedWorld::default() };
    let (client, mut policy) = policy_for(world, small_radius());

    let run = policy.run_cycle().await;
    assert!(matches!(run.action, Some(ExpansionAction::BuildColonyShip { .. })));
    assert!(run.result.success);
    assert_eq!(client.snapshot().colony_ships, 1);

    client.update(|w| {
        w.colony_ships = 0;
        w.colony_ship_in_production = true;
    });
    let run = policy.run_cycle().await;
    assert!(matches!(run.action, Some(ExpansionAction::Wait { .. })), "Ship in production means wait");

    println!("✅ Colony ship test passed");
}

#[tokio::test]
async fn test_scan_colonize_and_wait_for_arrival() {
    let world = SimulatedWorld {
        resources: rich(),
        astrophysics_level: 3,
        colony_ships: 2,
        ..SimulatedWorld::default()
    };
    let (client, mut policy) = policy_for(world, small_radius());
    let t0 = Utc::now();

    // 1. nothing cached yet
    let run = policy.run_cycle_at(t0).await;
    assert!(matches!(run.action, Some(ExpansionAction::ScanGalaxy { home }) if home == Coordinates::new(1, 100, 8)));
    assert!(run.result.success, "Scan should succeed: {}", run.result.message);
    assert_eq!(client.scan_calls(), 5, "Home system plus two on each side");
    let targets = policy.cached_targets();
    assert_eq!(targets[0].coordinates, Coordinates::new(1, 101, 8), "Closest preferred slot wins, discovery order breaks ties");

    // 2. colonize the best target
    let run = policy.run_cycle_at(t0 + Duration::seconds(1)).await;
    let target = match run.action {
        Some(ExpansionAction::Colonize { target }) => target,
        other => panic!("Expected COLONIZE, got {:?}", other),
    };
    assert_eq!(target.coordinates, Coordinates::new(1, 101, 8));
    assert_eq!(target.travel_time_seconds, 57);
    assert!(policy.cached_targets().iter().all(|t| t.coordinates != target.coordinates), "Target leaves the cache");
    let pending = policy.pending_colonization().expect("pending mission");
    assert_eq!(pending.arrival_timestamp, t0 + Duration::seconds(1 + 57));

    // 3. mission in flight
    let run = policy.run_cycle_at(t0 + Duration::seconds(10)).await;
    match run.action {
        Some(ExpansionAction::Wait { wait_until, .. }) => assert_eq!(wait_until, Some(t0 + Duration::seconds(58))),
        other => panic!("Expected WAIT for arrival, got {:?}", other),
    }

    // 4. arrived: pending cleared, next cached target used without rescanning
    let run = policy.run_cycle_at(t0 + Duration::seconds(60)).await;
    match run.action {
        Some(ExpansionAction::Colonize { target }) => assert_eq!(target.coordinates, Coordinates::new(1, 99, 8)),
        other => panic!("Expected second COLONIZE, got {:?}", other),
    }
    assert_eq!(client.scan_calls(), 5);
    assert_eq!(client.snapshot().planets.len(), 3);

    println!("✅ Colonization cycle test passed");
}

#[tokio::test]
async fn test_stale_target_list_triggers_rescan() {
    let world = SimulatedWorld { astrophysics_level: 3, colony_ships: 1, ..SimulatedWorld::default() };
    let (_client, mut policy) = policy_for(world, small_radius());
    let t0 = Utc::now();

    policy.run_cycle_at(t0).await;
    assert!(policy.last_scan().is_some());

    let astrophysics = ogame_autopilot::expansion::astrophysics_info(3, 1);
    let ships = ogame_autopilot::models::ColonyShipStatus {
        available_count: 1,
        in_production: false,
        can_build: true,
        cost: ogame_autopilot::expansion::COLONY_SHIP_COST,
    };
    let fresh = policy.determine_next_action_at(&astrophysics, &ships, t0 + Duration::minutes(10)).await.expect("action");
    assert!(matches!(fresh, ExpansionAction::Colonize { .. }));
    let stale = policy.determine_next_action_at(&astrophysics, &ships, t0 + Duration::minutes(31)).await.expect("action");
    assert!(matches!(stale, ExpansionAction::ScanGalaxy { .. }));

    println!("✅ Stale target list test passed");
}

#[tokio::test]
async fn test_small_planets_are_not_colonized() {
    // only slots 1-3 are free at home, all below the 150 field minimum
    let occupied = (4..=15).map(|p| Coordinates::new(1, 100, p)).collect();
    let world = SimulatedWorld { astrophysics_level: 8, colony_ships: 1, occupied, ..SimulatedWorld::default() };
    let config = ExpansionConfig { scan_radius: 0, preferred_positions: vec![1, 2, 3], ..ExpansionConfig::default() };
    let (client, mut policy) = policy_for(world, config);
    let t0 = Utc::now();

    let targets = policy.scan_and_get_targets_at(t0).await.expect("scan");
    assert_eq!(targets.len(), 3);
    assert_eq!(client.scan_calls(), 1);

    let run = policy.run_cycle_at(t0 + Duration::seconds(5)).await;
    match run.action {
        Some(ExpansionAction::Wait { reason, .. }) => assert!(reason.contains("No suitable"), "Unexpected reason: {}", reason),
        other => panic!("Expected WAIT, got {:?}", other),
    }

    println!("✅ Field minimum test passed");
}

#[tokio::test]
async fn test_scan_covers_clipped_radius_and_colonizable_range() {
    let world = SimulatedWorld {
        planets: vec![ogame_autopilot::models::PlanetInfo {
            id: "home".into(),
            name: "Home".into(),
            coordinates: Coordinates::new(2, 1, 6),
            is_homeworld: true,
        }],
        astrophysics_level: 4,
        ..SimulatedWorld::default()
    };
    let config = ExpansionConfig { scan_radius: 3, ..ExpansionConfig::default() };
    let (client, mut policy) = policy_for(world, config);

    let targets = policy.scan_and_get_targets().await.expect("scan");
    assert_eq!(client.scan_calls(), 4, "Systems below 1 are clipped");
    assert!(targets.iter().all(|t| (3..=13).contains(&t.coordinates.position)));
    assert!(targets.windows(2).all(|w| w[0].score >= w[1].score), "Sorted by score");
    assert_eq!(targets.len(), 4 * 11 - 1, "Every free slot in range, minus the homeworld");

    println!("✅ Scan range test passed");
}

#[tokio::test]
async fn test_execute_honours_enabled_flag() {
    let (client, mut policy) = policy_for(SimulatedWorld { resources: rich(), ..SimulatedWorld::default() }, ExpansionConfig::default());

    let run = policy.execute().await;
    assert!(!run.result.success);
    assert!(run.action.is_none());
    assert!(client.actions().is_empty());

    policy.update_config(ExpansionConfigPatch { enabled: Some(true), ..ExpansionConfigPatch::default() });
    assert!(policy.config().enabled);
    let run = policy.execute().await;
    assert!(run.result.success);

    println!("✅ Enabled flag test passed");
}

#[tokio::test]
async fn test_abandon_planet_is_not_actuated() {
    let (client, mut policy) = policy_for(SimulatedWorld::default(), ExpansionConfig::default());
    let action = ExpansionAction::AbandonPlanet { planet_id: "homeworld".into(), reason: "too small".into() };

    let result = policy.execute_action(&action).await.expect("no error");
    assert!(!result.success);
    assert!(client.actions().is_empty());

    println!("✅ Abandon planet test passed");
}

#[tokio::test]
async fn test_clear_cache_forgets_targets_and_scans() {
    let world = SimulatedWorld { astrophysics_level: 3, colony_ships: 1, ..SimulatedWorld::default() };
    let (client, mut policy) = policy_for(world, small_radius());

    policy.scan_and_get_targets().await.expect("scan");
    assert!(!policy.cached_targets().is_empty());
    policy.clear_cache();
    assert!(policy.cached_targets().is_empty());
    assert!(policy.last_scan().is_none());

    policy.scan_and_get_targets().await.expect("scan");
    assert_eq!(client.scan_calls(), 10, "Scan cache was cleared too");

    println!("✅ Clear cache test passed");
}

#[tokio::test]
async fn test_no_session_short_circuits() {
    let world = SimulatedWorld { session_active: false, ..SimulatedWorld::default() };
    let (_client, mut policy) = policy_for(world, small_radius());

    let run = policy.run_cycle().await;
    assert!(!run.result.success);
    assert!(run.action.is_none());
    assert!(policy.status().await.is_err());

    println!("✅ No session test passed");
}

#[tokio::test]
async fn test_scan_radius_patch_is_clamped() {
    let (_client, mut policy) = policy_for(SimulatedWorld::default(), small_radius());

    policy.update_config(ExpansionConfigPatch { scan_radius: Some(u32::MAX), ..ExpansionConfigPatch::default() });
    assert_eq!(policy.config().scan_radius, 498, "Radius stays inside one galaxy");

    policy.update_config(ExpansionConfigPatch { scan_radius: Some(3), ..ExpansionConfigPatch::default() });
    assert_eq!(policy.config().scan_radius, 3);

    println!("✅ Scan radius clamp test passed");
}

#[tokio::test]
async fn test_min_planet_fields_is_reserved() {
    let world = SimulatedWorld { astrophysics_level: 3, colony_ships: 1, ..SimulatedWorld::default() };
    let config = ExpansionConfig { min_planet_fields: 1_000, ..small_radius() };
    let (_client, mut policy) = policy_for(world, config);
    let t0 = Utc::now();

    policy.run_cycle_at(t0).await;
    let run = policy.run_cycle_at(t0 + Duration::seconds(1)).await;
    match run.action {
        Some(ExpansionAction::Colonize { target }) => assert_eq!(target.coordinates, Coordinates::new(1, 101, 8)),
        other => panic!("Per-position minimums decide, expected COLONIZE, got {:?}", other),
    }

    println!("✅ Reserved field minimum test passed");
}
