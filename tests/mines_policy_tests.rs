use ogame_autopilot::client::{SimulatedClient, SimulatedWorld};
use ogame_autopilot::data_sync::{DataSyncConfig, GameDataService};
use ogame_autopilot::game::Economy;
use ogame_autopilot::mines::MaximizeMinesPolicy;
use ogame_autopilot::models::{ConstructionStatus, MineLevels, ResourceState};
use ogame_autopilot::BotError;
use std::sync::Arc;

const MAX_AGE: u64 = 300;

struct Harness {
    client: Arc<SimulatedClient>,
    data: Arc<GameDataService>,
    policy: MaximizeMinesPolicy,
}

fn harness(world: SimulatedWorld, sync: DataSyncConfig) -> Harness {
    let client = Arc::new(SimulatedClient::new(world));
    let data = Arc::new(GameDataService::new(sync));
    let policy = MaximizeMinesPolicy::new(client.clone(), data.clone(), Economy::default(), MAX_AGE);
    Harness { client, data, policy }
}

async fn synced(world: SimulatedWorld) -> Harness {
    let h = harness(world, DataSyncConfig::default());
    h.data.sync_all(h.client.as_ref()).await.expect("sync");
    h
}

#[tokio::test]
async fn test_refuses_without_data_feed() {
    let h = harness(SimulatedWorld::default(), DataSyncConfig { enabled: false, ..DataSyncConfig::default() });

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert_eq!(outcome.result.message, BotError::DataFeedDisabled.to_string());
    assert!(h.client.actions().is_empty());

    println!("✅ Data feed disabled test passed");
}

#[tokio::test]
async fn test_refuses_stale_data() {
    let h = harness(SimulatedWorld::default(), DataSyncConfig::default());

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert!(outcome.result.message.contains("older than 300s"), "Unexpected message: {}", outcome.result.message);

    println!("✅ Stale data test passed");
}

#[tokio::test]
async fn test_no_session_fails_fast() {
    let h = synced(SimulatedWorld::default()).await;
    h.client.update(|w| w.session_active = false);

    let outcome = h.policy.run().await;
    assert_eq!(outcome.result.message, BotError::NoActiveSession.to_string());

    println!("✅ No session test passed");
}

#[tokio::test]
async fn test_running_construction_requests_a_wait() {
    let world = SimulatedWorld {
        construction: ConstructionStatus {
            in_production: true,
            remaining_seconds: 600,
            name: Some("Metal Mine".to_string()),
        },
        ..SimulatedWorld::default()
    };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(outcome.result.success, "Waiting is not a failure");
    assert!(outcome.result.message.starts_with("Construction in progress (Metal Mine)"));
    let wait = outcome.wait_seconds.expect("wait requested");
    assert!((598..=600).contains(&wait), "Remaining time counts down from the sync: {}", wait);
    assert!(h.client.actions().is_empty());

    println!("✅ Construction wait test passed");
}

#[tokio::test]
async fn test_fresh_planet_starts_with_solar() {
    let h = synced(SimulatedWorld::default()).await;

    // Every mine needs energy a planet without a solar plant does not have.
    let outcome = h.policy.run().await;
    assert!(outcome.result.success, "Build should start: {}", outcome.result.message);
    assert!(outcome.wait_seconds.is_none());
    assert_eq!(h.client.actions(), vec!["build solar".to_string()]);
    assert_eq!(h.client.snapshot().mine_levels.solar_plant, 1);

    h.data.sync_all(h.client.as_ref()).await.expect("resync");
    let outcome = h.policy.run().await;
    assert!(outcome.result.success, "Second build should start: {}", outcome.result.message);
    assert_eq!(h.client.actions().len(), 2);
    assert_ne!(h.client.actions()[1], "build solar", "Energy now covers a mine");

    println!("✅ Solar first test passed");
}

#[tokio::test]
async fn test_full_metal_store_builds_storage_first() {
    let world = SimulatedWorld {
        resources: ResourceState { metal: 9_200, crystal: 500, deuterium: 0, energy: 0 },
        ..SimulatedWorld::default()
    };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(outcome.result.success, "Storage build should start: {}", outcome.result.message);
    assert!(outcome.result.message.starts_with("metal storage level 1 started"));
    assert_eq!(h.client.actions(), vec!["build metal storage".to_string()]);

    println!("✅ Storage priority test passed");
}

#[tokio::test]
async fn test_live_resources_are_rechecked() {
    let h = synced(SimulatedWorld::default()).await;
    h.client.update(|w| w.resources = ResourceState::default());

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert!(outcome.result.message.starts_with("Insufficient resources"), "Unexpected message: {}", outcome.result.message);
    assert!(h.client.actions().is_empty());

    println!("✅ Live resource recheck test passed");
}

#[tokio::test]
async fn test_unaffordable_upgrade_is_reported() {
    let world = SimulatedWorld { resources: ResourceState::default(), ..SimulatedWorld::default() };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert!(outcome.wait_seconds.is_none());
    assert!(h.client.actions().is_empty());

    println!("✅ Unaffordable upgrade test passed");
}

#[tokio::test]
async fn test_failed_action_is_reported() {
    let h = synced(SimulatedWorld::default()).await;
    h.client.update(|w| w.fail_actions = true);

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert!(outcome.result.message.contains("build solar"), "Unexpected message: {}", outcome.result.message);

    println!("✅ Failed action test passed");
}

#[tokio::test]
async fn test_energy_deficit_builds_solar() {
    let world = SimulatedWorld {
        mine_levels: MineLevels { metal: 2, crystal: 2, deuterium: 1, solar_plant: 1, solar_satellites: 0 },
        resources: ResourceState { metal: 500, crystal: 500, deuterium: 0, energy: -50 },
        ..SimulatedWorld::default()
    };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(outcome.result.success, "Solar must be built during a deficit: {}", outcome.result.message);
    assert!(outcome.result.message.starts_with("solar level 2 started"), "Unexpected message: {}", outcome.result.message);
    assert_eq!(h.client.actions(), vec!["build solar".to_string()]);
    assert_eq!(h.client.snapshot().mine_levels.solar_plant, 2);

    println!("✅ Energy deficit recovery test passed");
}

#[tokio::test]
async fn test_unaffordable_storage_blocks_mines() {
    let world = SimulatedWorld {
        resources: ResourceState { metal: 0, crystal: 9_200, deuterium: 0, energy: 0 },
        ..SimulatedWorld::default()
    };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    assert_eq!(outcome.result.message, "Insufficient resources: missing 1000 metal");
    assert!(h.client.actions().is_empty(), "No mine is built while storage is pending");

    println!("✅ Unaffordable storage test passed");
}

#[tokio::test]
async fn test_saving_for_cheapest_return_is_reported() {
    let world = SimulatedWorld { resources: ResourceState::default(), ..SimulatedWorld::default() };
    let h = synced(world).await;

    let outcome = h.policy.run().await;
    assert!(!outcome.result.success);
    let message = &outcome.result.message;
    assert!(message.starts_with("Saving for metal level 1 (ROI: 2.5h)"), "Unexpected message: {}", message);
    assert!(message.contains("missing 60 metal, 15 crystal, 11 energy"), "Shortfall should be reported: {}", message);
    assert!(h.client.actions().is_empty());

    println!("✅ Saving for upgrade test passed");
}
