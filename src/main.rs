// OGame Autopilot - Main Entry Point

use clap::{ArgAction, Parser, Subcommand};
use ogame_autopilot::expansion::ExpansionPolicy;
use ogame_autopilot::mines::{decide_next_upgrade, determine_storage_needed};
use ogame_autopilot::{game, Autopilot, ConfigManager, GameClient, SimulatedClient, SimulatedWorld, DEFAULT_CONFIG_PATH};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ogame_autopilot", about = "Economic and expansion autopilot for OGame")]
struct Cli {
    /// Path of the TOML configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    /// -v for debug output, -vv for trace
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the scheduler against a simulated world until Ctrl+C
    Run {
        /// JSON world snapshot; a fresh homeworld when omitted
        #[arg(long = "world")]
        world_file: Option<String>,
    },
    /// Print the mine and storage recommendation for a world snapshot
    Advise {
        #[arg(long = "world")]
        world_file: Option<String>,
    },
    /// Scan around the homeworld and print colonization targets
    Expansion {
        #[arg(long = "world")]
        world_file: Option<String>,
    },
    /// List the configured tasks
    Tasks,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_target(false)
        .init();
}

fn load_world(path: Option<&str>) -> Result<SimulatedWorld, Box<dyn std::error::Error>> {
    match path {
        Some(path) => {
            info!("🌍 Loading world snapshot from {}", path);
            SimulatedWorld::load(path)
        }
        None => Ok(SimulatedWorld::default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { world_file } => run(&cli.config, world_file.as_deref()).await,
        Commands::Advise { world_file } => advise(&cli.config, world_file.as_deref()),
        Commands::Expansion { world_file } => expansion(&cli.config, world_file.as_deref()).await,
        Commands::Tasks => {
            let manager = ConfigManager::new(&cli.config)?;
            println!("📋 Configured tasks:");
            for task in manager.config().scheduler.tasks() {
                println!(
                    "  {} ({}) - {} every {} min",
                    task.id,
                    task.name,
                    if task.enabled { "enabled" } else { "disabled" },
                    task.interval_minutes
                );
            }
            Ok(())
        }
    }
}

async fn run(config_path: &str, world_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    info!("🚀 OGame Autopilot starting...");
    let mut manager = ConfigManager::new(config_path)?;
    let client = Arc::new(SimulatedClient::new(load_world(world_file)?));
    let autopilot = Autopilot::new(client.clone(), manager.config());

    if let Err(e) = autopilot.sync_now().await {
        warn!("⚠️  Initial data sync failed: {}", e);
    }
    if manager.config().scheduler.auto_start {
        autopilot.start();
    } else {
        info!("⏸️  Scheduler auto start disabled, tasks stay idle");
    }
    info!("⚠️  Running until Ctrl+C");

    let reload_every = std::time::Duration::from_secs(manager.config().timing.config_reload_interval_seconds.max(1));
    let mut reload_ticker = tokio::time::interval(reload_every);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("🛑 Ctrl+C received, stopping autopilot");
                break;
            }
            _ = reload_ticker.tick() => {
                if manager.check_and_reload() {
                    if let Err(e) = autopilot.apply_config(manager.config()).await {
                        warn!("⚠️  Could not apply reloaded configuration: {}", e);
                    }
                }
            }
        }
    }

    autopilot.stop();
    let status = autopilot.status();
    println!("📊 Final status:");
    for task in status.scheduler.tasks {
        println!(
            "  {} - last run: {}",
            task.id,
            task.last_run.map(|t| t.to_rfc3339()).unwrap_or_else(|| "never".to_string())
        );
    }
    println!("  data syncs: {}", status.data_sync.sync_count);
    for action in client.actions() {
        println!("  ✔️  {}", action);
    }
    Ok(())
}

fn advise(config_path: &str, world_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ConfigManager::new(config_path)?;
    let economy = manager.config().economy;
    let world = load_world(world_file)?;

    let balance = game::energy_balance(&world.mine_levels, economy.planet_max_temperature);
    println!("⚡ Energy: {} produced, {} consumed, balance {}", balance.production, balance.consumption, balance.balance);

    let storage = determine_storage_needed(&world.mine_levels, &world.storage_levels, &world.resources);
    if storage.needed {
        println!("🏚️  Storage first: {}", storage.reason);
    }

    let decision = decide_next_upgrade(&world.mine_levels, &world.resources, &economy);
    match decision.recommendation {
        Some(building) => println!("🎯 Build {}: {}", building, decision.reason),
        None => println!("⏳ Nothing to build: {}", decision.reason),
    }
    for alternative in &decision.alternatives {
        println!("   • {} - {}", alternative.building, alternative.reason);
    }
    Ok(())
}

async fn expansion(config_path: &str, world_file: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let manager = ConfigManager::new(config_path)?;
    let client: Arc<dyn GameClient> = Arc::new(SimulatedClient::new(load_world(world_file)?));
    let mut policy = ExpansionPolicy::new(client, manager.config().expansion.clone());

    let targets = policy.scan_and_get_targets().await?;
    println!("🔭 {} colonization targets", targets.len());
    for target in targets.iter().take(10) {
        println!(
            "  {} score {} fields {}-{} travel {}s",
            target.coordinates,
            target.score,
            target.estimated_field_range.min,
            target.estimated_field_range.max,
            target.travel_time_seconds
        );
    }

    let status = policy.status().await?;
    println!(
        "🔬 Astrophysics {} - colonies {}/{}",
        status.astrophysics.level, status.astrophysics.current_colonies, status.astrophysics.max_colonies
    );
    println!("🎯 Next action: {}", status.next_action.name());
    Ok(())
}
