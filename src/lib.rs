// OGame Autopilot Library
// Economic and expansion policies driven by a recurring task scheduler

pub mod models;
pub mod error;
pub mod game;
pub mod mines;
pub mod expansion;
pub mod client;
pub mod data_sync;
pub mod scheduler;
pub mod autopilot;
pub mod config;

pub use autopilot::{Autopilot, AutopilotStatus};
pub use client::{DataFeed, GameClient, SimulatedClient, SimulatedWorld};
pub use config::{AutopilotConfig, ConfigManager};
pub use error::BotError;
pub use models::{TaskOutcome, TaskResult};

pub const DEFAULT_CONFIG_PATH: &str = "config/autopilot.toml";
