use crate::data_sync::DataSyncConfig;
use crate::expansion::scanner::MAX_SCAN_RADIUS;
use crate::expansion::ExpansionConfig;
use crate::game::Economy;
use crate::scheduler::{ScheduledTask, TaskId};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::SystemTime;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutopilotConfig {
    pub scheduler: SchedulerConfig,
    pub data_sync: DataSyncConfig,
    pub economy: Economy,
    pub expansion: ExpansionConfig,
    pub timing: TimingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Start the scheduler as soon as the autopilot is up
    pub auto_start: bool,
    /// Seconds added to an in-game wait before the task runs again
    pub wait_margin_seconds: u64,
    pub maximize_mines: TaskConfig,
    pub expansion_policy: TaskConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    pub enabled: bool,
    pub interval_minutes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// Config hot-reload check interval in seconds
    pub config_reload_interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            wait_margin_seconds: 10,
            maximize_mines: TaskConfig { enabled: false, interval_minutes: 1 },
            expansion_policy: TaskConfig { enabled: false, interval_minutes: 30 },
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self { config_reload_interval_seconds: 30 }
    }
}

impl Default for AutopilotConfig {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            data_sync: DataSyncConfig::default(),
            economy: Economy::default(),
            expansion: ExpansionConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

impl SchedulerConfig {
    pub fn task_config(&self, id: TaskId) -> TaskConfig {
        match id {
            TaskId::MaximizeMines => self.maximize_mines,
            TaskId::ExpansionPolicy => self.expansion_policy,
        }
    }

    /// Initial task table built from these settings.
    pub fn tasks(&self) -> Vec<ScheduledTask> {
        TaskId::ALL
            .into_iter()
            .map(|id| {
                let settings = self.task_config(id);
                ScheduledTask::new(id, settings.enabled, settings.interval_minutes)
            })
            .collect()
    }
}

impl AutopilotConfig {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load_or_create(config_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        if Path::new(config_path).exists() {
            info!("📋 Loading configuration from {}", config_path);
            let config_str = fs::read_to_string(config_path)?;
            let config: AutopilotConfig = toml::from_str(&config_str)?;
            Ok(config)
        } else {
            info!("📋 Creating default configuration at {}", config_path);
            let config = AutopilotConfig::default();
            config.save(config_path)?;
            info!("💡 Edit {} to customize autopilot behavior", config_path);
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save(&self, config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(parent) = Path::new(config_path).parent() {
            fs::create_dir_all(parent)?;
        }

        let config_str = toml::to_string_pretty(self)?;
        fs::write(config_path, config_str)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), String> {
        for id in TaskId::ALL {
            if self.scheduler.task_config(id).interval_minutes == 0 {
                return Err(format!("{} interval_minutes must be greater than 0", id));
            }
        }
        if self.data_sync.interval_seconds == 0 {
            return Err("data_sync.interval_seconds must be greater than 0".to_string());
        }
        if self.economy.universe_speed <= 0.0 {
            return Err("economy.universe_speed must be positive".to_string());
        }
        if let Some(position) = self.expansion.preferred_positions.iter().find(|p| !(1..=15).contains(*p)) {
            return Err(format!("expansion.preferred_positions contains {}, positions are 1-15", position));
        }
        if self.expansion.scan_radius > MAX_SCAN_RADIUS {
            return Err(format!("expansion.scan_radius must be at most {}", MAX_SCAN_RADIUS));
        }

        info!("✅ Configuration validation passed");
        Ok(())
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        info!("📋 Configuration Summary:");
        for id in TaskId::ALL {
            let task = self.scheduler.task_config(id);
            info!(
                "   ⏰ {}: {} every {} min",
                id,
                if task.enabled { "enabled" } else { "disabled" },
                task.interval_minutes
            );
        }
        info!(
            "   🔄 Data sync: {} every {}s (max age {}s)",
            if self.data_sync.enabled { "on" } else { "off" },
            self.data_sync.interval_seconds,
            self.data_sync.max_age_seconds
        );
        info!("   🌌 Universe speed: x{}", self.economy.universe_speed);
        info!(
            "   🪐 Expansion: radius {} systems, preferred {:?}",
            self.expansion.scan_radius, self.expansion.preferred_positions
        );
        info!("   🔄 Config reload: {}s", self.timing.config_reload_interval_seconds);
    }

    /// Top-level sections that differ from `other`, in file order.
    pub fn changed_sections(&self, other: &AutopilotConfig) -> Vec<&'static str> {
        let mut sections = Vec::new();
        if self.scheduler != other.scheduler {
            sections.push("scheduler");
        }
        if self.data_sync != other.data_sync {
            sections.push("data_sync");
        }
        if self.economy != other.economy {
            sections.push("economy");
        }
        if self.expansion != other.expansion {
            sections.push("expansion");
        }
        if self.timing != other.timing {
            sections.push("timing");
        }
        sections
    }
}

/// Watches the autopilot config file and swaps in valid edits while running.
#[derive(Debug)]
pub struct ConfigManager {
    config: AutopilotConfig,
    path: String,
    file_stamp: Option<SystemTime>,
    next_check: SystemTime,
}

impl ConfigManager {
    pub fn new(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config = AutopilotConfig::load_or_create(path)?;
        config.validate()?;
        config.print_summary();

        Ok(Self {
            config,
            path: path.to_string(),
            file_stamp: file_stamp(path),
            next_check: SystemTime::now(),
        })
    }

    pub fn config(&self) -> &AutopilotConfig {
        &self.config
    }

    /// Re-read the file when its modification time moved. Returns true only
    /// when the running autopilot has something new to apply.
    pub fn check_and_reload(&mut self) -> bool {
        let now = SystemTime::now();
        if now < self.next_check {
            return false;
        }
        self.next_check = now + std::time::Duration::from_secs(self.config.timing.config_reload_interval_seconds);

        match file_stamp(&self.path) {
            Some(stamp) if Some(stamp) != self.file_stamp => {
                self.file_stamp = Some(stamp);
                self.reload()
            }
            _ => false,
        }
    }

    fn reload(&mut self) -> bool {
        let candidate = match AutopilotConfig::load_or_create(&self.path) {
            Ok(config) => config,
            Err(e) => {
                warn!("⚠️  {} could not be parsed, autopilot keeps its settings: {}", self.path, e);
                return false;
            }
        };
        if let Err(e) = candidate.validate() {
            warn!("⚠️  Rejected edit to {}: {}", self.path, e);
            return false;
        }

        let sections = candidate.changed_sections(&self.config);
        if sections.is_empty() {
            debug!("📋 {} touched without effective changes", self.path);
            return false;
        }
        info!("🔄 Autopilot settings reloaded: {} changed", sections.join(", "));
        if sections.contains(&"economy") {
            info!("💡 Economy changes take effect after a restart");
        }
        self.config = candidate;
        true
    }
}

fn file_stamp(path: &str) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}
