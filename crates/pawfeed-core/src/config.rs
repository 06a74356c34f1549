use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

// Feeder timing constants, shared across the scheduled and manual feed paths
pub const FEED_TIMEOUT_SECONDS: u64 = 60; // cooldown before another trigger may fire
pub const DISPENSE_SECS_PER_UNIT: u64 = 3; // motor run time per unit of feed size
pub const MAX_DISPLAY_FEEDS: usize = 3; // upcoming/past entries shown per pane

pub const DEFAULT_PORT: u16 = 8090;
pub const DEFAULT_BIND: &str = "127.0.0.1";

/// Top-level config (pawfeed.toml + PAWFEED_* env overrides).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PawfeedConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub hardware: HardwareConfig,
    #[serde(default)]
    pub tasks: TaskConfig,
}

impl Default for PawfeedConfig {
    fn default() -> Self {
        Self {
            gateway: GatewayConfig::default(),
            database: DatabaseConfig::default(),
            hardware: HardwareConfig::default(),
            tasks: TaskConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Which peripherals this install actually has attached.
///
/// A disabled (or failed) peripheral degrades its feature: the scheduler
/// and the other peripherals keep running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HardwareConfig {
    #[serde(default = "bool_true")]
    pub display: bool,
    #[serde(default = "bool_true")]
    pub dispenser: bool,
    #[serde(default)]
    pub hopper: bool,
}

impl Default for HardwareConfig {
    fn default() -> Self {
        Self {
            display: true,
            dispenser: true,
            hopper: false,
        }
    }
}

/// Background task rates, in seconds (tick resolution in milliseconds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskConfig {
    #[serde(default = "default_feed_poll_secs")]
    pub feed_poll_secs: u64,
    #[serde(default = "default_display_refresh_secs")]
    pub display_refresh_secs: u64,
    #[serde(default = "default_pane_rotate_secs")]
    pub pane_rotate_secs: u64,
    #[serde(default = "default_hopper_poll_secs")]
    pub hopper_poll_secs: u64,
    #[serde(default = "default_feed_timeout_secs")]
    pub feed_timeout_secs: u64,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            feed_poll_secs: default_feed_poll_secs(),
            display_refresh_secs: default_display_refresh_secs(),
            pane_rotate_secs: default_pane_rotate_secs(),
            hopper_poll_secs: default_hopper_poll_secs(),
            feed_timeout_secs: default_feed_timeout_secs(),
            tick_ms: default_tick_ms(),
        }
    }
}

fn bool_true() -> bool {
    true
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_db_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.pawfeed/pawfeed.db", home)
}
fn default_feed_poll_secs() -> u64 {
    15
}
fn default_display_refresh_secs() -> u64 {
    10
}
fn default_pane_rotate_secs() -> u64 {
    20
}
fn default_hopper_poll_secs() -> u64 {
    30
}
fn default_feed_timeout_secs() -> u64 {
    FEED_TIMEOUT_SECONDS
}
fn default_tick_ms() -> u64 {
    1_000
}

impl PawfeedConfig {
    /// Load config from a TOML file with PAWFEED_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.pawfeed/pawfeed.toml
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        let config: PawfeedConfig = Figment::new()
            .merge(Toml::file(&path))
            .merge(Env::prefixed("PAWFEED_").split("_"))
            .extract()
            .map_err(|e| crate::error::PawfeedError::Config(e.to_string()))?;

        Ok(config)
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.pawfeed/pawfeed.toml", home)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_rates() {
        let cfg = PawfeedConfig::default();
        assert_eq!(cfg.tasks.feed_poll_secs, 15);
        assert_eq!(cfg.tasks.display_refresh_secs, 10);
        assert_eq!(cfg.tasks.pane_rotate_secs, 20);
        assert_eq!(cfg.tasks.feed_timeout_secs, 60);
        assert_eq!(cfg.tasks.tick_ms, 1_000);
        assert_eq!(cfg.gateway.port, DEFAULT_PORT);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: PawfeedConfig = Figment::new()
            .merge(figment::providers::Toml::string(
                r#"
                [gateway]
                port = 9000

                [tasks]
                feed_poll_secs = 5
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(cfg.gateway.port, 9000);
        assert_eq!(cfg.gateway.bind, DEFAULT_BIND);
        assert_eq!(cfg.tasks.feed_poll_secs, 5);
        assert_eq!(cfg.tasks.pane_rotate_secs, 20);
        assert!(cfg.hardware.display);
        assert!(!cfg.hardware.hopper);
    }
}
