use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub reclaimer: ReclaimerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReclaimerConfig {
    /// Inclusive age threshold, in minutes, after which a pending
    /// stock-holding booking becomes eligible for expiry.
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
    /// How often the background worker runs.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Destination of the durable, append-only run log.
    #[serde(default = "default_log_path")]
    pub log_path: String,
}

fn default_ttl_minutes() -> i64 {
    15
}

fn default_interval_seconds() -> u64 {
    300
}

fn default_log_path() -> String {
    "logs/reclaimer.log".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Layer the current environment's file on top (optional)
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in to git
            .add_source(config::File::with_name("config/local").required(false))
            // Environment variables win, e.g. ZENLINK_RECLAIMER__TTL_MINUTES=30
            .add_source(config::Environment::with_prefix("ZENLINK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
