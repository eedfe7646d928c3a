use std::collections::BTreeMap;

use serde::Deserialize;

use crate::models::MetricType;
use crate::pipeline::threshold::{PopulationScope, ThresholdRule};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Per-metric / per-population rule overrides on top of the built-in table.
    #[serde(default)]
    pub thresholds: ThresholdsConfig,
    /// Per-metric value used when a station reported nothing in the window.
    #[serde(default)]
    pub missing_defaults: BTreeMap<MetricType, f64>,
    /// Per-metric scale applied to daily trend averages.
    #[serde(default)]
    pub unit_conversions: BTreeMap<MetricType, f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Slow cadence: stations, historical window and daily trends.
    #[serde(default = "default_historical_interval_secs")]
    pub historical_interval_secs: u64,
    #[serde(default = "default_historical_window_hours")]
    pub historical_window_hours: u32,
    /// Row cap for the historical read.
    #[serde(default = "default_historical_limit")]
    pub historical_limit: u32,
    /// Fast cadence: live look-ahead window only.
    #[serde(default = "default_live_interval_ms")]
    pub live_interval_ms: u64,
    #[serde(default = "default_live_window_secs")]
    pub live_window_secs: u32,
    #[serde(default = "default_live_limit")]
    pub live_limit: u32,
    /// Take daily trends from the source's pre-aggregates instead of bucketing in-process.
    #[serde(default)]
    pub use_source_daily_aggregates: bool,
    /// How often to log app stats (ws clients, refresh counts) at INFO level.
    #[serde(default = "default_stats_log_interval_secs")]
    pub stats_log_interval_secs: u64,
}

fn default_historical_interval_secs() -> u64 {
    300
}

fn default_historical_window_hours() -> u32 {
    24 * 7
}

fn default_historical_limit() -> u32 {
    50_000
}

fn default_live_interval_ms() -> u64 {
    5_000
}

fn default_live_window_secs() -> u32 {
    120
}

fn default_live_limit() -> u32 {
    2_000
}

fn default_stats_log_interval_secs() -> u64 {
    60
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            historical_interval_secs: default_historical_interval_secs(),
            historical_window_hours: default_historical_window_hours(),
            historical_limit: default_historical_limit(),
            live_interval_ms: default_live_interval_ms(),
            live_window_secs: default_live_window_secs(),
            live_limit: default_live_limit(),
            use_source_daily_aggregates: false,
            stats_log_interval_secs: default_stats_log_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportingConfig {
    /// Offset from UTC, in minutes, of the timezone daily trends are cut in.
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default)]
    pub metrics: BTreeMap<MetricType, ThresholdRule>,
    #[serde(default)]
    pub populations: BTreeMap<PopulationScope, ThresholdRule>,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.refresh.historical_interval_secs > 0,
            "refresh.historical_interval_secs must be > 0, got {}",
            self.refresh.historical_interval_secs
        );
        anyhow::ensure!(
            self.refresh.historical_window_hours > 0,
            "refresh.historical_window_hours must be > 0, got {}",
            self.refresh.historical_window_hours
        );
        anyhow::ensure!(
            self.refresh.historical_limit > 0,
            "refresh.historical_limit must be > 0, got {}",
            self.refresh.historical_limit
        );
        anyhow::ensure!(
            self.refresh.live_interval_ms > 0,
            "refresh.live_interval_ms must be > 0, got {}",
            self.refresh.live_interval_ms
        );
        anyhow::ensure!(
            self.refresh.live_window_secs > 0,
            "refresh.live_window_secs must be > 0, got {}",
            self.refresh.live_window_secs
        );
        anyhow::ensure!(
            self.refresh.live_limit > 0,
            "refresh.live_limit must be > 0, got {}",
            self.refresh.live_limit
        );
        anyhow::ensure!(
            self.refresh.stats_log_interval_secs > 0,
            "refresh.stats_log_interval_secs must be > 0, got {}",
            self.refresh.stats_log_interval_secs
        );
        anyhow::ensure!(
            (-1439..=1439).contains(&self.reporting.utc_offset_minutes),
            "reporting.utc_offset_minutes must be within +/-1439, got {}",
            self.reporting.utc_offset_minutes
        );
        for (metric_type, value) in &self.missing_defaults {
            anyhow::ensure!(
                *metric_type != MetricType::Unknown,
                "missing_defaults contains an unknown metric type"
            );
            anyhow::ensure!(
                value.is_finite(),
                "missing_defaults.{} must be finite, got {}",
                metric_type,
                value
            );
        }
        crate::catalog::Catalog::from_config(self)?;
        Ok(())
    }
}
