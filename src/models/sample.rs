// Raw measurement sample and the metric type enumeration

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type SampleId = i64;

/// Metric types reported by base stations. Serializes to snake_case wire names
/// (e.g. "nr_dl_throughput"); unrecognised names deserialize to `Unknown`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    CpuLoad,
    MemoryLoad,
    Temperature,
    PowerDraw,
    Uptime,
    NrDlThroughput,
    NrUlThroughput,
    NrRsrp,
    NrSinr,
    LteDlThroughput,
    LteUlThroughput,
    Latency,
    TxImbalance,
    #[serde(other)]
    Unknown,
}

impl MetricType {
    /// Every known metric type (excludes `Unknown`).
    pub const ALL: [MetricType; 13] = [
        MetricType::CpuLoad,
        MetricType::MemoryLoad,
        MetricType::Temperature,
        MetricType::PowerDraw,
        MetricType::Uptime,
        MetricType::NrDlThroughput,
        MetricType::NrUlThroughput,
        MetricType::NrRsrp,
        MetricType::NrSinr,
        MetricType::LteDlThroughput,
        MetricType::LteUlThroughput,
        MetricType::Latency,
        MetricType::TxImbalance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::CpuLoad => "cpu_load",
            MetricType::MemoryLoad => "memory_load",
            MetricType::Temperature => "temperature",
            MetricType::PowerDraw => "power_draw",
            MetricType::Uptime => "uptime",
            MetricType::NrDlThroughput => "nr_dl_throughput",
            MetricType::NrUlThroughput => "nr_ul_throughput",
            MetricType::NrRsrp => "nr_rsrp",
            MetricType::NrSinr => "nr_sinr",
            MetricType::LteDlThroughput => "lte_dl_throughput",
            MetricType::LteUlThroughput => "lte_ul_throughput",
            MetricType::Latency => "latency",
            MetricType::TxImbalance => "tx_imbalance",
            MetricType::Unknown => "unknown",
        }
    }

    /// Parse a stored or upstream wire name. Never fails: anything unrecognised is `Unknown`.
    pub fn from_wire(s: &str) -> Self {
        s.parse().unwrap_or(MetricType::Unknown)
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown metric type: {0:?}")]
pub struct ParseMetricTypeError(pub String);

impl FromStr for MetricType {
    type Err = ParseMetricTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        MetricType::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == normalized)
            .ok_or_else(|| ParseMetricTypeError(s.to_string()))
    }
}

/// One timestamped measurement. `timestamp` is epoch millis on the wire; samples
/// without one are aggregated but never become `current` and are not bucketed by day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sample {
    pub id: SampleId,
    pub station_id: String,
    pub metric_type: MetricType,
    pub value: f64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}
