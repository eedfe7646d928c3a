// Per-station multi-band view and the band/fleet summaries built from it

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{HealthStatus, LifecycleStatus, MetricType};

/// Radio band. NR carries signal metrics; LTE reports throughput only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandId {
    Nr,
    Lte,
}

impl fmt::Display for BandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BandId::Nr => "nr",
            BandId::Lte => "lte",
        })
    }
}

/// One field of a station view. `defaulted` is true when the window had no samples
/// for this metric and the missing-value table supplied both `current` and `average`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValue {
    pub metric_type: MetricType,
    pub current: f64,
    pub average: f64,
    pub defaulted: bool,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandRecord {
    pub band: BandId,
    pub downlink: FieldValue,
    pub uplink: FieldValue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_power: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<FieldValue>,
    pub status: HealthStatus,
}

impl BandRecord {
    pub fn fields(&self) -> impl Iterator<Item = &FieldValue> {
        [Some(&self.downlink), Some(&self.uplink)]
            .into_iter()
            .chain([self.signal_power.as_ref(), self.signal_quality.as_ref()])
            .flatten()
    }
}

/// Station ("cell") view: identity, one record per band, and station-wide fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationView {
    pub id: String,
    pub name: String,
    pub location: String,
    pub lifecycle: LifecycleStatus,
    pub bands: Vec<BandRecord>,
    pub latency: FieldValue,
    pub tx_imbalance: FieldValue,
    pub status: HealthStatus,
}

impl StationView {
    pub fn band(&self, band: BandId) -> Option<&BandRecord> {
        self.bands.iter().find(|b| b.band == band)
    }
}

/// Band performance over active stations only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BandSummary {
    pub band: BandId,
    pub active_stations: u32,
    pub healthy_stations: u32,
    pub avg_downlink: f64,
    pub avg_uplink: f64,
    pub status: HealthStatus,
}

/// Fleet inventory counts every station; health ratio counts active ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetSummary {
    pub total: u32,
    pub active: u32,
    pub offline: u32,
    pub maintenance: u32,
    pub healthy_active: u32,
    pub worst_station_status: HealthStatus,
    pub status: HealthStatus,
}
