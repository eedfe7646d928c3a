// Dashboard snapshot: everything presentation may read for one sample window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BandSummary, ClassifiedAggregate, FleetSummary, HealthStatus, StationView};

/// Named group of metric types with its fleet-wide aggregates and composed status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub name: String,
    pub status: HealthStatus,
    pub metrics: Vec<ClassifiedAggregate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated_at: DateTime<Utc>,
    pub sample_count: usize,
    pub overall: HealthStatus,
    pub categories: Vec<CategoryView>,
    pub stations: Vec<StationView>,
    pub bands: Vec<BandSummary>,
    pub fleet: FleetSummary,
}

impl DashboardSnapshot {
    /// Snapshot for "nothing read yet": no stations, no samples, everything healthy.
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            sample_count: 0,
            overall: HealthStatus::Healthy,
            categories: Vec::new(),
            stations: Vec::new(),
            bands: Vec::new(),
            fleet: FleetSummary {
                total: 0,
                active: 0,
                offline: 0,
                maintenance: 0,
                healthy_active: 0,
                worst_station_status: HealthStatus::Healthy,
                status: HealthStatus::Healthy,
            },
        }
    }

    pub fn station(&self, id: &str) -> Option<&StationView> {
        self.stations.iter().find(|s| s.id == id)
    }

    pub fn category(&self, name: &str) -> Option<&CategoryView> {
        self.categories.iter().find(|c| c.name == name)
    }
}
