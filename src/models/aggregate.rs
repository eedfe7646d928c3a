// Per-(station, metric type) statistics over one sample window

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{HealthStatus, MetricType};

/// Grouping key. `station_id` is `None` for fleet-wide aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateKey {
    pub station_id: Option<String>,
    pub metric_type: MetricType,
}

impl AggregateKey {
    pub fn station(station_id: impl Into<String>, metric_type: MetricType) -> Self {
        Self {
            station_id: Some(station_id.into()),
            metric_type,
        }
    }

    pub fn fleet(metric_type: MetricType) -> Self {
        Self {
            station_id: None,
            metric_type,
        }
    }
}

/// sum/count/min/max plus `current` (value of the latest-timestamped sample).
/// Only ever built from at least one sample, so `count >= 1` and `average` is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricAggregate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station_id: Option<String>,
    pub metric_type: MetricType,
    pub sum: f64,
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub current: f64,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub current_timestamp: Option<DateTime<Utc>>,
}

impl MetricAggregate {
    pub fn key(&self) -> AggregateKey {
        AggregateKey {
            station_id: self.station_id.clone(),
            metric_type: self.metric_type,
        }
    }
}

/// An aggregate together with the status its classified value produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedAggregate {
    #[serde(flatten)]
    pub aggregate: MetricAggregate,
    pub status: HealthStatus,
}
