// Daily trend series (chart-ready)

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::MetricType;

/// Average of one metric type over one local calendar day, after unit conversion.
/// `date` serializes as `yyyy-MM-dd`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySeriesPoint {
    pub date: NaiveDate,
    pub metric_type: MetricType,
    pub average: f64,
}

/// Day-level averages as a sample source may pre-compute them (raw units).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAggregateRow {
    pub date: NaiveDate,
    pub averages: BTreeMap<MetricType, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendSource {
    /// Bucketed in-process from the merged sample set.
    Bucketed,
    /// Taken from the sample source's daily pre-aggregates.
    PreAggregated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSnapshot {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub generated_at: DateTime<Utc>,
    pub source: TrendSource,
    pub points: Vec<DailySeriesPoint>,
}

impl TrendSnapshot {
    pub fn empty() -> Self {
        Self {
            generated_at: Utc::now(),
            source: TrendSource::Bucketed,
            points: Vec::new(),
        }
    }

    /// Points for one metric type, still ascending by date.
    pub fn series(&self, metric_type: MetricType) -> Vec<DailySeriesPoint> {
        self.points
            .iter()
            .filter(|p| p.metric_type == metric_type)
            .cloned()
            .collect()
    }
}
