// Shared test helpers
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use stationhealth::models::*;

/// 2024-03-01T00:00:00Z
pub const DAY0_MS: i64 = 1_709_251_200_000;
pub const HOUR_MS: i64 = 3_600_000;

pub fn ts(ms: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(ms).unwrap()
}

pub fn sample(
    id: i64,
    station_id: &str,
    metric_type: MetricType,
    value: f64,
    ts_ms: i64,
) -> Sample {
    Sample {
        id,
        station_id: station_id.to_string(),
        metric_type,
        value,
        timestamp: Some(ts(ts_ms)),
        unit: None,
    }
}

pub fn untimestamped(id: i64, station_id: &str, metric_type: MetricType, value: f64) -> Sample {
    Sample {
        id,
        station_id: station_id.to_string(),
        metric_type,
        value,
        timestamp: None,
        unit: None,
    }
}

pub fn station(id: &str, lifecycle: LifecycleStatus) -> Station {
    Station {
        id: id.to_string(),
        name: format!("Station {}", id),
        location: "Test site".to_string(),
        lifecycle,
    }
}

/// One healthy reading for every metric a station view reads (NR, LTE, latency, tx imbalance).
pub fn healthy_station_samples(station_id: &str, first_id: i64, ts_ms: i64) -> Vec<Sample> {
    let values = [
        (MetricType::NrDlThroughput, 800.0),
        (MetricType::NrUlThroughput, 150.0),
        (MetricType::NrRsrp, -80.0),
        (MetricType::NrSinr, 20.0),
        (MetricType::LteDlThroughput, 120.0),
        (MetricType::LteUlThroughput, 40.0),
        (MetricType::Latency, 10.0),
        (MetricType::TxImbalance, 1.0),
    ];
    values
        .iter()
        .enumerate()
        .map(|(i, (m, v))| sample(first_id + i as i64, station_id, *m, *v, ts_ms))
        .collect()
}

/// One healthy reading for every system-category metric.
pub fn healthy_system_samples(station_id: &str, first_id: i64, ts_ms: i64) -> Vec<Sample> {
    let values = [
        (MetricType::CpuLoad, 30.0),
        (MetricType::MemoryLoad, 40.0),
        (MetricType::Temperature, 45.0),
        (MetricType::PowerDraw, 2000.0),
        (MetricType::Uptime, 99.99),
    ];
    values
        .iter()
        .enumerate()
        .map(|(i, (m, v))| sample(first_id + i as i64, station_id, *m, *v, ts_ms))
        .collect()
}
