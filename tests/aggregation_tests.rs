// Grouped statistics over a merged sample set

mod common;

use common::{DAY0_MS, sample, untimestamped};
use std::collections::BTreeMap;
use stationhealth::models::{AggregateKey, MetricType, Sample};
use stationhealth::pipeline::threshold::{Direction, ThresholdRule};
use stationhealth::pipeline::{GroupBy, ThresholdTable, aggregate};

#[test]
fn test_aggregate_sum_count_min_max_average() {
    let samples: Vec<Sample> = [1.0, 2.0, 3.0, 4.0]
        .iter()
        .enumerate()
        .map(|(i, v)| sample(i as i64, "bs-1", MetricType::CpuLoad, *v, DAY0_MS + i as i64))
        .collect();
    let out = aggregate(&samples, GroupBy::Station, &ThresholdTable::default());
    let agg = &out[&AggregateKey::station("bs-1", MetricType::CpuLoad)];
    assert_eq!(agg.sum, 10.0);
    assert_eq!(agg.count, 4);
    assert_eq!(agg.min, 1.0);
    assert_eq!(agg.max, 4.0);
    assert_eq!(agg.average, 2.5);
    assert_eq!(agg.current, 4.0);
}

#[test]
fn test_aggregate_current_is_latest_by_timestamp_not_by_order() {
    let samples = vec![
        sample(1, "bs-1", MetricType::Latency, 30.0, DAY0_MS + 5_000),
        sample(2, "bs-1", MetricType::Latency, 10.0, DAY0_MS),
        sample(3, "bs-1", MetricType::Latency, 20.0, DAY0_MS + 1_000),
    ];
    let out = aggregate(&samples, GroupBy::Station, &ThresholdTable::default());
    let agg = &out[&AggregateKey::station("bs-1", MetricType::Latency)];
    assert_eq!(agg.current, 30.0);
    assert_eq!(
        agg.current_timestamp.map(|t| t.timestamp_millis()),
        Some(DAY0_MS + 5_000)
    );
}

#[test]
fn test_aggregate_unknown_metric_type_is_excluded() {
    let samples = vec![
        sample(1, "bs-1", MetricType::Unknown, 1.0, DAY0_MS),
        sample(2, "bs-1", MetricType::CpuLoad, 50.0, DAY0_MS),
    ];
    let out = aggregate(&samples, GroupBy::Fleet, &ThresholdTable::default());
    assert_eq!(out.len(), 1);
    assert!(!out.contains_key(&AggregateKey::fleet(MetricType::Unknown)));
}

#[test]
fn test_aggregate_only_catalogued_types_are_emitted() {
    let table = ThresholdTable::from_rules(BTreeMap::from([(
        MetricType::CpuLoad,
        ThresholdRule::Banded {
            direction: Direction::LowerIsBetter,
            good: 70.0,
            warn: 90.0,
        },
    )]));
    let samples = vec![
        sample(1, "bs-1", MetricType::CpuLoad, 1.0, DAY0_MS),
        sample(2, "bs-1", MetricType::Latency, 2.0, DAY0_MS),
    ];
    let out = aggregate(&samples, GroupBy::Station, &table);
    let keys: Vec<_> = out.keys().cloned().collect();
    assert_eq!(keys, vec![AggregateKey::station("bs-1", MetricType::CpuLoad)]);
}

#[test]
fn test_aggregate_group_by_station_and_fleet() {
    let samples = vec![
        sample(1, "bs-1", MetricType::CpuLoad, 10.0, DAY0_MS),
        sample(2, "bs-2", MetricType::CpuLoad, 30.0, DAY0_MS + 1),
        sample(3, "bs-2", MetricType::CpuLoad, 50.0, DAY0_MS + 2),
    ];
    let table = ThresholdTable::default();

    let per_station = aggregate(&samples, GroupBy::Station, &table);
    assert_eq!(per_station.len(), 2);
    assert_eq!(
        per_station[&AggregateKey::station("bs-2", MetricType::CpuLoad)].average,
        40.0
    );

    let fleet = aggregate(&samples, GroupBy::Fleet, &table);
    let agg = &fleet[&AggregateKey::fleet(MetricType::CpuLoad)];
    assert_eq!(agg.count, 3);
    assert_eq!(agg.average, 30.0);
    assert_eq!(agg.current, 50.0);
    assert_eq!(agg.station_id, None);
}

#[test]
fn test_aggregate_untimestamped_samples_count_toward_statistics() {
    let samples = vec![
        sample(1, "bs-1", MetricType::CpuLoad, 10.0, DAY0_MS),
        untimestamped(2, "bs-1", MetricType::CpuLoad, 90.0),
    ];
    let out = aggregate(&samples, GroupBy::Station, &ThresholdTable::default());
    let agg = &out[&AggregateKey::station("bs-1", MetricType::CpuLoad)];
    assert_eq!(agg.count, 2);
    assert_eq!(agg.average, 50.0);
    assert_eq!(agg.current, 10.0);
}

#[test]
fn test_aggregate_empty_input_yields_nothing() {
    let out = aggregate(&Vec::<Sample>::new(), GroupBy::Fleet, &ThresholdTable::default());
    assert!(out.is_empty());
}
