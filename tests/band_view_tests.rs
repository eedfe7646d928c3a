// Station band views, band summaries and fleet summary

mod common;

use common::{DAY0_MS, healthy_station_samples, sample, station};
use stationhealth::catalog::Catalog;
use stationhealth::models::{
    BandId, HealthStatus, LifecycleStatus, MetricType, Sample, Station, StationView,
};
use stationhealth::pipeline::{
    GroupBy, aggregate, build_station_view, summarize_bands, summarize_fleet,
};

fn views_for(stations: &[Station], samples: &[Sample]) -> Vec<StationView> {
    let catalog = Catalog::default();
    let per_station = aggregate(samples, GroupBy::Station, &catalog.thresholds);
    stations
        .iter()
        .map(|s| build_station_view(s, &per_station, &catalog))
        .collect()
}

#[test]
fn test_station_with_full_data_is_healthy() {
    let views = views_for(
        &[station("bs-1", LifecycleStatus::Active)],
        &healthy_station_samples("bs-1", 1, DAY0_MS),
    );
    let view = &views[0];
    assert_eq!(view.status, HealthStatus::Healthy);
    let nr = view.band(BandId::Nr).unwrap();
    assert_eq!(nr.downlink.current, 800.0);
    assert!(!nr.downlink.defaulted);
    assert!(nr.signal_power.is_some());
    let lte = view.band(BandId::Lte).unwrap();
    assert!(lte.signal_power.is_none());
    assert!(lte.signal_quality.is_none());
}

#[test]
fn test_missing_lte_data_defaults_to_zero_and_critical() {
    let samples: Vec<_> = healthy_station_samples("bs-1", 1, DAY0_MS)
        .into_iter()
        .filter(|s| {
            !matches!(
                s.metric_type,
                MetricType::LteDlThroughput | MetricType::LteUlThroughput
            )
        })
        .collect();
    let views = views_for(&[station("bs-1", LifecycleStatus::Active)], &samples);
    let view = &views[0];
    let lte = view.band(BandId::Lte).unwrap();
    assert_eq!(lte.downlink.current, 0.0);
    assert!(lte.downlink.defaulted);
    assert_eq!(lte.status, HealthStatus::Critical);
    assert_eq!(view.band(BandId::Nr).unwrap().status, HealthStatus::Healthy);
    assert_eq!(view.status, HealthStatus::Critical);
}

#[test]
fn test_station_with_no_samples_is_critical_everywhere() {
    let views = views_for(&[station("bs-9", LifecycleStatus::Active)], &[]);
    let view = &views[0];
    assert_eq!(view.latency.current, 1000.0);
    assert_eq!(view.tx_imbalance.current, 99.0);
    assert!(view.bands.iter().all(|b| b.status == HealthStatus::Critical));
    assert_eq!(view.status, HealthStatus::Critical);
}

#[test]
fn test_station_fields_classify_on_current_value() {
    let mut samples = healthy_station_samples("bs-1", 1, DAY0_MS);
    // average 35 (warning), latest 10 (healthy)
    samples.push(sample(100, "bs-1", MetricType::Latency, 60.0, DAY0_MS - 1_000));
    let views = views_for(&[station("bs-1", LifecycleStatus::Active)], &samples);
    let latency = &views[0].latency;
    assert_eq!(latency.current, 10.0);
    assert_eq!(latency.average, 35.0);
    assert_eq!(latency.status, HealthStatus::Healthy);
}

#[test]
fn test_band_summary_counts_active_stations_only() {
    let stations = [
        station("bs-1", LifecycleStatus::Active),
        station("bs-2", LifecycleStatus::Active),
        station("bs-3", LifecycleStatus::Offline),
        station("bs-4", LifecycleStatus::Maintenance),
    ];
    let mut samples = healthy_station_samples("bs-1", 1, DAY0_MS);
    samples.extend(healthy_station_samples("bs-3", 100, DAY0_MS));
    let views = views_for(&stations, &samples);
    let catalog = Catalog::default();
    let summaries = summarize_bands(&views, &catalog.bands, &catalog.thresholds);
    assert_eq!(summaries.len(), 2);

    let nr = summaries.iter().find(|b| b.band == BandId::Nr).unwrap();
    assert_eq!(nr.active_stations, 2);
    assert_eq!(nr.healthy_stations, 1);
    // bs-1 800 + bs-2 defaulted 0
    assert_eq!(nr.avg_downlink, 400.0);
    // 1/2 = 0.5 -> warning under the built-in cell cutoffs
    assert_eq!(nr.status, HealthStatus::Warning);
}

#[test]
fn test_band_summary_with_no_active_stations_is_healthy() {
    let views = views_for(&[station("bs-1", LifecycleStatus::Offline)], &[]);
    let catalog = Catalog::default();
    let summaries = summarize_bands(&views, &catalog.bands, &catalog.thresholds);
    for s in summaries {
        assert_eq!(s.active_stations, 0);
        assert_eq!(s.avg_downlink, 0.0);
        assert_eq!(s.status, HealthStatus::Healthy);
    }
}

#[test]
fn test_fleet_summary_inventory_and_health() {
    let stations = [
        station("bs-1", LifecycleStatus::Active),
        station("bs-2", LifecycleStatus::Active),
        station("bs-3", LifecycleStatus::Offline),
        station("bs-4", LifecycleStatus::Maintenance),
    ];
    let mut samples = healthy_station_samples("bs-1", 1, DAY0_MS);
    samples.extend(healthy_station_samples("bs-2", 100, DAY0_MS));
    let views = views_for(&stations, &samples);
    let fleet = summarize_fleet(&views, &Catalog::default().thresholds);
    assert_eq!(fleet.total, 4);
    assert_eq!(fleet.active, 2);
    assert_eq!(fleet.offline, 1);
    assert_eq!(fleet.maintenance, 1);
    assert_eq!(fleet.healthy_active, 2);
    // bs-3/bs-4 have no data and are critical, but are not active
    assert_eq!(fleet.worst_station_status, HealthStatus::Healthy);
    assert_eq!(fleet.status, HealthStatus::Healthy);
}
