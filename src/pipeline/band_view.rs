// Band view builder: per-station join of per-band aggregates into one record,
// plus band and fleet summaries over those records.

use std::collections::BTreeMap;

use super::compose::{count_healthy, worst_of};
use super::threshold::{PopulationScope, ThresholdTable};
use crate::catalog::Catalog;
use crate::models::{
    AggregateKey, BandId, BandRecord, BandSummary, FieldValue, FleetSummary, LifecycleStatus,
    MetricAggregate, MetricType, Station, StationView,
};

/// Which metric types feed which fields of one band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandDef {
    pub band: BandId,
    pub downlink: MetricType,
    pub uplink: MetricType,
    pub signal_power: Option<MetricType>,
    pub signal_quality: Option<MetricType>,
}

impl BandDef {
    /// NR reports throughput plus RSRP/SINR; LTE reports throughput only.
    pub fn builtin() -> Vec<BandDef> {
        vec![
            BandDef {
                band: BandId::Nr,
                downlink: MetricType::NrDlThroughput,
                uplink: MetricType::NrUlThroughput,
                signal_power: Some(MetricType::NrRsrp),
                signal_quality: Some(MetricType::NrSinr),
            },
            BandDef {
                band: BandId::Lte,
                downlink: MetricType::LteDlThroughput,
                uplink: MetricType::LteUlThroughput,
                signal_power: None,
                signal_quality: None,
            },
        ]
    }

    pub fn metrics(&self) -> impl Iterator<Item = MetricType> {
        [Some(self.downlink), Some(self.uplink)]
            .into_iter()
            .chain([self.signal_power, self.signal_quality])
            .flatten()
    }
}

/// Metric types attached once per station rather than per band.
pub const STATION_WIDE_METRICS: [MetricType; 2] = [MetricType::Latency, MetricType::TxImbalance];

/// Value substituted when a station reported nothing for a metric in the window.
/// Every built-in default classifies as critical under the built-in thresholds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MissingValueTable {
    overrides: BTreeMap<MetricType, f64>,
}

impl MissingValueTable {
    pub fn builtin(metric_type: MetricType) -> f64 {
        match metric_type {
            MetricType::NrDlThroughput
            | MetricType::NrUlThroughput
            | MetricType::LteDlThroughput
            | MetricType::LteUlThroughput => 0.0,
            MetricType::NrRsrp => -120.0,
            MetricType::NrSinr => -10.0,
            MetricType::Latency => 1000.0,
            MetricType::TxImbalance => 99.0,
            MetricType::CpuLoad | MetricType::MemoryLoad => 100.0,
            MetricType::Temperature => 120.0,
            MetricType::PowerDraw => 10_000.0,
            MetricType::Uptime => 0.0,
            MetricType::Unknown => 0.0,
        }
    }

    pub fn with_overrides(overrides: BTreeMap<MetricType, f64>) -> Self {
        Self { overrides }
    }

    pub fn value_for(&self, metric_type: MetricType) -> f64 {
        self.overrides
            .get(&metric_type)
            .copied()
            .unwrap_or_else(|| Self::builtin(metric_type))
    }
}

fn field(
    station_id: &str,
    metric_type: MetricType,
    aggregates: &BTreeMap<AggregateKey, MetricAggregate>,
    catalog: &Catalog,
) -> FieldValue {
    let (current, average, defaulted) =
        match aggregates.get(&AggregateKey::station(station_id, metric_type)) {
            Some(agg) => (agg.current, agg.average, false),
            None => {
                let v = catalog.missing.value_for(metric_type);
                (v, v, true)
            }
        };
    FieldValue {
        metric_type,
        current,
        average,
        defaulted,
        status: catalog.thresholds.classify(metric_type, current, None),
    }
}

fn band_record(
    station_id: &str,
    def: &BandDef,
    aggregates: &BTreeMap<AggregateKey, MetricAggregate>,
    catalog: &Catalog,
) -> BandRecord {
    let downlink = field(station_id, def.downlink, aggregates, catalog);
    let uplink = field(station_id, def.uplink, aggregates, catalog);
    let signal_power = def
        .signal_power
        .map(|m| field(station_id, m, aggregates, catalog));
    let signal_quality = def
        .signal_quality
        .map(|m| field(station_id, m, aggregates, catalog));
    let mut record = BandRecord {
        band: def.band,
        downlink,
        uplink,
        signal_power,
        signal_quality,
        status: Default::default(),
    };
    record.status = worst_of(record.fields().map(|f| f.status));
    record
}

/// Build the view for one station from per-station aggregates (`GroupBy::Station`).
/// Fields are classified on the aggregate's `current` value.
pub fn build_station_view(
    station: &Station,
    aggregates: &BTreeMap<AggregateKey, MetricAggregate>,
    catalog: &Catalog,
) -> StationView {
    let bands: Vec<BandRecord> = catalog
        .bands
        .iter()
        .map(|def| band_record(&station.id, def, aggregates, catalog))
        .collect();
    let latency = field(&station.id, MetricType::Latency, aggregates, catalog);
    let tx_imbalance = field(&station.id, MetricType::TxImbalance, aggregates, catalog);
    let status = worst_of(
        bands
            .iter()
            .map(|b| b.status)
            .chain([latency.status, tx_imbalance.status]),
    );
    StationView {
        id: station.id.clone(),
        name: station.name.clone(),
        location: station.location.clone(),
        lifecycle: station.lifecycle,
        bands,
        latency,
        tx_imbalance,
        status,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / (values.len() as f64)
}

/// Per-band performance over active stations only. Offline and maintenance
/// stations are left out of averages and health ratios.
pub fn summarize_bands(
    views: &[StationView],
    bands: &[BandDef],
    thresholds: &ThresholdTable,
) -> Vec<BandSummary> {
    bands
        .iter()
        .map(|def| {
            let records: Vec<&BandRecord> = views
                .iter()
                .filter(|v| v.lifecycle.is_active())
                .filter_map(|v| v.band(def.band))
                .collect();
            let active = records.len() as u32;
            let healthy = count_healthy(records.iter().map(|r| r.status));
            let downlinks: Vec<f64> = records.iter().map(|r| r.downlink.current).collect();
            let uplinks: Vec<f64> = records.iter().map(|r| r.uplink.current).collect();
            BandSummary {
                band: def.band,
                active_stations: active,
                healthy_stations: healthy,
                avg_downlink: mean(&downlinks),
                avg_uplink: mean(&uplinks),
                status: thresholds.classify_population(
                    PopulationScope::for_band(def.band),
                    healthy,
                    active,
                ),
            }
        })
        .collect()
}

/// Fleet inventory (all stations) and health ratio (active stations).
pub fn summarize_fleet(views: &[StationView], thresholds: &ThresholdTable) -> FleetSummary {
    let count = |l: LifecycleStatus| views.iter().filter(|v| v.lifecycle == l).count() as u32;
    let active_statuses: Vec<_> = views
        .iter()
        .filter(|v| v.lifecycle.is_active())
        .map(|v| v.status)
        .collect();
    let active = active_statuses.len() as u32;
    let healthy_active = count_healthy(active_statuses.iter().copied());
    FleetSummary {
        total: views.len() as u32,
        active,
        offline: count(LifecycleStatus::Offline),
        maintenance: count(LifecycleStatus::Maintenance),
        healthy_active,
        worst_station_status: worst_of(active_statuses.iter().copied()),
        status: thresholds.classify_population(PopulationScope::Fleet, healthy_active, active),
    }
}
