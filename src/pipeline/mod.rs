// Aggregation/classification pipeline. Pure functions over in-memory batches:
// merge -> aggregate -> classify -> compose, with band views and daily buckets
// alongside. Nothing here does I/O or keeps state between calls.

pub mod aggregate;
pub mod band_view;
pub mod compose;
pub mod daily;
pub mod merge;
pub mod threshold;

use std::collections::BTreeMap;

use chrono::Utc;

use crate::catalog::Catalog;
use crate::models::{
    AggregateKey, CategoryView, ClassifiedAggregate, DashboardSnapshot, MetricAggregate, Station,
    StationView,
};

pub use aggregate::{GroupBy, aggregate};
pub use band_view::{build_station_view, summarize_bands, summarize_fleet};
pub use compose::worst_of;
pub use daily::{bucket_by_day, flatten_daily_rows};
pub use merge::{MergedSampleSet, merge};
pub use threshold::{PopulationScope, RatioContext, ThresholdRule, ThresholdTable};

/// Category views from fleet-wide aggregates (`GroupBy::Fleet`). Metrics are
/// classified on their window average; a category with nothing reported is healthy.
pub fn categorize(
    fleet: &BTreeMap<AggregateKey, MetricAggregate>,
    catalog: &Catalog,
) -> Vec<CategoryView> {
    catalog
        .categories
        .iter()
        .map(|def| {
            let metrics: Vec<ClassifiedAggregate> = def
                .metrics
                .iter()
                .filter_map(|m| fleet.get(&AggregateKey::fleet(*m)))
                .map(|agg| ClassifiedAggregate {
                    status: catalog
                        .thresholds
                        .classify(agg.metric_type, agg.average, None),
                    aggregate: agg.clone(),
                })
                .collect();
            CategoryView {
                name: def.name.clone(),
                status: worst_of(metrics.iter().map(|m| m.status)),
                metrics,
            }
        })
        .collect()
}

/// Run the whole chain over one merged sample window.
///
/// Fleet-wide aggregates include every sample; station views are built only for
/// stations in `stations`, in directory order.
pub fn evaluate(
    stations: &[Station],
    samples: &MergedSampleSet,
    catalog: &Catalog,
) -> DashboardSnapshot {
    let fleet = aggregate(samples, GroupBy::Fleet, &catalog.thresholds);
    let per_station = aggregate(samples, GroupBy::Station, &catalog.thresholds);

    let categories = categorize(&fleet, catalog);
    let overall = worst_of(categories.iter().map(|c| c.status));

    let views: Vec<StationView> = stations
        .iter()
        .map(|s| build_station_view(s, &per_station, catalog))
        .collect();
    let bands = summarize_bands(&views, &catalog.bands, &catalog.thresholds);
    let fleet_summary = summarize_fleet(&views, &catalog.thresholds);

    DashboardSnapshot {
        generated_at: Utc::now(),
        sample_count: samples.len(),
        overall,
        categories,
        stations: views,
        bands,
        fleet: fleet_summary,
    }
}
