// Grouped statistics: one pass, one accumulator per (station?, metric type).

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::threshold::ThresholdTable;
use crate::models::{AggregateKey, MetricAggregate, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    /// Key by `(station_id, metric_type)`.
    Station,
    /// Key by `metric_type` alone across all stations.
    Fleet,
}

struct Accumulator {
    sum: f64,
    count: u64,
    min: f64,
    max: f64,
    current: f64,
    current_timestamp: Option<DateTime<Utc>>,
}

impl Accumulator {
    fn new(first: &Sample) -> Self {
        Self {
            sum: first.value,
            count: 1,
            min: first.value,
            max: first.value,
            current: first.value,
            current_timestamp: first.timestamp,
        }
    }

    fn push(&mut self, s: &Sample) {
        self.sum += s.value;
        self.count += 1;
        if s.value < self.min {
            self.min = s.value;
        }
        if s.value > self.max {
            self.max = s.value;
        }
        // max-by(timestamp): strictly newer replaces, ties keep the first seen,
        // an unset best timestamp loses to any set one, untimestamped samples never win.
        let newer = match (s.timestamp, self.current_timestamp) {
            (Some(ts), Some(best)) => ts > best,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if newer {
            self.current = s.value;
            self.current_timestamp = s.timestamp;
        }
    }

    fn finish(self, key: AggregateKey) -> MetricAggregate {
        MetricAggregate {
            station_id: key.station_id,
            metric_type: key.metric_type,
            sum: self.sum,
            count: self.count,
            min: self.min,
            max: self.max,
            average: self.sum / self.count as f64,
            current: self.current,
            current_timestamp: self.current_timestamp,
        }
    }
}

/// Aggregate `samples` per key. Metric types the table has no rule for (including
/// `Unknown`) are dropped before accumulation and never emitted.
pub fn aggregate<'a, I>(
    samples: I,
    group_by: GroupBy,
    catalog: &ThresholdTable,
) -> BTreeMap<AggregateKey, MetricAggregate>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut accs: BTreeMap<AggregateKey, Accumulator> = BTreeMap::new();
    let mut skipped: u64 = 0;

    for s in samples {
        if !catalog.contains(s.metric_type) {
            skipped += 1;
            continue;
        }
        let key = match group_by {
            GroupBy::Station => AggregateKey::station(s.station_id.as_str(), s.metric_type),
            GroupBy::Fleet => AggregateKey::fleet(s.metric_type),
        };
        match accs.get_mut(&key) {
            Some(acc) => acc.push(s),
            None => {
                accs.insert(key, Accumulator::new(s));
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(
            skipped_samples = skipped,
            "samples with uncatalogued metric types excluded from aggregation"
        );
    }

    accs.into_iter()
        .map(|(key, acc)| (key.clone(), acc.finish(key)))
        .collect()
}
