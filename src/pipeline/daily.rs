// Daily bucketing: (local calendar date, metric type) -> average, for trend charts.

use std::collections::BTreeMap;

use chrono::{FixedOffset, NaiveDate};

use crate::models::{DailyAggregateRow, DailySeriesPoint, MetricType, Sample};

/// Linear scale applied to daily averages per metric type (e.g. W -> kW).
#[derive(Debug, Clone, PartialEq)]
pub struct UnitConversions {
    factors: BTreeMap<MetricType, f64>,
}

impl Default for UnitConversions {
    fn default() -> Self {
        Self {
            factors: BTreeMap::from([(MetricType::PowerDraw, 0.001)]),
        }
    }
}

impl UnitConversions {
    pub fn none() -> Self {
        Self {
            factors: BTreeMap::new(),
        }
    }

    pub fn with_overrides(mut self, overrides: &BTreeMap<MetricType, f64>) -> Self {
        self.factors.extend(overrides.iter().map(|(k, v)| (*k, *v)));
        self
    }

    pub fn factor(&self, metric_type: MetricType) -> f64 {
        self.factors.get(&metric_type).copied().unwrap_or(1.0)
    }

    pub fn factors(&self) -> impl Iterator<Item = (MetricType, f64)> + '_ {
        self.factors.iter().map(|(k, v)| (*k, *v))
    }

    /// Conversion is a scalar, so scaling the average equals averaging scaled values.
    pub fn apply(&self, metric_type: MetricType, value: f64) -> f64 {
        value * self.factor(metric_type)
    }
}

/// Bucket samples by calendar date in `offset` and metric type. Output is ascending by
/// date, then by metric type. Samples without a timestamp or with an `Unknown` metric
/// type cannot be keyed and are skipped.
pub fn bucket_by_day<'a, I>(
    samples: I,
    conversions: &UnitConversions,
    offset: FixedOffset,
) -> Vec<DailySeriesPoint>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut buckets: BTreeMap<(NaiveDate, MetricType), (f64, u64)> = BTreeMap::new();
    for s in samples {
        let Some(ts) = s.timestamp else {
            continue;
        };
        if s.metric_type == MetricType::Unknown {
            continue;
        }
        let date = ts.with_timezone(&offset).date_naive();
        let entry = buckets.entry((date, s.metric_type)).or_insert((0.0, 0));
        entry.0 += s.value;
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|((date, metric_type), (sum, count))| DailySeriesPoint {
            date,
            metric_type,
            average: conversions.apply(metric_type, sum / count as f64),
        })
        .collect()
}

/// Flatten source pre-aggregates into the same shape and order `bucket_by_day` produces.
pub fn flatten_daily_rows(
    rows: &[DailyAggregateRow],
    conversions: &UnitConversions,
) -> Vec<DailySeriesPoint> {
    let mut out: Vec<DailySeriesPoint> = rows
        .iter()
        .flat_map(|row| {
            row.averages
                .iter()
                .filter(|(m, _)| **m != MetricType::Unknown)
                .map(|(m, avg)| DailySeriesPoint {
                    date: row.date,
                    metric_type: *m,
                    average: conversions.apply(*m, *avg),
                })
        })
        .collect();
    out.sort_by(|a, b| (a.date, a.metric_type).cmp(&(b.date, b.metric_type)));
    out
}

/// Group points into one date-ordered series per metric type.
pub fn series_by_metric(
    points: &[DailySeriesPoint],
) -> BTreeMap<MetricType, Vec<DailySeriesPoint>> {
    let mut out: BTreeMap<MetricType, Vec<DailySeriesPoint>> = BTreeMap::new();
    for p in points {
        out.entry(p.metric_type).or_default().push(p.clone());
    }
    out
}
