// Read interfaces the pipeline needs from the outside: entity directory, sample
// batches, and optional day-level pre-aggregates.

use std::future::Future;

use chrono::{DateTime, Duration, FixedOffset, Utc};

use crate::models::{DailyAggregateRow, Sample, Station};

/// Half-open time range `[from, to)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Window of `length` ending at `now`, with `now` itself included.
    pub fn ending_at(now: DateTime<Utc>, length: Duration) -> Self {
        Self {
            from: now - length,
            to: now + Duration::milliseconds(1),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.from && ts < self.to
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Oldest first (historical reads).
    Ascending,
    /// Newest first, so a row limit keeps the most recent samples (live reads).
    Descending,
}

/// Upstream data source. Implementations may fail; the refresh worker treats a
/// failed read as an empty batch.
pub trait SampleSource: Send + Sync + 'static {
    fn list_stations(&self) -> impl Future<Output = anyhow::Result<Vec<Station>>> + Send;

    /// Timestamped samples inside `window`, at most `limit`, in `order`.
    fn read_samples(
        &self,
        window: TimeWindow,
        limit: u32,
        order: SortOrder,
    ) -> impl Future<Output = anyhow::Result<Vec<Sample>>> + Send;

    /// Day-level averages (raw units) inside `window`, days cut at `utc_offset`,
    /// ascending by date.
    fn read_daily_aggregates(
        &self,
        window: TimeWindow,
        utc_offset: FixedOffset,
    ) -> impl Future<Output = anyhow::Result<Vec<DailyAggregateRow>>> + Send;
}
