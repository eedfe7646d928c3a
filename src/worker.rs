// Refresh worker: re-reads the sample source on two cadences and reruns the whole
// pipeline on every refresh. Historical tick (slow): stations + historical window +
// daily trends. Live tick (fast): live look-ahead window. Results are published on
// watch channels; nothing is patched incrementally.

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::{oneshot, watch};
use tokio::time::{Duration, interval};
use tracing::{debug, info, instrument, warn};

use crate::catalog::Catalog;
use crate::config::RefreshConfig;
use crate::models::{DashboardSnapshot, Sample, Station, TrendSnapshot, TrendSource};
use crate::pipeline::{self, MergedSampleSet};
use crate::source::{SampleSource, SortOrder, TimeWindow};

/// Source, catalog, output channels, and shutdown for the worker.
pub struct WorkerDeps<S> {
    pub source: Arc<S>,
    pub catalog: Arc<Catalog>,
    pub dashboard_tx: watch::Sender<Arc<DashboardSnapshot>>,
    pub trends_tx: watch::Sender<Arc<TrendSnapshot>>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: oneshot::Receiver<()>,
}

/// Worker timing and read sizes.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub historical_interval: Duration,
    pub historical_window: ChronoDuration,
    pub historical_limit: u32,
    pub live_interval: Duration,
    pub live_window: ChronoDuration,
    pub live_limit: u32,
    pub use_source_daily_aggregates: bool,
    pub stats_log_interval: Duration,
}

impl From<&RefreshConfig> for WorkerConfig {
    fn from(c: &RefreshConfig) -> Self {
        Self {
            historical_interval: Duration::from_secs(c.historical_interval_secs),
            historical_window: ChronoDuration::hours(c.historical_window_hours as i64),
            historical_limit: c.historical_limit,
            live_interval: Duration::from_millis(c.live_interval_ms),
            live_window: ChronoDuration::seconds(c.live_window_secs as i64),
            live_limit: c.live_limit,
            use_source_daily_aggregates: c.use_source_daily_aggregates,
            stats_log_interval: Duration::from_secs(c.stats_log_interval_secs),
        }
    }
}

/// Last batches read from the source. Owned by the worker task only.
#[derive(Debug, Default)]
pub struct RefreshState {
    pub stations: Vec<Station>,
    pub historical: Vec<Sample>,
    pub live: Vec<Sample>,
}

impl RefreshState {
    /// Re-read stations and the historical window. A failed stations read keeps the
    /// previous directory; a failed sample read yields an empty batch.
    pub async fn refresh_historical<S: SampleSource>(
        &mut self,
        source: &S,
        config: &WorkerConfig,
        now: DateTime<Utc>,
    ) {
        match source.list_stations().await {
            Ok(stations) => self.stations = stations,
            Err(e) => {
                warn!(error = %e, operation = "list_stations", "station directory read failed; keeping previous");
            }
        }
        let window = TimeWindow::ending_at(now, config.historical_window);
        self.historical = source
            .read_samples(window, config.historical_limit, SortOrder::Ascending)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, operation = "read_samples", batch = "historical", "sample read failed; using empty batch");
                Vec::new()
            });
    }

    /// Re-read the live window (newest first, so the limit keeps the latest samples).
    pub async fn refresh_live<S: SampleSource>(
        &mut self,
        source: &S,
        config: &WorkerConfig,
        now: DateTime<Utc>,
    ) {
        let window = TimeWindow::ending_at(now, config.live_window);
        self.live = source
            .read_samples(window, config.live_limit, SortOrder::Descending)
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, operation = "read_samples", batch = "live", "sample read failed; using empty batch");
                Vec::new()
            });
    }

    pub fn merged(&self) -> MergedSampleSet {
        pipeline::merge(&self.historical, &self.live)
    }

    pub fn evaluate(&self, catalog: &Catalog) -> DashboardSnapshot {
        pipeline::evaluate(&self.stations, &self.merged(), catalog)
    }

    /// Daily trends: source pre-aggregates when enabled (falling back to in-process
    /// bucketing if that read fails), otherwise buckets over the merged set.
    pub async fn trends<S: SampleSource>(
        &self,
        source: &S,
        catalog: &Catalog,
        config: &WorkerConfig,
        now: DateTime<Utc>,
    ) -> TrendSnapshot {
        if config.use_source_daily_aggregates {
            let window = TimeWindow::ending_at(now, config.historical_window);
            match source
                .read_daily_aggregates(window, catalog.reporting_offset)
                .await
            {
                Ok(rows) => {
                    return TrendSnapshot {
                        generated_at: now,
                        source: TrendSource::PreAggregated,
                        points: pipeline::flatten_daily_rows(&rows, &catalog.conversions),
                    };
                }
                Err(e) => {
                    warn!(error = %e, operation = "read_daily_aggregates", "daily pre-aggregate read failed; bucketing in-process");
                }
            }
        }
        TrendSnapshot {
            generated_at: now,
            source: TrendSource::Bucketed,
            points: pipeline::bucket_by_day(
                &self.merged(),
                &catalog.conversions,
                catalog.reporting_offset,
            ),
        }
    }
}

pub fn spawn<S: SampleSource>(
    deps: WorkerDeps<S>,
    config: WorkerConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        run(deps, config).await;
    })
}

#[instrument(
    skip_all,
    fields(
        historical_interval_secs = config.historical_interval.as_secs(),
        live_interval_ms = config.live_interval.as_millis() as u64
    )
)]
async fn run<S: SampleSource>(deps: WorkerDeps<S>, config: WorkerConfig) {
    let WorkerDeps {
        source,
        catalog,
        dashboard_tx,
        trends_tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;

    let mut historical_tick = interval(config.historical_interval);
    historical_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut live_tick = interval(config.live_interval);
    live_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut stats_log_tick = interval(config.stats_log_interval);
    stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let mut state = RefreshState::default();
    let mut historical_refreshes: u64 = 0;
    let mut live_refreshes: u64 = 0;

    loop {
        tokio::select! {
            _ = historical_tick.tick() => {
                let now = Utc::now();
                state.refresh_historical(source.as_ref(), &config, now).await;
                let trends = state.trends(source.as_ref(), &catalog, &config, now).await;
                debug!(
                    operation = "refresh_historical",
                    stations = state.stations.len(),
                    historical_samples = state.historical.len(),
                    trend_points = trends.points.len(),
                    "historical window refreshed"
                );
                trends_tx.send_replace(Arc::new(trends));
                publish(&state, &catalog, &dashboard_tx);
                historical_refreshes += 1;
            }
            _ = live_tick.tick() => {
                state.refresh_live(source.as_ref(), &config, Utc::now()).await;
                publish(&state, &catalog, &dashboard_tx);
                live_refreshes += 1;
            }
            _ = stats_log_tick.tick() => {
                info!(
                    ws_clients = ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                    stations = state.stations.len(),
                    historical_refreshes,
                    live_refreshes,
                    "app stats"
                );
            }
            _ = &mut shutdown_rx => {
                debug!("Refresh worker shutting down");
                break;
            }
        }
    }
}

fn publish(
    state: &RefreshState,
    catalog: &Catalog,
    dashboard_tx: &watch::Sender<Arc<DashboardSnapshot>>,
) {
    let snapshot = state.evaluate(catalog);
    debug!(
        operation = "evaluate",
        samples = snapshot.sample_count,
        overall = ?snapshot.overall,
        "dashboard recomputed"
    );
    dashboard_tx.send_replace(Arc::new(snapshot));
}
