// Refresh worker: spawn against a seeded repo, observe published snapshots, shutdown

mod common;

use chrono::{Duration as ChronoDuration, FixedOffset, Utc};
use common::{healthy_station_samples, sample, station};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use stationhealth::catalog::Catalog;
use stationhealth::models::{
    DailyAggregateRow, DashboardSnapshot, HealthStatus, LifecycleStatus, MetricType, Sample,
    Station, TrendSnapshot, TrendSource,
};
use stationhealth::sample_repo::SampleRepo;
use stationhealth::source::{SampleSource, SortOrder, TimeWindow};
use stationhealth::worker::{RefreshState, WorkerConfig, WorkerDeps, spawn};
use tokio::sync::watch;
use tokio::time::Duration;

fn fast_config() -> WorkerConfig {
    WorkerConfig {
        historical_interval: Duration::from_millis(50),
        historical_window: ChronoDuration::hours(1),
        historical_limit: 1000,
        live_interval: Duration::from_millis(20),
        live_window: ChronoDuration::minutes(5),
        live_limit: 1000,
        use_source_daily_aggregates: false,
        stats_log_interval: Duration::from_secs(3600),
    }
}

#[tokio::test]
async fn worker_publishes_snapshots_and_shuts_down() {
    let dir = tempfile::TempDir::new().unwrap();
    let db_path = dir.path().join("stations.db");
    let repo = Arc::new(
        SampleRepo::connect(db_path.to_str().unwrap(), 2)
            .await
            .unwrap(),
    );
    repo.init().await.unwrap();
    repo.save_stations(&[
        station("bs-1", LifecycleStatus::Active),
        station("bs-2", LifecycleStatus::Offline),
    ])
    .await
    .unwrap();
    let now_ms = Utc::now().timestamp_millis() - 1_000;
    repo.save_samples(&healthy_station_samples("bs-1", 1, now_ms))
        .await
        .unwrap();

    let (dashboard_tx, mut dashboard_rx) = watch::channel(Arc::new(DashboardSnapshot::empty()));
    let (trends_tx, trends_rx) = watch::channel(Arc::new(TrendSnapshot::empty()));
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            source: repo.clone(),
            catalog: Arc::new(Catalog::default()),
            dashboard_tx,
            trends_tx,
            ws_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_rx,
        },
        fast_config(),
    );

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        tokio::time::timeout(Duration::from_secs(5), dashboard_rx.changed())
            .await
            .expect("snapshot published")
            .unwrap();
        let snapshot = dashboard_rx.borrow_and_update().clone();
        if snapshot.stations.len() == 2 && snapshot.sample_count == 8 {
            assert_eq!(snapshot.fleet.active, 1);
            assert_eq!(snapshot.fleet.healthy_active, 1);
            assert_eq!(
                snapshot.station("bs-1").unwrap().status,
                HealthStatus::Healthy
            );
            break;
        }
        assert!(tokio::time::Instant::now() < deadline, "timed out");
    }

    let trends = trends_rx.borrow().clone();
    assert_eq!(trends.source, TrendSource::Bucketed);
    assert!(!trends.series(MetricType::Latency).is_empty());

    let _ = shutdown_tx.send(());
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker stopped")
        .unwrap();
}

/// In-memory source whose reads can be switched to fail.
#[derive(Default)]
struct FakeSource {
    stations: Mutex<Vec<Station>>,
    samples: Mutex<Vec<Sample>>,
    daily: Mutex<Vec<DailyAggregateRow>>,
    fail: Mutex<bool>,
}

impl FakeSource {
    fn failing(&self) -> bool {
        *self.fail.lock().unwrap()
    }
}

impl SampleSource for FakeSource {
    async fn list_stations(&self) -> anyhow::Result<Vec<Station>> {
        anyhow::ensure!(!self.failing(), "directory unavailable");
        Ok(self.stations.lock().unwrap().clone())
    }

    async fn read_samples(
        &self,
        window: TimeWindow,
        limit: u32,
        _order: SortOrder,
    ) -> anyhow::Result<Vec<Sample>> {
        anyhow::ensure!(!self.failing(), "samples unavailable");
        Ok(self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.timestamp.is_some_and(|t| window.contains(t)))
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn read_daily_aggregates(
        &self,
        _window: TimeWindow,
        _utc_offset: FixedOffset,
    ) -> anyhow::Result<Vec<DailyAggregateRow>> {
        anyhow::ensure!(!self.failing(), "pre-aggregates unavailable");
        Ok(self.daily.lock().unwrap().clone())
    }
}

#[tokio::test]
async fn failed_reads_keep_stations_and_empty_the_batches() {
    let now = Utc::now();
    let source = FakeSource::default();
    *source.stations.lock().unwrap() = vec![station("bs-1", LifecycleStatus::Active)];
    *source.samples.lock().unwrap() =
        healthy_station_samples("bs-1", 1, now.timestamp_millis() - 1_000);
    let config = fast_config();
    let catalog = Catalog::default();

    let mut state = RefreshState::default();
    state.refresh_historical(&source, &config, now).await;
    state.refresh_live(&source, &config, now).await;
    assert_eq!(state.stations.len(), 1);
    assert_eq!(state.historical.len(), 8);
    assert_eq!(state.merged().len(), 8);
    assert_eq!(state.evaluate(&catalog).overall, HealthStatus::Healthy);

    *source.fail.lock().unwrap() = true;
    state.refresh_historical(&source, &config, now).await;
    state.refresh_live(&source, &config, now).await;
    assert_eq!(state.stations.len(), 1);
    assert!(state.historical.is_empty());
    assert!(state.live.is_empty());

    let snapshot = state.evaluate(&catalog);
    assert_eq!(snapshot.sample_count, 0);
    assert_eq!(
        snapshot.station("bs-1").unwrap().status,
        HealthStatus::Critical
    );
}

#[tokio::test]
async fn trends_prefer_pre_aggregates_and_fall_back_to_bucketing() {
    let now = Utc::now();
    let source = FakeSource::default();
    *source.samples.lock().unwrap() = vec![sample(
        1,
        "bs-1",
        MetricType::PowerDraw,
        2000.0,
        now.timestamp_millis() - 1_000,
    )];
    *source.daily.lock().unwrap() = vec![DailyAggregateRow {
        date: now.date_naive(),
        averages: [(MetricType::PowerDraw, 4000.0)].into_iter().collect(),
    }];
    let mut config = fast_config();
    config.use_source_daily_aggregates = true;
    let catalog = Catalog::default();

    let mut state = RefreshState::default();
    state.refresh_historical(&source, &config, now).await;

    let trends = state.trends(&source, &catalog, &config, now).await;
    assert_eq!(trends.source, TrendSource::PreAggregated);
    assert_eq!(trends.points.len(), 1);
    assert!((trends.points[0].average - 4.0).abs() < 1e-9);

    *source.fail.lock().unwrap() = true;
    let trends = state.trends(&source, &catalog, &config, now).await;
    assert_eq!(trends.source, TrendSource::Bucketed);
    assert!((trends.points[0].average - 2.0).abs() < 1e-9);
}
