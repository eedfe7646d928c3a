// SQLite sample source. Uses sqlx for async + connection pooling.
// Tables: stations (entity directory) and samples (one row per measurement, ts_ms
// nullable). Metric types are stored as wire names; anything the running binary does
// not recognise reads back as MetricType::Unknown and is dropped by the aggregator.

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use sqlx::Row;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::instrument;

use crate::models::{DailyAggregateRow, LifecycleStatus, MetricType, Sample, Station};
use crate::source::{SampleSource, SortOrder, TimeWindow};

const SELECT_WINDOW_ASC: &str = "SELECT id, station_id, metric_type, value, ts_ms, unit
     FROM samples WHERE ts_ms >= $1 AND ts_ms < $2 ORDER BY ts_ms ASC, id ASC LIMIT $3";

const SELECT_WINDOW_DESC: &str = "SELECT id, station_id, metric_type, value, ts_ms, unit
     FROM samples WHERE ts_ms >= $1 AND ts_ms < $2 ORDER BY ts_ms DESC, id DESC LIMIT $3";

pub struct SampleRepo {
    pool: SqlitePool,
}

impl SampleRepo {
    pub async fn connect(path: &str, max_pool_size: u32) -> anyhow::Result<Self> {
        if let Some(parent) = Path::new(path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(5))
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_pool_size)
            .connect_with(opts)
            .await?;
        Ok(Self { pool })
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS stations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                location TEXT NOT NULL,
                lifecycle TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS samples (
                id INTEGER PRIMARY KEY,
                station_id TEXT NOT NULL,
                metric_type TEXT NOT NULL,
                value REAL NOT NULL,
                ts_ms INTEGER,
                unit TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_samples_ts ON samples(ts_ms)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Insert or replace directory entries.
    #[instrument(skip(self, stations), fields(repo = "samples", operation = "save_stations", stations_count = stations.len()))]
    pub async fn save_stations(&self, stations: &[Station]) -> anyhow::Result<()> {
        if stations.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for s in stations {
            sqlx::query(
                "INSERT OR REPLACE INTO stations (id, name, location, lifecycle) VALUES ($1, $2, $3, $4)",
            )
            .bind(&s.id)
            .bind(&s.name)
            .bind(&s.location)
            .bind(s.lifecycle.as_str())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Insert samples; a sample whose id already exists replaces the stored row.
    #[instrument(skip(self, samples), fields(repo = "samples", operation = "save_samples", samples_count = samples.len()))]
    pub async fn save_samples(&self, samples: &[Sample]) -> anyhow::Result<()> {
        if samples.is_empty() {
            return Ok(());
        }
        let mut tx = self.pool.begin().await?;
        for s in samples {
            sqlx::query(
                "INSERT OR REPLACE INTO samples (id, station_id, metric_type, value, ts_ms, unit) VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(s.id)
            .bind(&s.station_id)
            .bind(s.metric_type.as_str())
            .bind(s.value)
            .bind(s.timestamp.map(|t| t.timestamp_millis()))
            .bind(s.unit.as_deref())
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self), fields(repo = "samples", operation = "list_stations"))]
    pub async fn list_stations(&self) -> anyhow::Result<Vec<Station>> {
        let rows = sqlx::query("SELECT id, name, location, lifecycle FROM stations ORDER BY id ASC")
            .fetch_all(&self.pool)
            .await?;
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            let lifecycle: String = row.try_get("lifecycle")?;
            out.push(Station {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                location: row.try_get("location")?,
                lifecycle: LifecycleStatus::from_wire(&lifecycle),
            });
        }
        Ok(out)
    }

    /// Timestamped samples in [window.from, window.to). Rows without ts_ms never match.
    #[instrument(skip(self), fields(repo = "samples", operation = "read_samples"))]
    pub async fn read_samples(
        &self,
        window: TimeWindow,
        limit: u32,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Sample>> {
        let sql = match order {
            SortOrder::Ascending => SELECT_WINDOW_ASC,
            SortOrder::Descending => SELECT_WINDOW_DESC,
        };
        let rows = sqlx::query(sql)
            .bind(window.from.timestamp_millis())
            .bind(window.to.timestamp_millis())
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_sample_row(&row)?);
        }
        Ok(out)
    }

    /// Most recently inserted samples (by id), including untimestamped rows. Oldest first.
    pub async fn recent_samples(&self, limit: u32) -> anyhow::Result<Vec<Sample>> {
        let rows = sqlx::query(
            "SELECT id, station_id, metric_type, value, ts_ms, unit FROM samples ORDER BY id DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(Self::parse_sample_row(&row)?);
        }
        out.reverse();
        Ok(out)
    }

    /// AVG(value) per (local date, metric type) in the window, computed by SQLite.
    #[instrument(skip(self), fields(repo = "samples", operation = "read_daily_aggregates"))]
    pub async fn read_daily_aggregates(
        &self,
        window: TimeWindow,
        utc_offset: FixedOffset,
    ) -> anyhow::Result<Vec<DailyAggregateRow>> {
        let rows = sqlx::query(
            "SELECT date(ts_ms / 1000 + $1, 'unixepoch') AS day, metric_type, AVG(value) AS avg_value
             FROM samples WHERE ts_ms >= $2 AND ts_ms < $3
             GROUP BY day, metric_type ORDER BY day ASC",
        )
        .bind(utc_offset.local_minus_utc() as i64)
        .bind(window.from.timestamp_millis())
        .bind(window.to.timestamp_millis())
        .fetch_all(&self.pool)
        .await?;

        let mut by_day: BTreeMap<NaiveDate, BTreeMap<MetricType, f64>> = BTreeMap::new();
        for row in rows {
            let day: String = row.try_get("day")?;
            let metric_type: String = row.try_get("metric_type")?;
            let avg: f64 = row.try_get("avg_value")?;
            let date = NaiveDate::parse_from_str(&day, "%Y-%m-%d")
                .map_err(|e| anyhow::anyhow!("daily aggregate date {:?}: {}", day, e))?;
            let metric_type = MetricType::from_wire(&metric_type);
            if metric_type == MetricType::Unknown {
                continue;
            }
            by_day.entry(date).or_default().insert(metric_type, avg);
        }
        Ok(by_day
            .into_iter()
            .map(|(date, averages)| DailyAggregateRow { date, averages })
            .collect())
    }

    fn parse_sample_row(row: &sqlx::sqlite::SqliteRow) -> anyhow::Result<Sample> {
        let metric_type: String = row.try_get("metric_type")?;
        let ts_ms: Option<i64> = row.try_get("ts_ms")?;
        let timestamp = match ts_ms {
            Some(ms) => Some(
                DateTime::<Utc>::from_timestamp_millis(ms)
                    .ok_or_else(|| anyhow::anyhow!("sample timestamp out of range: {}", ms))?,
            ),
            None => None,
        };
        Ok(Sample {
            id: row.try_get("id")?,
            station_id: row.try_get("station_id")?,
            metric_type: MetricType::from_wire(&metric_type),
            value: row.try_get("value")?,
            timestamp,
            unit: row.try_get("unit")?,
        })
    }
}

impl SampleSource for SampleRepo {
    async fn list_stations(&self) -> anyhow::Result<Vec<Station>> {
        SampleRepo::list_stations(self).await
    }

    async fn read_samples(
        &self,
        window: TimeWindow,
        limit: u32,
        order: SortOrder,
    ) -> anyhow::Result<Vec<Sample>> {
        SampleRepo::read_samples(self, window, limit, order).await
    }

    async fn read_daily_aggregates(
        &self,
        window: TimeWindow,
        utc_offset: FixedOffset,
    ) -> anyhow::Result<Vec<DailyAggregateRow>> {
        SampleRepo::read_daily_aggregates(self, window, utc_offset).await
    }
}
