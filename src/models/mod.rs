// Domain models: samples in, aggregates/statuses/views out

mod aggregate;
mod band;
mod dashboard;
mod sample;
mod station;
mod status;
mod trend;

pub use aggregate::{AggregateKey, ClassifiedAggregate, MetricAggregate};
pub use band::{BandId, BandRecord, BandSummary, FieldValue, FleetSummary, StationView};
pub use dashboard::{CategoryView, DashboardSnapshot};
pub use sample::{MetricType, ParseMetricTypeError, Sample, SampleId};
pub use station::{LifecycleStatus, Station};
pub use status::HealthStatus;
pub use trend::{DailyAggregateRow, DailySeriesPoint, TrendSnapshot, TrendSource};
