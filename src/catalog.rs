// Metric catalog: thresholds, categories, bands, missing-value defaults and unit
// conversions. Built-in defaults, selectively overridden from config.

use chrono::{FixedOffset, Offset, Utc};

use crate::config::AppConfig;
use crate::models::MetricType;
use crate::pipeline::band_view::{BandDef, MissingValueTable, STATION_WIDE_METRICS};
use crate::pipeline::daily::UnitConversions;
use crate::pipeline::threshold::{ThresholdRule, ThresholdTable};

/// Named group of metric types rolled up into one status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDef {
    pub name: String,
    pub metrics: Vec<MetricType>,
}

impl CategoryDef {
    fn new(name: &str, metrics: &[MetricType]) -> Self {
        Self {
            name: name.to_string(),
            metrics: metrics.to_vec(),
        }
    }

    pub fn builtin() -> Vec<CategoryDef> {
        use MetricType::*;
        vec![
            CategoryDef::new(
                "system",
                &[CpuLoad, MemoryLoad, Temperature, PowerDraw, Uptime],
            ),
            CategoryDef::new("nr", &[NrDlThroughput, NrUlThroughput, NrRsrp, NrSinr]),
            CategoryDef::new("lte", &[LteDlThroughput, LteUlThroughput]),
            CategoryDef::new("quality", &[Latency, TxImbalance]),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    pub thresholds: ThresholdTable,
    pub categories: Vec<CategoryDef>,
    pub bands: Vec<BandDef>,
    pub missing: MissingValueTable,
    pub conversions: UnitConversions,
    /// Timezone that calendar days are cut in for daily trends.
    pub reporting_offset: FixedOffset,
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            thresholds: ThresholdTable::default(),
            categories: CategoryDef::builtin(),
            bands: BandDef::builtin(),
            missing: MissingValueTable::default(),
            conversions: UnitConversions::default(),
            reporting_offset: Utc.fix(),
        }
    }
}

impl Catalog {
    /// Built-in catalog with the config's threshold, missing-default and conversion overrides.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let offset_secs = config.reporting.utc_offset_minutes * 60;
        let reporting_offset = FixedOffset::east_opt(offset_secs).ok_or_else(|| {
            anyhow::anyhow!(
                "reporting.utc_offset_minutes out of range: {}",
                config.reporting.utc_offset_minutes
            )
        })?;
        let catalog = Self {
            thresholds: ThresholdTable::default().with_overrides(
                &config.thresholds.metrics,
                &config.thresholds.populations,
            ),
            missing: MissingValueTable::with_overrides(config.missing_defaults.clone()),
            conversions: UnitConversions::default().with_overrides(&config.unit_conversions),
            reporting_offset,
            ..Self::default()
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Every rule well-formed, every metric a category/band/station field reads has a
    /// rule, and every conversion factor finite and non-zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (metric_type, rule) in self.thresholds.metric_rules() {
            anyhow::ensure!(
                metric_type != MetricType::Unknown,
                "thresholds.metrics contains an unknown metric type"
            );
            anyhow::ensure!(
                !matches!(rule, ThresholdRule::PopulationRatio { .. }),
                "thresholds.metrics.{} cannot use shape = \"population_ratio\"",
                metric_type
            );
            rule.validate()
                .map_err(|e| anyhow::anyhow!("thresholds.metrics.{}: {}", metric_type, e))?;
        }
        for (scope, rule) in self.thresholds.population_rules() {
            anyhow::ensure!(
                matches!(rule, ThresholdRule::PopulationRatio { .. }),
                "thresholds.populations.{} must use shape = \"population_ratio\"",
                scope
            );
            rule.validate()
                .map_err(|e| anyhow::anyhow!("thresholds.populations.{}: {}", scope, e))?;
        }
        let referenced = self
            .categories
            .iter()
            .flat_map(|c| c.metrics.iter().copied())
            .chain(self.bands.iter().flat_map(|b| b.metrics()))
            .chain(STATION_WIDE_METRICS);
        for metric_type in referenced {
            anyhow::ensure!(
                self.thresholds.contains(metric_type),
                "no threshold rule for metric type {}",
                metric_type
            );
        }
        for (metric_type, factor) in self.conversions.factors() {
            anyhow::ensure!(
                metric_type != MetricType::Unknown,
                "unit_conversions contains an unknown metric type"
            );
            anyhow::ensure!(
                factor.is_finite() && factor != 0.0,
                "unit_conversions.{} must be finite and non-zero, got {}",
                metric_type,
                factor
            );
        }
        Ok(())
    }
}
