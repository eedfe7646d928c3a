// Threshold evaluation: one table keyed by metric type (and by population scope),
// one classification path over declarative rules.
//
// All cutoffs are inclusive on the better side, so the three tiers partition the
// real line. NaN never satisfies a comparison and therefore lands in `Critical`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{BandId, HealthStatus, MetricType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    LowerIsBetter,
    HigherIsBetter,
}

/// Rule shape and cutoffs for one metric type or population.
/// In TOML: `{ shape = "banded", direction = "lower_is_better", good = 70.0, warn = 90.0 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ThresholdRule {
    /// Raw value against `good`/`warn` in the given direction.
    Banded {
        direction: Direction,
        good: f64,
        warn: f64,
    },
    /// `value / nominal_max`, then higher-is-better against `good`/`warn`.
    CapacityRatio { nominal_max: f64, good: f64, warn: f64 },
    /// `healthy / total`, then higher-is-better against `good`/`warn`. An empty
    /// population is healthy.
    PopulationRatio { good: f64, warn: f64 },
}

/// Healthy-member count over a population, for population-ratio rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatioContext {
    pub healthy: u32,
    pub total: u32,
}

impl RatioContext {
    pub fn new(healthy: u32, total: u32) -> Self {
        Self { healthy, total }
    }
}

fn band(value: f64, direction: Direction, good: f64, warn: f64) -> HealthStatus {
    match direction {
        Direction::LowerIsBetter => {
            if value <= good {
                HealthStatus::Healthy
            } else if value <= warn {
                HealthStatus::Warning
            } else {
                HealthStatus::Critical
            }
        }
        Direction::HigherIsBetter => {
            if value >= good {
                HealthStatus::Healthy
            } else if value >= warn {
                HealthStatus::Warning
            } else {
                HealthStatus::Critical
            }
        }
    }
}

impl ThresholdRule {
    /// Classify `value`. For population rules `ratio` supplies healthy/total; without
    /// it `value` is taken as an already-computed ratio. Other shapes ignore `ratio`.
    pub fn classify(&self, value: f64, ratio: Option<RatioContext>) -> HealthStatus {
        match *self {
            ThresholdRule::Banded {
                direction,
                good,
                warn,
            } => band(value, direction, good, warn),
            ThresholdRule::CapacityRatio {
                nominal_max,
                good,
                warn,
            } => band(value / nominal_max, Direction::HigherIsBetter, good, warn),
            ThresholdRule::PopulationRatio { good, warn } => {
                let ratio = match ratio {
                    Some(RatioContext { total: 0, .. }) => return HealthStatus::Healthy,
                    Some(ctx) => ctx.healthy as f64 / ctx.total as f64,
                    None => value,
                };
                band(ratio, Direction::HigherIsBetter, good, warn)
            }
        }
    }

    /// Check cutoffs are finite and ordered for the rule's direction.
    pub fn validate(&self) -> anyhow::Result<()> {
        let (good, warn, direction) = match *self {
            ThresholdRule::Banded {
                direction,
                good,
                warn,
            } => (good, warn, direction),
            ThresholdRule::CapacityRatio {
                nominal_max,
                good,
                warn,
            } => {
                anyhow::ensure!(
                    nominal_max.is_finite() && nominal_max > 0.0,
                    "nominal_max must be > 0, got {}",
                    nominal_max
                );
                (good, warn, Direction::HigherIsBetter)
            }
            ThresholdRule::PopulationRatio { good, warn } => {
                anyhow::ensure!(
                    (0.0..=1.0).contains(&good) && (0.0..=1.0).contains(&warn),
                    "population ratio cutoffs must be within 0..=1, got good={} warn={}",
                    good,
                    warn
                );
                (good, warn, Direction::HigherIsBetter)
            }
        };
        anyhow::ensure!(
            good.is_finite() && warn.is_finite(),
            "cutoffs must be finite, got good={} warn={}",
            good,
            warn
        );
        match direction {
            Direction::LowerIsBetter => anyhow::ensure!(
                good <= warn,
                "lower_is_better requires good <= warn, got good={} warn={}",
                good,
                warn
            ),
            Direction::HigherIsBetter => anyhow::ensure!(
                good >= warn,
                "higher_is_better requires good >= warn, got good={} warn={}",
                good,
                warn
            ),
        }
        Ok(())
    }
}

/// Populations whose health ratio is classified, each with its own cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopulationScope {
    Fleet,
    NrCells,
    LteCells,
}

impl PopulationScope {
    pub const ALL: [PopulationScope; 3] = [
        PopulationScope::Fleet,
        PopulationScope::NrCells,
        PopulationScope::LteCells,
    ];

    pub fn for_band(band: BandId) -> Self {
        match band {
            BandId::Nr => PopulationScope::NrCells,
            BandId::Lte => PopulationScope::LteCells,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PopulationScope::Fleet => "fleet",
            PopulationScope::NrCells => "nr_cells",
            PopulationScope::LteCells => "lte_cells",
        }
    }

    fn builtin_rule(&self) -> ThresholdRule {
        match self {
            PopulationScope::Fleet => ThresholdRule::PopulationRatio {
                good: 0.9,
                warn: 0.7,
            },
            PopulationScope::NrCells | PopulationScope::LteCells => {
                ThresholdRule::PopulationRatio {
                    good: 0.8,
                    warn: 0.5,
                }
            }
        }
    }
}

const fn lower(good: f64, warn: f64) -> ThresholdRule {
    ThresholdRule::Banded {
        direction: Direction::LowerIsBetter,
        good,
        warn,
    }
}

const fn higher(good: f64, warn: f64) -> ThresholdRule {
    ThresholdRule::Banded {
        direction: Direction::HigherIsBetter,
        good,
        warn,
    }
}

const fn capacity(nominal_max: f64) -> ThresholdRule {
    ThresholdRule::CapacityRatio {
        nominal_max,
        good: 0.5,
        warn: 0.2,
    }
}

impl std::fmt::Display for PopulationScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Built-in rule per metric type. Units: percent, °C, W, Mbps, dBm, dB, ms.
fn builtin_metric_rules() -> BTreeMap<MetricType, ThresholdRule> {
    BTreeMap::from([
        (MetricType::CpuLoad, lower(70.0, 90.0)),
        (MetricType::MemoryLoad, lower(75.0, 90.0)),
        (MetricType::Temperature, lower(65.0, 80.0)),
        (MetricType::PowerDraw, lower(3500.0, 5000.0)),
        (MetricType::Uptime, higher(99.9, 99.0)),
        (MetricType::NrDlThroughput, capacity(1000.0)),
        (MetricType::NrUlThroughput, capacity(200.0)),
        // dBm: closer to zero is better
        (MetricType::NrRsrp, higher(-90.0, -105.0)),
        (MetricType::NrSinr, higher(13.0, 0.0)),
        (MetricType::LteDlThroughput, capacity(150.0)),
        (MetricType::LteUlThroughput, capacity(50.0)),
        (MetricType::Latency, lower(20.0, 50.0)),
        (MetricType::TxImbalance, lower(2.0, 4.0)),
    ])
}

/// The metric catalog's classification table. A metric type is "known" iff it has a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    metrics: BTreeMap<MetricType, ThresholdRule>,
    populations: BTreeMap<PopulationScope, ThresholdRule>,
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            metrics: builtin_metric_rules(),
            populations: PopulationScope::ALL
                .iter()
                .map(|s| (*s, s.builtin_rule()))
                .collect(),
        }
    }
}

impl ThresholdTable {
    /// Table with only the given metric rules (populations keep built-in cutoffs).
    pub fn from_rules(metrics: BTreeMap<MetricType, ThresholdRule>) -> Self {
        Self {
            metrics,
            ..Self::default()
        }
    }

    /// Replace individual entries; anything not overridden keeps its current rule.
    pub fn with_overrides(
        mut self,
        metrics: &BTreeMap<MetricType, ThresholdRule>,
        populations: &BTreeMap<PopulationScope, ThresholdRule>,
    ) -> Self {
        self.metrics.extend(metrics.iter().map(|(k, v)| (*k, *v)));
        self.populations
            .extend(populations.iter().map(|(k, v)| (*k, *v)));
        self
    }

    pub fn rule(&self, metric_type: MetricType) -> Option<&ThresholdRule> {
        self.metrics.get(&metric_type)
    }

    pub fn contains(&self, metric_type: MetricType) -> bool {
        self.metrics.contains_key(&metric_type)
    }

    pub fn metric_rules(&self) -> impl Iterator<Item = (MetricType, &ThresholdRule)> {
        self.metrics.iter().map(|(k, v)| (*k, v))
    }

    pub fn population_rules(&self) -> impl Iterator<Item = (PopulationScope, &ThresholdRule)> {
        self.populations.iter().map(|(k, v)| (*k, v))
    }

    /// Classify one value of `metric_type`. Metric types without a rule are `Critical`.
    pub fn classify(
        &self,
        metric_type: MetricType,
        value: f64,
        ratio: Option<RatioContext>,
    ) -> HealthStatus {
        match self.metrics.get(&metric_type) {
            Some(rule) => rule.classify(value, ratio),
            None => {
                tracing::debug!(
                    metric_type = %metric_type,
                    "no threshold rule; classifying as critical"
                );
                HealthStatus::Critical
            }
        }
    }

    /// Classify `healthy / total` for a population. `total == 0` is healthy.
    pub fn classify_population(
        &self,
        scope: PopulationScope,
        healthy: u32,
        total: u32,
    ) -> HealthStatus {
        let ctx = Some(RatioContext::new(healthy, total));
        match self.populations.get(&scope) {
            Some(rule) => rule.classify(0.0, ctx),
            None => scope.builtin_rule().classify(0.0, ctx),
        }
    }
}
