//! Presentation-ready analytics derived from a run's KPIs.
//!
//! Everything here is a pure function of a [KpiBundle], so it can be
//! recomputed whenever a view needs it.

pub use critical::{critical_periods, CriticalPeriod};
pub use hourly::{hourly_profile, HourlyBucket};
pub use kpi::{metric, KpiBundle, TimeSample};
pub use recommend::{recommendations, Recommendation, RecommendationThresholds, RuleInput};
pub use safety::{safety_radar, RadarCategory, RadarCoefficients, RadarScore};
pub use series::{ChartKind, ChartSeries, SummaryCards};

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

mod critical;
mod hourly;
mod kpi;
mod recommend;
pub mod safety;
pub mod series;

/// How urgent a finding is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

/// Tuning values for the derived analytics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyticsConfig {
    pub radar: RadarCoefficients,
    pub thresholds: RecommendationThresholds,
}

/// Everything the results, charts and safety views show.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedAnalytics {
    pub summary: SummaryCards,
    pub charts: Vec<ChartSeries>,
    pub hourly: Vec<HourlyBucket>,
    pub radar: ArrayVec<RadarScore, 6>,
    pub safety_score: f64,
    pub recommendations: Vec<Recommendation>,
    pub critical_periods: Vec<CriticalPeriod>,
}

impl DerivedAnalytics {
    pub fn build(bundle: &KpiBundle, config: &AnalyticsConfig) -> Self {
        let samples = &bundle.time_series;
        let radar = safety_radar(bundle, &config.radar);
        let safety_score = safety::overall_safety_score(bundle, &radar);
        let input = RuleInput::from_bundle(bundle, safety_score);
        Self {
            summary: SummaryCards::from_samples(samples),
            charts: ChartKind::ALL
                .iter()
                .map(|kind| kind.series(samples))
                .collect(),
            hourly: hourly_profile(samples),
            radar,
            safety_score,
            recommendations: recommendations(&input, &config.thresholds),
            critical_periods: critical_periods(samples),
        }
    }

    /// The series for one chart.
    pub fn chart(&self, kind: ChartKind) -> Option<&ChartSeries> {
        self.charts.iter().find(|chart| chart.kind == kind)
    }
}
