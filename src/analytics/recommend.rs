//! Rule-based safety recommendations.

use super::kpi::{metric, KpiBundle};
use super::Severity;
use serde::{Deserialize, Serialize};

/// Thresholds at which each rule fires.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationThresholds {
    /// Fires when the safety score is below this.
    pub min_safety_score: f64,
    /// Fires when the collision density is above this.
    pub max_collision_density: f64,
    /// Fires when the teleport density is above this.
    pub max_teleport_density: f64,
    /// Fires when there are more emergency stops than this.
    pub max_emergency_stops: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            min_safety_score: 70.0,
            max_collision_density: 0.1,
            max_teleport_density: 0.05,
            max_emergency_stops: 10.0,
        }
    }
}

/// A suggestion shown on the safety page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub title: &'static str,
    pub message: String,
    /// 1 is the most urgent.
    pub priority: u8,
}

/// The KPIs the rules look at.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RuleInput {
    pub safety_score: f64,
    pub collision_density: f64,
    pub teleport_density: f64,
    pub emergency_stops: f64,
}

impl RuleInput {
    pub fn from_bundle(bundle: &KpiBundle, safety_score: f64) -> Self {
        Self {
            safety_score,
            collision_density: bundle.kpi(metric::COLLISION_DENSITY),
            teleport_density: bundle.kpi(metric::TELEPORT_DENSITY),
            emergency_stops: bundle.kpi(metric::EMERGENCY_STOPS),
        }
    }
}

struct Rule {
    fires: fn(&RuleInput, &RecommendationThresholds) -> bool,
    build: fn(&RuleInput) -> Recommendation,
}

const RULES: [Rule; 4] = [
    Rule {
        fires: |input, t| input.safety_score < t.min_safety_score,
        build: |input| Recommendation {
            severity: Severity::High,
            title: "Improve overall safety",
            message: format!(
                "The safety score is {:.0}/100. Review speed limits and junction control on the busiest corridors.",
                input.safety_score
            ),
            priority: 1,
        },
    },
    Rule {
        fires: |input, t| input.collision_density > t.max_collision_density,
        build: |input| Recommendation {
            severity: Severity::High,
            title: "Reduce collisions",
            message: format!(
                "{:.2} collisions per vehicle. Consider lower speed limits or protected turns at conflict points.",
                input.collision_density
            ),
            priority: 1,
        },
    },
    Rule {
        fires: |input, t| input.teleport_density > t.max_teleport_density,
        build: |input| Recommendation {
            severity: Severity::Medium,
            title: "Relieve gridlock",
            message: format!(
                "{:.2} teleports per vehicle indicate gridlock. Check road closures and signal timing.",
                input.teleport_density
            ),
            priority: 2,
        },
    },
    Rule {
        fires: |input, t| input.emergency_stops > t.max_emergency_stops,
        build: |input| Recommendation {
            severity: Severity::Medium,
            title: "Smooth braking",
            message: format!(
                "{:.0} emergency stops recorded. Increase following distances or warning signage.",
                input.emergency_stops
            ),
            priority: 2,
        },
    },
];

/// Evaluates every rule, in a fixed order. Rules are independent; any number may fire.
pub fn recommendations(
    input: &RuleInput,
    thresholds: &RecommendationThresholds,
) -> Vec<Recommendation> {
    RULES
        .iter()
        .filter(|rule| (rule.fires)(input, thresholds))
        .map(|rule| (rule.build)(input))
        .collect()
}
