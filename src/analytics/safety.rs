//! Safety radar scores.
//!
//! Each category is a linear penalty on one KPI: `100 - kpi * coefficient`,
//! clamped to [0, 100]. The coefficients are tuning values, not derived
//! quantities, so they are configurable.

use super::kpi::{metric, KpiBundle};
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RadarCategory {
    CollisionRisk,
    Gridlock,
    HarshBraking,
    SpeedCompliance,
    NearMisses,
    FlowStability,
}

impl RadarCategory {
    pub const ALL: [RadarCategory; 6] = [
        RadarCategory::CollisionRisk,
        RadarCategory::Gridlock,
        RadarCategory::HarshBraking,
        RadarCategory::SpeedCompliance,
        RadarCategory::NearMisses,
        RadarCategory::FlowStability,
    ];

    /// The KPI the category penalizes.
    pub fn metric(self) -> &'static str {
        match self {
            RadarCategory::CollisionRisk => metric::COLLISION_DENSITY,
            RadarCategory::Gridlock => metric::TELEPORT_DENSITY,
            RadarCategory::HarshBraking => metric::EMERGENCY_STOP_DENSITY,
            RadarCategory::SpeedCompliance => metric::SPEED_VIOLATION_RATIO,
            RadarCategory::NearMisses => metric::NEAR_MISS_DENSITY,
            RadarCategory::FlowStability => metric::HALTING_RATIO,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RadarCategory::CollisionRisk => "Collision risk",
            RadarCategory::Gridlock => "Gridlock",
            RadarCategory::HarshBraking => "Harsh braking",
            RadarCategory::SpeedCompliance => "Speed compliance",
            RadarCategory::NearMisses => "Near misses",
            RadarCategory::FlowStability => "Flow stability",
        }
    }
}

/// Penalty per unit of each category's KPI.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RadarCoefficients {
    pub collision_density: f64,
    pub teleport_density: f64,
    pub emergency_stop_density: f64,
    pub speed_violation_ratio: f64,
    pub near_miss_density: f64,
    pub halting_ratio: f64,
}

impl Default for RadarCoefficients {
    fn default() -> Self {
        Self {
            collision_density: 50.0,
            teleport_density: 20.0,
            emergency_stop_density: 10.0,
            speed_violation_ratio: 100.0,
            near_miss_density: 20.0,
            halting_ratio: 100.0,
        }
    }
}

impl RadarCoefficients {
    pub fn coefficient(&self, category: RadarCategory) -> f64 {
        match category {
            RadarCategory::CollisionRisk => self.collision_density,
            RadarCategory::Gridlock => self.teleport_density,
            RadarCategory::HarshBraking => self.emergency_stop_density,
            RadarCategory::SpeedCompliance => self.speed_violation_ratio,
            RadarCategory::NearMisses => self.near_miss_density,
            RadarCategory::FlowStability => self.halting_ratio,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RadarScore {
    pub category: RadarCategory,
    pub label: &'static str,
    /// Score in [0, 100]; higher is safer.
    pub score: f64,
}

/// `100 - value * coefficient`, clamped to [0, 100].
pub fn linear_penalty(value: f64, coefficient: f64) -> f64 {
    (100.0 - value * coefficient).clamp(0.0, 100.0)
}

/// Scores each radar category.
pub fn safety_radar(bundle: &KpiBundle, coefficients: &RadarCoefficients) -> ArrayVec<RadarScore, 6> {
    RadarCategory::ALL
        .iter()
        .map(|&category| RadarScore {
            category,
            label: category.label(),
            score: linear_penalty(
                bundle.kpi(category.metric()),
                coefficients.coefficient(category),
            ),
        })
        .collect()
}

/// The overall safety score: the reported one if there is one,
/// otherwise the mean of the radar scores.
pub fn overall_safety_score(bundle: &KpiBundle, radar: &[RadarScore]) -> f64 {
    if let Some(score) = bundle.try_kpi(metric::SAFETY_SCORE) {
        return score.clamp(0.0, 100.0);
    }
    if radar.is_empty() {
        return 100.0;
    }
    radar.iter().map(|r| r.score).sum::<f64>() / radar.len() as f64
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    fn score(radar: &[RadarScore], category: RadarCategory) -> f64 {
        radar.iter().find(|r| r.category == category).unwrap().score
    }

    #[test]
    fn collision_risk_is_clamped() {
        let coefficients = RadarCoefficients::default();
        let bundle = KpiBundle::default().with_kpi(metric::COLLISION_DENSITY, 0.5);
        let radar = safety_radar(&bundle, &coefficients);
        assert_approx_eq!(score(&radar, RadarCategory::CollisionRisk), 75.0);

        let bundle = KpiBundle::default().with_kpi(metric::COLLISION_DENSITY, 3.0);
        let radar = safety_radar(&bundle, &coefficients);
        assert_eq!(score(&radar, RadarCategory::CollisionRisk), 0.0);
    }

    #[test]
    fn clean_run_scores_full_marks() {
        let radar = safety_radar(&KpiBundle::default(), &RadarCoefficients::default());
        assert_eq!(radar.len(), 6);
        assert!(radar.iter().all(|r| r.score == 100.0));
        assert_eq!(overall_safety_score(&KpiBundle::default(), &radar), 100.0);
    }

    #[test]
    fn scores_never_increase_with_their_kpi() {
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vegemite sandwhich is not fun...");
        let coefficients = RadarCoefficients::default();
        for category in RadarCategory::ALL {
            let mut values = (0..50).map(|_| rng.gen_range(0.0..5.0)).collect::<Vec<f64>>();
            values.sort_by(f64::total_cmp);
            let scores = values
                .iter()
                .map(|v| {
                    let bundle = KpiBundle::default().with_kpi(category.metric(), *v);
                    score(&safety_radar(&bundle, &coefficients), category)
                })
                .collect::<Vec<_>>();
            assert!(scores.windows(2).all(|w| w[1] <= w[0]));
            assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
        }
    }

    #[test]
    fn reported_safety_score_wins() {
        let bundle = KpiBundle::default()
            .with_kpi(metric::SAFETY_SCORE, 64.0)
            .with_kpi(metric::COLLISION_DENSITY, 1.0);
        let radar = safety_radar(&bundle, &RadarCoefficients::default());
        assert_eq!(overall_safety_score(&bundle, &radar), 64.0);

        let bundle = KpiBundle::default().with_kpi(metric::COLLISION_DENSITY, 2.0);
        let radar = safety_radar(&bundle, &RadarCoefficients::default());
        assert_approx_eq!(overall_safety_score(&bundle, &radar), 500.0 / 6.0);
    }
}
