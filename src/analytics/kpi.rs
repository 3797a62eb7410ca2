use crate::util::lenient;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names of the scalar KPIs reported for a run.
pub mod metric {
    /// Average speed in m/s.
    pub const AVG_SPEED: &str = "avg_speed";
    /// Vehicles completing their trip per hour.
    pub const THROUGHPUT: &str = "throughput";
    /// Overall safety score in [0, 100].
    pub const SAFETY_SCORE: &str = "safety_score";
    /// Collisions per vehicle.
    pub const COLLISION_DENSITY: &str = "collision_density";
    /// Teleports per vehicle.
    pub const TELEPORT_DENSITY: &str = "teleport_density";
    /// Total number of emergency stops.
    pub const EMERGENCY_STOPS: &str = "emergency_stops";
    /// Emergency stops per vehicle.
    pub const EMERGENCY_STOP_DENSITY: &str = "emergency_stop_density";
    /// Fraction of vehicle time spent above the speed limit.
    pub const SPEED_VIOLATION_RATIO: &str = "speed_violation_ratio";
    /// Near misses per vehicle.
    pub const NEAR_MISS_DENSITY: &str = "near_miss_density";
    /// Fraction of vehicle time spent halted.
    pub const HALTING_RATIO: &str = "halting_ratio";
    /// Total CO2 emitted in g.
    pub const CO2_EMISSIONS: &str = "co2_emissions";
}

/// One tick of a run's time series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSample {
    /// Simulation time in s.
    #[serde(alias = "timestamp", alias = "step", deserialize_with = "lenient::number")]
    pub time: f64,
    #[serde(
        alias = "running_vehicles",
        alias = "active_vehicles",
        deserialize_with = "lenient::number"
    )]
    pub vehicle_count: f64,
    /// Average speed in m/s.
    #[serde(deserialize_with = "lenient::number")]
    pub avg_speed: f64,
    #[serde(deserialize_with = "lenient::number")]
    pub throughput: f64,
    /// Mean waiting time in s.
    #[serde(deserialize_with = "lenient::number")]
    pub waiting_time: f64,
    /// Distance travelled in m.
    #[serde(deserialize_with = "lenient::number")]
    pub distance: f64,
    /// CO2 emitted in g.
    #[serde(deserialize_with = "lenient::number")]
    pub co2: f64,
    #[serde(deserialize_with = "lenient::count")]
    pub collisions: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub teleports: u32,
    #[serde(deserialize_with = "lenient::count")]
    pub emergency_stops: u32,
}

/// The KPIs and time series the backend reports for a run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct KpiBundle {
    #[serde(default, alias = "metrics")]
    pub kpis: BTreeMap<String, f64>,
    #[serde(default, alias = "timeSeries")]
    pub time_series: Vec<TimeSample>,
}

impl KpiBundle {
    /// Gets a KPI, or 0 if it wasn't reported.
    pub fn kpi(&self, name: &str) -> f64 {
        self.try_kpi(name).unwrap_or(0.0)
    }

    pub fn try_kpi(&self, name: &str) -> Option<f64> {
        self.kpis.get(name).copied().filter(|v| v.is_finite())
    }

    /// Sets a KPI, returning the bundle.
    pub fn with_kpi(mut self, name: &str, value: f64) -> Self {
        self.kpis.insert(name.to_owned(), value);
        self
    }
}
