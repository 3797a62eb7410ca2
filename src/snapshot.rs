use crate::live::LiveStats;
use crate::network::NetworkGeometry;
use crate::vehicle::VehicleState;
use serde::{Deserialize, Serialize};

/// One complete update of simulation state pushed by the engine.
///
/// A snapshot supersedes its predecessor entirely; nothing is merged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireSnapshot")]
pub struct SimulationSnapshot {
    /// Simulation time in s.
    pub timestamp: f64,
    pub vehicles: Vec<VehicleState>,
    #[serde(flatten)]
    pub network: NetworkGeometry,
    /// The raw statistics block, in whatever shape the engine sent it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<serde_json::Value>,
}

/// A snapshot as the engine sends it, where the time may appear under
/// several names at once.
#[derive(Deserialize)]
struct WireSnapshot {
    timestamp: Option<f64>,
    simulation_time: Option<f64>,
    time: Option<f64>,
    #[serde(default)]
    vehicles: Vec<VehicleState>,
    #[serde(flatten)]
    network: NetworkGeometry,
    #[serde(default)]
    statistics: Option<serde_json::Value>,
}

impl From<WireSnapshot> for SimulationSnapshot {
    fn from(wire: WireSnapshot) -> Self {
        Self {
            timestamp: wire
                .timestamp
                .or(wire.simulation_time)
                .or(wire.time)
                .unwrap_or_default(),
            vehicles: wire.vehicles,
            network: wire.network,
            statistics: wire.statistics.filter(|value| !value.is_null()),
        }
    }
}

impl SimulationSnapshot {
    /// The snapshot's statistics, normalized.
    /// Returns `None` if there are none or their shape is unknown.
    pub fn stats(&self) -> Option<LiveStats> {
        let raw = self.statistics.as_ref()?;
        LiveStats::normalize(raw).ok()
    }
}
