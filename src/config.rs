//! User-editable simulation configuration.

use crate::error::{Error, Result};
use crate::util::Interval;
use crate::vehicle::VehicleType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How far the vehicle mix fractions may sum away from 1.
const MIX_TOLERANCE: f64 = 0.01;

/// The car-following model the engine should use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CarFollowingModel {
    #[default]
    Krauss,
    #[serde(rename = "IDM")]
    Idm,
    #[serde(rename = "ACC")]
    Acc,
}

/// The lane-change model the engine should use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LaneChangeModel {
    #[default]
    #[serde(rename = "LC2013")]
    Lc2013,
    #[serde(rename = "SL2015")]
    Sl2015,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSelection {
    #[serde(default)]
    pub car_following: CarFollowingModel,
    #[serde(default)]
    pub lane_change: LaneChangeModel,
}

/// Everything the user sets up before launching a run.
///
/// Once a run is launched its configuration is frozen; the controller
/// keeps its own copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    /// The network to simulate, if one has been chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    /// Length of the run in s.
    pub duration: f64,
    /// Simulation step length in s.
    pub step_length: f64,
    /// Demand scaling factor between 0 and 1.
    pub traffic_volume: f64,
    /// The share of each vehicle type in generated traffic.
    pub vehicle_mix: BTreeMap<VehicleType, f64>,
    /// Speed limits in m/s, by edge ID.
    pub speed_limits: BTreeMap<String, f64>,
    /// IDs of closed edges.
    pub road_closures: Vec<String>,
    pub models: ModelSelection,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            network: None,
            duration: 3600.0,
            step_length: 1.0,
            traffic_volume: 0.5,
            vehicle_mix: BTreeMap::from([
                (VehicleType::Passenger, 0.8),
                (VehicleType::Truck, 0.1),
                (VehicleType::Bus, 0.05),
                (VehicleType::Motorcycle, 0.05),
            ]),
            speed_limits: BTreeMap::new(),
            road_closures: vec![],
            models: ModelSelection::default(),
        }
    }
}

impl SimulationConfig {
    /// Checks that the configuration describes a run the engine can perform.
    pub fn validate(&self) -> Result<()> {
        if !(self.duration > 0.0) {
            return Err(invalid(format!("duration must be positive, got {}", self.duration)));
        }
        if !(self.step_length > 0.0) {
            return Err(invalid(format!(
                "step length must be positive, got {}",
                self.step_length
            )));
        }
        if self.step_length > self.duration {
            return Err(invalid("step length is longer than the run"));
        }
        if !Interval::new(0.0, 1.0).contains(self.traffic_volume) {
            return Err(invalid(format!(
                "traffic volume must be between 0 and 1, got {}",
                self.traffic_volume
            )));
        }
        if let Some((vehicle_type, _)) = self.vehicle_mix.iter().find(|(_, share)| **share < 0.0) {
            return Err(invalid(format!(
                "{} share is negative",
                vehicle_type.label()
            )));
        }
        let total = self.vehicle_mix.values().sum::<f64>();
        if !self.vehicle_mix.is_empty() && (total - 1.0).abs() > MIX_TOLERANCE {
            return Err(invalid(format!("vehicle mix sums to {:.2}, not 1", total)));
        }
        if let Some((edge, limit)) = self.speed_limits.iter().find(|(_, limit)| !(**limit > 0.0)) {
            return Err(invalid(format!("speed limit on {} must be positive, got {}", edge, limit)));
        }
        if let Some(edge) = self
            .road_closures
            .iter()
            .find(|edge| self.speed_limits.contains_key(*edge))
        {
            return Err(invalid(format!("{} is closed but has a speed limit", edge)));
        }
        Ok(())
    }

    /// The number of simulation steps in the run.
    pub fn step_count(&self) -> u64 {
        (self.duration / self.step_length).ceil() as u64
    }
}

fn invalid(message: impl Into<String>) -> Error {
    Error::InvalidConfig(message.into())
}
