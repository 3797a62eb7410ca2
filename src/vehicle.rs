use crate::math::{heading_vector, Point2d, Vector2d};
use serde::{Deserialize, Serialize};

/// The class of a vehicle, as reported by the simulation engine.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum VehicleType {
    #[default]
    #[serde(alias = "car")]
    Passenger,
    Truck,
    Bus,
    Motorcycle,
    Bicycle,
    Emergency,
    /// Any type the console has no specific styling for.
    #[serde(other)]
    Other,
}

impl VehicleType {
    /// All vehicle types, in legend order.
    pub const ALL: [VehicleType; 7] = [
        VehicleType::Passenger,
        VehicleType::Truck,
        VehicleType::Bus,
        VehicleType::Motorcycle,
        VehicleType::Bicycle,
        VehicleType::Emergency,
        VehicleType::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VehicleType::Passenger => "Passenger",
            VehicleType::Truck => "Truck",
            VehicleType::Bus => "Bus",
            VehicleType::Motorcycle => "Motorcycle",
            VehicleType::Bicycle => "Bicycle",
            VehicleType::Emergency => "Emergency",
            VehicleType::Other => "Other",
        }
    }
}

/// The state of a single vehicle at one simulation tick.
///
/// Vehicle states are never updated in place; each snapshot carries a fresh list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    pub id: String,
    pub x: f64,
    pub y: f64,
    /// Speed in m/s.
    #[serde(default)]
    pub speed: f64,
    /// Compass heading in degrees (0 = north, clockwise).
    #[serde(default)]
    pub angle: f64,
    #[serde(default, rename = "type")]
    pub vehicle_type: VehicleType,
}

impl VehicleState {
    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }

    /// Speed clamped to be non-negative.
    pub fn speed(&self) -> f64 {
        self.speed.max(0.0)
    }

    /// A unit vector along the vehicle's heading, in canvas space.
    pub fn direction(&self) -> Vector2d {
        heading_vector(self.angle)
    }
}
