//! Fixed colours used by the map.

use crate::vehicle::VehicleType;
use serde::{Serialize, Serializer};
use std::fmt;

/// An opaque RGB colour.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const BACKGROUND: Color = Color::rgb(0xf8, 0xf9, 0xfa);
pub const GRID: Color = Color::rgb(0xe5, 0xe7, 0xeb);
pub const ROAD: Color = Color::rgb(0x6b, 0x72, 0x80);
pub const JUNCTION: Color = Color::rgb(0x37, 0x41, 0x51);
pub const LEGEND_BACKGROUND: Color = Color::rgb(0xff, 0xff, 0xff);
pub const TEXT: Color = Color::rgb(0x11, 0x18, 0x27);

pub const GREEN: Color = Color::rgb(0x22, 0xc5, 0x5e);
pub const YELLOW: Color = Color::rgb(0xea, 0xb3, 0x08);
pub const RED: Color = Color::rgb(0xef, 0x44, 0x44);

/// The colour a vehicle of the given type is drawn in.
pub fn vehicle_color(vehicle_type: VehicleType) -> Color {
    match vehicle_type {
        VehicleType::Passenger => Color::rgb(0x3b, 0x82, 0xf6),
        VehicleType::Truck => Color::rgb(0xf9, 0x73, 0x16),
        VehicleType::Bus => Color::rgb(0x10, 0xb9, 0x81),
        VehicleType::Motorcycle => Color::rgb(0x8b, 0x5c, 0xf6),
        VehicleType::Bicycle => Color::rgb(0x06, 0xb6, 0xd4),
        VehicleType::Emergency => Color::rgb(0xdc, 0x26, 0x26),
        VehicleType::Other => Color::rgb(0x9c, 0xa3, 0xaf),
    }
}

/// Occupancy class of an edge, used to colour it in traffic mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DensityBucket {
    Low,
    Medium,
    High,
}

impl DensityBucket {
    /// Edges with more vehicles than this are at least medium density.
    pub const MEDIUM_ABOVE: u32 = 5;
    /// Edges with more vehicles than this are high density.
    pub const HIGH_ABOVE: u32 = 10;

    pub const ALL: [DensityBucket; 3] = [DensityBucket::Low, DensityBucket::Medium, DensityBucket::High];

    pub fn classify(vehicle_count: u32) -> Self {
        if vehicle_count > Self::HIGH_ABOVE {
            DensityBucket::High
        } else if vehicle_count > Self::MEDIUM_ABOVE {
            DensityBucket::Medium
        } else {
            DensityBucket::Low
        }
    }

    pub fn color(self) -> Color {
        match self {
            DensityBucket::Low => GREEN,
            DensityBucket::Medium => YELLOW,
            DensityBucket::High => RED,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DensityBucket::Low => "Low (0-5)",
            DensityBucket::Medium => "Medium (6-10)",
            DensityBucket::High => "High (>10)",
        }
    }
}
