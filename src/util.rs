//! Miscellaneous utility structs and functions.

use std::fmt::Debug;

use crate::math::Point2d;
use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};

/// An interval on the real number line.
#[derive(Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval<T> {
    pub min: T,
    pub max: T,
}

impl<T> Interval<T> {
    /// Creates a new interval.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: std::cmp::PartialOrd> Interval<T> {
    /// Returns true if this interval contains the value.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }
}

impl<T: std::ops::Sub<T, Output = T> + Copy> Interval<T> {
    /// Gets the magnitude of the interval.
    pub fn length(&self) -> T {
        self.max - self.min
    }
}

impl Interval<f64> {
    /// The smallest interval containing all the values, if there are any.
    pub fn enclosing(values: impl Iterator<Item = f64>) -> Option<Self> {
        match values.minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some(Self::new(v, v)),
            MinMaxResult::MinMax(min, max) => Some(Self::new(min, max)),
        }
    }
}

impl<T: Debug> Debug for Interval<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interval({:?}, {:?})", &self.min, &self.max)
    }
}

/// An axis-aligned bounding box.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds2d {
    pub x: Interval<f64>,
    pub y: Interval<f64>,
}

impl Bounds2d {
    /// The bounding box of a set of points, or `None` if there are no points.
    pub fn from_points(points: impl Iterator<Item = Point2d> + Clone) -> Option<Self> {
        Some(Self {
            x: Interval::enclosing(points.clone().map(|p| p.x))?,
            y: Interval::enclosing(points.map(|p| p.y))?,
        })
    }

    /// The width and height of the box.
    pub fn span(&self) -> (f64, f64) {
        (self.x.length(), self.y.length())
    }
}

/// Deserializers for numbers that the backend sometimes sends as `null`,
/// or as floats where a count is meant.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    /// Rounds a reported count, clamping negatives to 0.
    pub fn to_count(value: f64) -> u32 {
        value.max(0.0).round() as u32
    }

    pub fn number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or_default())
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?
            .map(to_count)
            .unwrap_or_default())
    }
}
