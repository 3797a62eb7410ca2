//! Mathematical types and functions.

use cgmath::{Point2, Vector2};

/// A 2D point
pub type Point2d = Point2<f64>;

/// A 2D vector
pub type Vector2d = Vector2<f64>;

/// Converts a compass heading into a unit vector in canvas space.
///
/// Headings are in degrees, with 0 pointing north (towards the top of the
/// canvas) and increasing clockwise. Canvas space has its y-axis pointing down.
pub fn heading_vector(degrees: f64) -> Vector2d {
    let rad = degrees.to_radians();
    Vector2d::new(rad.sin(), -rad.cos())
}

/// Rotates a vector 90 degrees clockwise.
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}
