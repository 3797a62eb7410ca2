//! Mapping of network coordinates onto the canvas.

use crate::math::Point2d;
use crate::util::Bounds2d;

/// The span used on an axis along which every junction lies at the same coordinate.
pub const FALLBACK_SPAN: f64 = 500.0;

/// The fraction of the canvas the network is scaled to fill.
pub const FILL_FACTOR: f64 = 0.8;

/// A uniform scale-and-offset from network space to canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Pixels per network unit.
    pub scale: f64,
    /// The offset added on both axes after scaling, in px.
    pub padding: f64,
}

impl Projection {
    /// A projection that only applies the padding offset.
    pub const fn identity(padding: f64) -> Self {
        Self {
            scale: 1.0,
            padding,
        }
    }

    /// Fits the given junction positions to a canvas of `width` by `height` pixels.
    ///
    /// With fewer than two positions there is nothing to fit, and the
    /// projection is the identity plus padding.
    pub fn fit(
        positions: impl Iterator<Item = Point2d> + Clone,
        width: f64,
        height: f64,
        padding: f64,
    ) -> Self {
        if positions.clone().take(2).count() < 2 {
            return Self::identity(padding);
        }
        let Some(bounds) = Bounds2d::from_points(positions) else {
            return Self::identity(padding);
        };
        let (span_x, span_y) = bounds.span();
        let span_x = if span_x > 0.0 { span_x } else { FALLBACK_SPAN };
        let span_y = if span_y > 0.0 { span_y } else { FALLBACK_SPAN };
        let scale = f64::min(width / span_x, height / span_y) * FILL_FACTOR;
        Self { scale, padding }
    }

    /// Maps a network position to a pixel position.
    pub fn apply(&self, position: Point2d) -> Point2d {
        Point2d::new(
            position.x * self.scale + self.padding,
            position.y * self.scale + self.padding,
        )
    }
}
