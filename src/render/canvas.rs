use super::Color;
use crate::math::Point2d;

/// A 2D drawing surface in pixel coordinates, with the origin at the top left.
pub trait Canvas {
    /// The width and height of the surface in px.
    fn size(&self) -> (f64, f64);

    /// Fills the whole surface with a colour.
    fn clear(&mut self, color: Color);

    /// Strokes a straight line.
    fn line(&mut self, from: Point2d, to: Point2d, color: Color, width: f64);

    /// Fills a circle.
    fn circle(&mut self, centre: Point2d, radius: f64, color: Color);

    /// Fills an axis-aligned rectangle.
    fn rect(&mut self, origin: Point2d, width: f64, height: f64, color: Color);

    /// Draws a line of text with its baseline starting at `at`.
    fn text(&mut self, at: Point2d, text: &str, color: Color);
}

impl<T: Canvas + ?Sized> Canvas for &mut T {
    fn size(&self) -> (f64, f64) {
        (**self).size()
    }

    fn clear(&mut self, color: Color) {
        (**self).clear(color)
    }

    fn line(&mut self, from: Point2d, to: Point2d, color: Color, width: f64) {
        (**self).line(from, to, color, width)
    }

    fn circle(&mut self, centre: Point2d, radius: f64, color: Color) {
        (**self).circle(centre, radius, color)
    }

    fn rect(&mut self, origin: Point2d, width: f64, height: f64, color: Color) {
        (**self).rect(origin, width, height, color)
    }

    fn text(&mut self, at: Point2d, text: &str, color: Color) {
        (**self).text(at, text, color)
    }
}
