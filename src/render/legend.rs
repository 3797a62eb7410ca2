use super::palette::{self, Color, DensityBucket};
use super::{Canvas, ViewMode};
use crate::math::Point2d;
use crate::vehicle::VehicleType;
use smallvec::SmallVec;

const LEFT: f64 = 10.0;
const TOP: f64 = 10.0;
const WIDTH: f64 = 150.0;
const ROW_HEIGHT: f64 = 18.0;
const SWATCH_RADIUS: f64 = 5.0;

/// One row of the legend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LegendEntry {
    pub color: Color,
    pub label: &'static str,
}

/// The legend rows for a view mode.
pub fn entries(mode: ViewMode) -> SmallVec<[LegendEntry; 8]> {
    match mode {
        ViewMode::Vehicles => VehicleType::ALL
            .iter()
            .map(|t| LegendEntry {
                color: palette::vehicle_color(*t),
                label: t.label(),
            })
            .collect(),
        ViewMode::Traffic => DensityBucket::ALL
            .iter()
            .map(|b| LegendEntry {
                color: b.color(),
                label: b.label(),
            })
            .collect(),
        ViewMode::Network => [
            LegendEntry {
                color: palette::ROAD,
                label: "Road",
            },
            LegendEntry {
                color: palette::JUNCTION,
                label: "Junction",
            },
        ]
        .into_iter()
        .collect(),
    }
}

/// Draws the legend in the top-left corner of the canvas.
pub fn draw(canvas: &mut impl Canvas, mode: ViewMode) {
    let entries = entries(mode);
    let origin = Point2d::new(LEFT, TOP);
    let height = ROW_HEIGHT * (entries.len() + 1) as f64 + 4.0;
    canvas.rect(origin, WIDTH, height, palette::LEGEND_BACKGROUND);
    canvas.text(
        Point2d::new(origin.x + 6.0, origin.y + ROW_HEIGHT - 4.0),
        mode.title(),
        palette::TEXT,
    );
    for (row, entry) in entries.iter().enumerate() {
        let y = origin.y + ROW_HEIGHT * (row as f64 + 1.5);
        canvas.circle(Point2d::new(origin.x + 12.0, y), SWATCH_RADIUS, entry.color);
        canvas.text(Point2d::new(origin.x + 24.0, y + 4.0), entry.label, palette::TEXT);
    }
}
