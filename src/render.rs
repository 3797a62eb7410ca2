//! Drawing of simulation snapshots onto a 2D canvas.

pub use canvas::Canvas;
pub use palette::{Color, DensityBucket};
pub use record::{DrawCommand, RecordingCanvas};

use crate::math::{rot90, Point2d};
use crate::network::{Edge, NetworkGeometry};
use crate::projection::Projection;
use crate::snapshot::SimulationSnapshot;
use serde::{Deserialize, Serialize};

mod canvas;
pub mod legend;
pub mod palette;
mod record;

/// What the map overlays on top of the road network.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Vehicles as coloured dots with a speed vector.
    #[default]
    Vehicles,
    /// Edges coloured by how many vehicles are on them.
    Traffic,
    /// The bare network, with junction labels.
    Network,
}

impl ViewMode {
    pub fn title(self) -> &'static str {
        match self {
            ViewMode::Vehicles => "Vehicle types",
            ViewMode::Traffic => "Traffic density",
            ViewMode::Network => "Road network",
        }
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "vehicles" => Ok(ViewMode::Vehicles),
            "traffic" => Ok(ViewMode::Traffic),
            "network" => Ok(ViewMode::Network),
            other => Err(format!("unknown view mode `{}`", other)),
        }
    }
}

/// How an edge finds the two points it is drawn between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeResolution {
    /// Look up the edge's `from` and `to` junctions; edges that don't resolve are skipped.
    #[default]
    Endpoints,
    /// Draw every edge between the first two junctions of the network.
    /// Only useful to reproduce the old dashboard's output.
    FirstTwoJunctions,
}

/// Per-frame view options.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub mode: ViewMode,
    pub show_grid: bool,
    #[serde(default)]
    pub edge_resolution: EdgeResolution,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            mode: ViewMode::Vehicles,
            show_grid: true,
            edge_resolution: EdgeResolution::Endpoints,
        }
    }
}

/// Sizes used when drawing, in px.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderStyle {
    pub grid_spacing: f64,
    pub padding: f64,
    pub road_width: f64,
    pub density_road_width: f64,
    pub junction_radius: f64,
    pub vehicle_radius: f64,
    /// Length of a vehicle's speed vector per m/s of speed.
    pub speed_vector_scale: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            grid_spacing: 50.0,
            padding: 50.0,
            road_width: 2.0,
            density_road_width: 4.0,
            junction_radius: 4.0,
            vehicle_radius: 3.0,
            speed_vector_scale: 1.5,
        }
    }
}

/// Draws one frame of the map.
///
/// Rendering never fails: layers whose data is missing are left out.
#[derive(Clone, Debug, Default)]
pub struct FrameRenderer {
    style: RenderStyle,
}

impl FrameRenderer {
    pub fn new(style: RenderStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Draws a complete frame: background, grid, roads, the mode overlay, then the legend.
    pub fn render<C: Canvas>(
        &self,
        canvas: &mut C,
        snapshot: Option<&SimulationSnapshot>,
        options: &RenderOptions,
    ) {
        let (width, height) = canvas.size();
        canvas.clear(palette::BACKGROUND);
        if options.show_grid {
            self.draw_grid(canvas, width, height);
        }

        if let Some(snapshot) = snapshot {
            let network = &snapshot.network;
            let proj = Projection::fit(
                network.junction_positions(),
                width,
                height,
                self.style.padding,
            );
            self.draw_network(canvas, network, &proj, options);
            match options.mode {
                ViewMode::Vehicles => self.draw_vehicles(canvas, snapshot, &proj),
                ViewMode::Traffic => self.draw_density(canvas, network, &proj, options),
                ViewMode::Network => self.draw_junction_labels(canvas, network, &proj),
            }
        }

        legend::draw(canvas, options.mode);
    }

    fn draw_grid<C: Canvas>(&self, canvas: &mut C, width: f64, height: f64) {
        let spacing = self.style.grid_spacing;
        if spacing <= 0.0 {
            return;
        }
        let columns = (width / spacing).floor() as usize;
        let rows = (height / spacing).floor() as usize;
        for i in 0..=columns {
            let x = i as f64 * spacing;
            canvas.line(
                Point2d::new(x, 0.0),
                Point2d::new(x, height),
                palette::GRID,
                1.0,
            );
        }
        for i in 0..=rows {
            let y = i as f64 * spacing;
            canvas.line(
                Point2d::new(0.0, y),
                Point2d::new(width, y),
                palette::GRID,
                1.0,
            );
        }
    }

    /// Roads as plain lines, with junctions on top.
    fn draw_network<C: Canvas>(
        &self,
        canvas: &mut C,
        network: &NetworkGeometry,
        proj: &Projection,
        options: &RenderOptions,
    ) {
        for edge in &network.edges {
            if let Some([from, to]) = edge_points(network, edge, options.edge_resolution) {
                canvas.line(
                    proj.apply(from),
                    proj.apply(to),
                    palette::ROAD,
                    self.style.road_width,
                );
            }
        }
        for junction in &network.junctions {
            canvas.circle(
                proj.apply(junction.position()),
                self.style.junction_radius,
                palette::JUNCTION,
            );
        }
    }

    fn draw_vehicles<C: Canvas>(
        &self,
        canvas: &mut C,
        snapshot: &SimulationSnapshot,
        proj: &Projection,
    ) {
        for vehicle in &snapshot.vehicles {
            let color = palette::vehicle_color(vehicle.vehicle_type);
            let centre = proj.apply(vehicle.position());
            canvas.circle(centre, self.style.vehicle_radius, color);

            let length = vehicle.speed() * self.style.speed_vector_scale;
            if length > 0.0 {
                let dir = vehicle.direction();
                let tip = centre + dir * (self.style.vehicle_radius + length);
                canvas.line(centre, tip, color, 1.0);
                // Arrow head
                let back = tip - dir * 3.0;
                let side = rot90(dir) * 2.0;
                canvas.line(tip, back + side, color, 1.0);
                canvas.line(tip, back - side, color, 1.0);
            }
        }
    }

    fn draw_density<C: Canvas>(
        &self,
        canvas: &mut C,
        network: &NetworkGeometry,
        proj: &Projection,
        options: &RenderOptions,
    ) {
        for edge in &network.edges {
            if let Some([from, to]) = edge_points(network, edge, options.edge_resolution) {
                let color = DensityBucket::classify(edge.vehicle_count).color();
                canvas.line(
                    proj.apply(from),
                    proj.apply(to),
                    color,
                    self.style.density_road_width,
                );
            }
        }
    }

    fn draw_junction_labels<C: Canvas>(
        &self,
        canvas: &mut C,
        network: &NetworkGeometry,
        proj: &Projection,
    ) {
        let offset = self.style.junction_radius + 2.0;
        for junction in &network.junctions {
            let at = proj.apply(junction.position());
            canvas.text(
                Point2d::new(at.x + offset, at.y - offset),
                &junction.id,
                palette::TEXT,
            );
        }
    }
}

/// Finds the points to draw an edge between.
fn edge_points(
    network: &NetworkGeometry,
    edge: &Edge,
    resolution: EdgeResolution,
) -> Option<[Point2d; 2]> {
    match resolution {
        EdgeResolution::Endpoints => {
            let points = network.endpoints(edge);
            if points.is_none() {
                log::debug!(
                    "edge {} references unknown junctions ({} -> {})",
                    edge.id,
                    edge.from,
                    edge.to
                );
            }
            points
        }
        EdgeResolution::FirstTwoJunctions => match network.junctions.as_slice() {
            [a, b, ..] => Some([a.position(), b.position()]),
            _ => None,
        },
    }
}
