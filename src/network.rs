use crate::math::Point2d;
use serde::{Deserialize, Serialize};

/// A junction (node) of the road network.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Junction {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A road segment joining two junctions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    /// The ID of the junction the edge starts at.
    #[serde(default)]
    pub from: String,
    /// The ID of the junction the edge ends at.
    #[serde(default)]
    pub to: String,
    /// The number of vehicles currently on the edge.
    #[serde(default, alias = "vehicleCount")]
    pub vehicle_count: u32,
}

/// The road network as reported by the simulation engine.
///
/// Edge endpoints are expected to name existing junctions, but the engine
/// does not guarantee it; see [NetworkGeometry::dangling_edges].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkGeometry {
    #[serde(default)]
    pub junctions: Vec<Junction>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Junction {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }

    pub fn position(&self) -> Point2d {
        Point2d::new(self.x, self.y)
    }
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        vehicle_count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            from: from.into(),
            to: to.into(),
            vehicle_count,
        }
    }
}

impl NetworkGeometry {
    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty() && self.edges.is_empty()
    }

    /// Finds a junction by ID.
    pub fn junction(&self, id: &str) -> Option<&Junction> {
        self.junctions.iter().find(|j| j.id == id)
    }

    /// The positions of all junctions, in order.
    pub fn junction_positions(&self) -> impl Iterator<Item = Point2d> + Clone + '_ {
        self.junctions.iter().map(Junction::position)
    }

    /// Looks up the positions of both ends of an edge.
    pub fn endpoints(&self, edge: &Edge) -> Option<[Point2d; 2]> {
        let from = self.junction(&edge.from)?;
        let to = self.junction(&edge.to)?;
        Some([from.position(), to.position()])
    }

    /// The edges whose endpoints do not name a known junction.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.edges
            .iter()
            .filter(move |edge| self.endpoints(edge).is_none())
    }
}
