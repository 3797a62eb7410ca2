//! A canvas that records what is drawn on it.

use super::{Canvas, Color};
use crate::math::Point2d;
use serde::Serialize;

/// A single drawing operation.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    Line {
        p1: [f64; 2],
        p2: [f64; 2],
        color: Color,
        width: f64,
    },
    Circle {
        centre: [f64; 2],
        radius: f64,
        color: Color,
    },
    Rect {
        origin: [f64; 2],
        width: f64,
        height: f64,
        color: Color,
    },
    Text {
        at: [f64; 2],
        text: String,
        color: Color,
    },
}

/// A [Canvas] which keeps a list of the commands drawn since it was last cleared.
#[derive(Clone, Debug)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            commands: vec![],
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Takes the recorded commands, leaving the canvas empty.
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Gets the recorded commands as a JSON array.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!(self.commands)
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self, color: Color) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn line(&mut self, p1: Point2d, p2: Point2d, color: Color, width: f64) {
        self.commands.push(DrawCommand::Line {
            p1: [p1.x, p1.y],
            p2: [p2.x, p2.y],
            color,
            width,
        });
    }

    fn circle(&mut self, centre: Point2d, radius: f64, color: Color) {
        self.commands.push(DrawCommand::Circle {
            centre: [centre.x, centre.y],
            radius,
            color,
        });
    }

    fn rect(&mut self, origin: Point2d, width: f64, height: f64, color: Color) {
        self.commands.push(DrawCommand::Rect {
            origin: [origin.x, origin.y],
            width,
            height,
            color,
        });
    }

    fn text(&mut self, at: Point2d, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            at: [at.x, at.y],
            text: text.to_owned(),
            color,
        });
    }
}
