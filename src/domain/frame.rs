//! Output of a simulation step: telemetry for the command channel and drawing primitives in the
//! display frame for the renderer.

use super::{Angle, Pixel};

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Robot symbol centered on the robot, rotated by its heading.
    Sprite {
        name: String,
        center: Pixel,
        orientation: Angle,
    },
    /// Outline of a robot's footprint as seen by the other robots.
    Circle { center: Pixel, radius: f64 },
    Wall { start: Pixel, end: Pixel },
    /// ToF beam from the sensor to its hit point, or to maximum range if nothing was hit.
    Beam { start: Pixel, end: Pixel, hit: bool },
}

/// Distances of one robot's ToF beams in meters, 0 for beams without a hit.
#[derive(Clone, Debug, PartialEq)]
pub struct Telemetry {
    pub name: String,
    pub distances: Vec<f64>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub telemetry: Vec<Telemetry>,
    pub primitives: Vec<Primitive>,
    /// Names of the robots that were put back to their spawn pose.
    pub resets: Vec<String>,
}

impl Frame {
    pub fn sprites(&self) -> impl Iterator<Item = (&str, Pixel, Angle)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Sprite {
                name,
                center,
                orientation,
            } => Some((name.as_str(), *center, *orientation)),
            _ => None,
        })
    }
}
