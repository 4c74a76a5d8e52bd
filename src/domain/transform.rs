//! Mapping between the world frame (meters, y-up) and the display frame (pixels, y-down, origin
//! in the top left corner of the drawing surface).

use super::Position;

/// Point in the display frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Pixel {
    pub x: f64,
    pub y: f64,
}

impl Pixel {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Pixel> for (f32, f32) {
    fn from(value: Pixel) -> Self {
        (value.x as f32, value.y as f32)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct DisplayTransform {
    meter_to_pixel: f64,
    surface_height: f64,
}

impl DisplayTransform {
    pub const fn new(meter_to_pixel: f64, surface_height: f64) -> Self {
        Self {
            meter_to_pixel,
            surface_height,
        }
    }

    pub fn to_display(&self, position: Position) -> Pixel {
        Pixel::new(
            position.x() * self.meter_to_pixel,
            self.surface_height - position.y() * self.meter_to_pixel,
        )
    }

    pub fn to_world(&self, pixel: Pixel) -> Position {
        Position::new(
            pixel.x / self.meter_to_pixel,
            (self.surface_height - pixel.y) / self.meter_to_pixel,
        )
    }

    /// Scales a length, e.g. a radius, without flipping.
    pub fn length_to_display(&self, meters: f64) -> f64 {
        meters * self.meter_to_pixel
    }
}
