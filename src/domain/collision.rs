//! Ray casting against basic obstacle shapes.

use thiserror::Error;

use super::{Angle, Position};

const EPSILON: f64 = 1e-9;
const UNIT_TOLERANCE: f64 = 1e-6;

/// Half-line starting at `origin` and extending along the unit vector `direction`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Ray {
    pub origin: Position,
    pub direction: Position,
}

impl Ray {
    pub fn new(origin: Position, heading: Angle) -> Self {
        Self {
            origin,
            direction: heading.direction(),
        }
    }

    pub fn point_at(&self, distance: f64) -> Position {
        self.origin + self.direction * distance
    }

    fn validate(&self) -> Result<(), GeometryError> {
        let length = self.direction.norm();
        if (length - 1.0).abs() > UNIT_TOLERANCE || !length.is_finite() {
            return Err(GeometryError::NonUnitDirection(length));
        }
        Ok(())
    }
}

#[derive(Error, Clone, Copy, Debug, PartialEq)]
pub enum GeometryError {
    #[error("degenerate geometry: zero-length line segment at ({0}, {1})")]
    ZeroLengthSegment(f64, f64),
    #[error("degenerate geometry: beam direction has length {0}, expected 1")]
    NonUnitDirection(f64),
    #[error("degenerate geometry: invalid circle radius {0}")]
    InvalidRadius(f64),
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum Shape {
    Circle { center: Position, radius: f64 },
    Segment { p1: Position, p2: Position },
}

impl Shape {
    pub fn validate(&self) -> Result<(), GeometryError> {
        match *self {
            Shape::Circle { radius, .. } => {
                if radius.is_finite() && radius > 0.0 {
                    Ok(())
                } else {
                    Err(GeometryError::InvalidRadius(radius))
                }
            }
            Shape::Segment { p1, p2 } => {
                if p1.distance(p2) > EPSILON {
                    Ok(())
                } else {
                    Err(GeometryError::ZeroLengthSegment(p1.x(), p1.y()))
                }
            }
        }
    }

    /// Distance from the ray origin to the first point of the shape along the ray.
    ///
    /// `Ok(None)` means the ray misses the shape. A ray starting on the boundary reports
    /// `Some(0.0)`.
    pub fn distance_along(&self, ray: &Ray) -> Result<Option<f64>, GeometryError> {
        self.validate()?;
        ray.validate()?;

        Ok(match *self {
            Shape::Circle { center, radius } => intersect_circle(ray, center, radius),
            Shape::Segment { p1, p2 } => intersect_segment(ray, p1, p2),
        })
    }
}

/// Smallest non-negative root of |origin + t * direction - center| = radius.
fn intersect_circle(ray: &Ray, center: Position, radius: f64) -> Option<f64> {
    let offset = ray.origin - center;
    let b = offset.dot(ray.direction);
    let c = offset.dot(offset) - radius * radius;
    let discriminant = b * b - c;

    if discriminant < 0.0 {
        return None;
    }

    let root = discriminant.sqrt();
    let near = -b - root;
    let far = -b + root;

    if near >= 0.0 {
        Some(near)
    } else if far >= 0.0 {
        // Ray origin lies inside the circle
        Some(far)
    } else {
        None
    }
}

fn intersect_segment(ray: &Ray, p1: Position, p2: Position) -> Option<f64> {
    let edge = p2 - p1;
    let to_start = p1 - ray.origin;
    let denominator = ray.direction.cross(edge);

    if denominator.abs() < EPSILON {
        // Ray and segment are parallel
        if to_start.cross(ray.direction).abs() > EPSILON {
            return None;
        }
        let t1 = to_start.dot(ray.direction);
        let t2 = (p2 - ray.origin).dot(ray.direction);
        let (t_min, t_max) = (t1.min(t2), t1.max(t2));
        return if t_max < 0.0 {
            None
        } else {
            Some(t_min.max(0.0))
        };
    }

    let t = to_start.cross(edge) / denominator;
    let u = to_start.cross(ray.direction) / denominator;

    if t >= 0.0 && (-EPSILON..=1.0 + EPSILON).contains(&u) {
        Some(t)
    } else {
        None
    }
}
