//! Time-of-flight sensor ring: per-beam readings and their resolution to hit points.

use super::{GeometryError, Position, Ray, Shape};

/// Per-beam distances of one robot. `None` marks a beam without a usable hit.
#[derive(Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct Reading(Vec<Option<f64>>);

impl Reading {
    pub fn empty(beam_count: usize) -> Self {
        Self(vec![None; beam_count])
    }

    /// Folds the candidates of every obstacle into a reading, starting from all beams empty.
    pub fn sense(rays: &[Ray], obstacles: &[Shape]) -> (Self, Vec<GeometryError>) {
        obstacles.iter().fold(
            (Self::empty(rays.len()), vec![]),
            |(reading, mut faults), obstacle| {
                let candidates = rays
                    .iter()
                    .map(|ray| {
                        obstacle.distance_along(ray).unwrap_or_else(|e| {
                            faults.push(e);
                            None
                        })
                    })
                    .collect::<Vec<_>>();
                (reading.merged(&candidates), faults)
            },
        )
    }

    /// Keeps, per beam, the smaller positive distance of the stored value and the candidate.
    pub fn merged(self, candidates: &[Option<f64>]) -> Self {
        Self(
            self.0
                .into_iter()
                .zip(candidates.iter().copied().chain(std::iter::repeat(None)))
                .map(|(stored, candidate)| match (stored, candidate) {
                    (Some(s), Some(c)) if c > 0.0 && c < s => Some(c),
                    (None, Some(c)) if c > 0.0 => Some(c),
                    (stored, _) => stored,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn distances(&self) -> &[Option<f64>] {
        &self.0
    }

    /// Smallest distance over all beams, infinity if no beam hit anything.
    pub fn min_distance(&self) -> f64 {
        self.0
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Flat representation for publication; beams without a hit are reported as 0.
    pub fn to_telemetry(&self) -> Vec<f64> {
        self.0.iter().map(|d| d.unwrap_or(0.0)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub enum HitPoint {
    Hit(Position),
    /// End of the beam at maximum range.
    Miss(Position),
}

impl HitPoint {
    pub fn position(&self) -> Position {
        match self {
            HitPoint::Hit(p) | HitPoint::Miss(p) => *p,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, HitPoint::Hit(_))
    }
}

/// Result of sensing all obstacles with every beam of a robot.
#[derive(Clone, Debug, PartialEq)]
pub struct Sweep {
    rays: Vec<Ray>,
    reading: Reading,
    faults: Vec<GeometryError>,
}

impl Sweep {
    pub fn new(rays: Vec<Ray>, obstacles: &[Shape]) -> Self {
        let (reading, faults) = Reading::sense(&rays, obstacles);
        Self {
            rays,
            reading,
            faults,
        }
    }

    pub fn rays(&self) -> &[Ray] {
        &self.rays
    }

    pub fn reading(&self) -> &Reading {
        &self.reading
    }

    pub fn into_reading(self) -> Reading {
        self.reading
    }

    /// Geometry errors encountered while sensing; the affected beams count as misses.
    pub fn faults(&self) -> &[GeometryError] {
        &self.faults
    }

    pub fn hit_points(&self, max_range: f64) -> Vec<HitPoint> {
        self.rays
            .iter()
            .zip(self.reading.distances())
            .map(|(ray, distance)| match distance {
                Some(d) => HitPoint::Hit(ray.point_at(*d)),
                None => HitPoint::Miss(ray.point_at(max_range)),
            })
            .collect()
    }
}
