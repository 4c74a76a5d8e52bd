//! Basic building blocks.

use std::{
    f64::consts::{PI, TAU},
    ops::{Add, Mul, Sub},
};

/// Point or free vector in the world frame (meters, y-up).
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn distance(&self, position: Self) -> f64 {
        (*self - position).norm()
    }

    pub fn norm(&self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3D cross product.
    pub fn cross(&self, other: Self) -> f64 {
        self.x * other.y - self.y * other.x
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}

impl Mul<f64> for Position {
    type Output = Position;

    fn mul(self, rhs: f64) -> Self::Output {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Angle(f64);

impl Angle {
    pub const fn new(radians: f64) -> Self {
        Self(radians)
    }

    pub fn from_deg(degree: f64) -> Self {
        Self(degree * PI / 180.0)
    }

    pub fn normalized(self) -> Self {
        Self(self.0.rem_euclid(TAU))
    }

    /// Unit vector pointing along the angle.
    pub fn direction(self) -> Position {
        let (sin, cos) = self.0.sin_cos();
        Position::new(cos, sin)
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<Angle> for f64 {
    fn from(value: Angle) -> Self {
        value.0
    }
}

impl From<Angle> for f32 {
    fn from(value: Angle) -> Self {
        value.0 as f32
    }
}

/// Position and heading of a robot in the world frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Pose {
    pub position: Position,
    pub heading: Angle,
}

impl Pose {
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Self {
            position: Position::new(x, y),
            heading: Angle::new(theta),
        }
    }
}

/// Body-frame velocity command: forward, leftward and angular velocity.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Twist {
    pub vx: f64,
    pub vy: f64,
    pub omega: f64,
}

impl Twist {
    pub const fn new(vx: f64, vy: f64, omega: f64) -> Self {
        Self { vx, vy, omega }
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::{assert_abs_diff_eq, AbsDiffEq};
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_position() {
        let position = Position::new(1.0, 2.0);
        assert_abs_diff_eq!(position.x(), 1.0);
        assert_abs_diff_eq!(position.y(), 2.0);
    }

    #[test]
    fn test_position_products() {
        let a = Position::new(1.0, 2.0);
        let b = Position::new(3.0, -1.0);
        assert_abs_diff_eq!(a.dot(b), 1.0);
        assert_abs_diff_eq!(a.cross(b), -7.0);
        assert_abs_diff_eq!(b.cross(a), 7.0);
        assert_abs_diff_eq!(Position::new(3.0, 4.0).norm(), 5.0);
    }

    #[rstest]
    #[case::zero(       0.0,        0.0)]
    #[case::negative(  -0.5 * PI,   1.5 * PI)]
    #[case::full_turn(  2.5 * PI,   0.5 * PI)]
    fn test_angle_normalized(#[case] radians: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(
            Angle::new(radians).normalized(),
            Angle::new(expected),
            epsilon = 1e-12
        );
    }

    #[rstest]
    #[case(Angle::new(0.0), Position::new(1.0, 0.0))]
    #[case(Angle::new(0.5 * PI), Position::new(0.0, 1.0))]
    #[case(Angle::new(PI), Position::new(-1.0, 0.0))]
    fn test_angle_direction(#[case] angle: Angle, #[case] expected: Position) {
        assert_abs_diff_eq!(angle.direction(), expected, epsilon = 2.0 * f64::EPSILON);
    }

    impl AbsDiffEq for Position {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            f64::abs_diff_eq(&self.x, &other.x, epsilon)
                && f64::abs_diff_eq(&self.y, &other.y, epsilon)
        }
    }

    impl AbsDiffEq for Angle {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            f64::abs_diff_eq(&self.0, &other.0, epsilon)
        }
    }

    impl AbsDiffEq for Pose {
        type Epsilon = f64;

        fn default_epsilon() -> f64 {
            f64::EPSILON
        }

        fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
            Position::abs_diff_eq(&self.position, &other.position, epsilon)
                && Angle::abs_diff_eq(&self.heading, &other.heading, epsilon)
        }
    }
}
