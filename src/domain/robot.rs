//! Mecanum-wheeled robot with a ring of time-of-flight distance sensors.

use std::time::Duration;

use nalgebra::{Matrix3x4, Rotation2, RowVector4, Vector2, Vector4};

use super::{Angle, Pose, Position, Ray, Reading, Shape, Sweep, Twist};

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct Robot {
    name: String,
    pose: Pose,
    spawn_pose: Pose,
    twist: Twist,
    reading: Reading,
    config: RobotConfig,
}

impl Robot {
    pub fn new(name: impl Into<String>, pose: Pose, config: RobotConfig) -> Self {
        Self {
            name: name.into(),
            pose,
            spawn_pose: pose,
            twist: Twist::default(),
            reading: Reading::empty(config.tof_angles.len()),
            config,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn position(&self) -> Position {
        self.pose.position
    }

    pub fn heading(&self) -> Angle {
        self.pose.heading
    }

    pub fn spawn_pose(&self) -> Pose {
        self.spawn_pose
    }

    #[cfg(test)]
    pub fn twist(&self) -> Twist {
        self.twist
    }

    pub fn obstacle_radius(&self) -> f64 {
        self.config.obstacle_radius
    }

    pub fn tof_count(&self) -> usize {
        self.config.tof_angles.len()
    }

    /// Last reading published for this robot.
    pub fn tof_reading(&self) -> &Reading {
        &self.reading
    }

    pub fn set_twist(&mut self, twist: Twist) {
        self.twist = twist;
    }

    pub fn set_wheel_speeds(&mut self, speeds: WheelSpeeds) {
        self.twist = self.config.wheels.twist(speeds);
    }

    pub fn update_tof(&mut self, reading: Reading) {
        debug_assert_eq!(reading.len(), self.tof_count());
        self.reading = reading;
    }

    pub fn reset_pose(&mut self) {
        self.pose = self.spawn_pose;
    }

    /// Integrates the commanded twist over `dt`.
    pub fn advance(&mut self, dt: Duration) {
        let dt = dt.as_secs_f64();
        let heading: f64 = self.pose.heading.into();
        let velocity = Rotation2::new(heading) * Vector2::new(self.twist.vx, self.twist.vy);

        self.pose = Pose {
            position: self.pose.position + Position::new(velocity.x, velocity.y) * dt,
            heading: Angle::new(heading + self.twist.omega * dt).normalized(),
        };
    }

    /// One ray per ToF beam, all starting at the robot's center.
    pub fn tof_rays(&self) -> Vec<Ray> {
        self.config
            .tof_angles
            .iter()
            .map(|angle| Ray::new(self.pose.position, self.pose.heading + *angle))
            .collect()
    }

    pub fn sweep(&self, obstacles: &[Shape]) -> Sweep {
        Sweep::new(self.tof_rays(), obstacles)
    }

    /// Footprint as seen by the other robots' sensors.
    pub fn shape(&self) -> Shape {
        Shape::Circle {
            center: self.pose.position,
            radius: self.config.obstacle_radius,
        }
    }
}

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub struct RobotConfig {
    pub obstacle_radius: f64,
    /// Beam directions relative to the heading, in sensor order.
    pub tof_angles: Vec<Angle>,
    pub wheels: MecanumConfig,
}

impl RobotConfig {
    pub fn new(obstacle_radius: f64, tof_angles: Vec<Angle>, wheels: MecanumConfig) -> Self {
        Self {
            obstacle_radius,
            tof_angles,
            wheels,
        }
    }

    /// `count` beams evenly spread over the full circle, the first one facing forward.
    pub fn evenly_spaced_tof_angles(count: usize) -> Vec<Angle> {
        (0..count)
            .map(|i| Angle::from_deg(360.0 * i as f64 / count as f64))
            .collect()
    }
}

/// Wheel geometry. All distances are measured from the robot's center, which is facing to the
/// right along the positive x-axis.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct MecanumConfig {
    pub wheel_radius: f64,
    /// Half of the distance between front and rear axle.
    pub half_wheel_base: f64,
    /// Half of the distance between left and right wheels.
    pub half_track_width: f64,
}

impl MecanumConfig {
    pub const fn new(wheel_radius: f64, half_wheel_base: f64, half_track_width: f64) -> Self {
        Self {
            wheel_radius,
            half_wheel_base,
            half_track_width,
        }
    }

    /// Forward kinematics of a mecanum platform with rollers at 45°.
    pub fn twist(&self, speeds: WheelSpeeds) -> Twist {
        let k = self.wheel_radius / 4.0;
        let l = (self.half_wheel_base + self.half_track_width).recip();
        let j = Matrix3x4::from_rows(&[
            RowVector4::new(1.0, 1.0, 1.0, 1.0),
            RowVector4::new(-1.0, 1.0, 1.0, -1.0),
            RowVector4::new(-l, l, -l, l),
        ]) * k;
        let v = Vector4::new(
            speeds.front_left,
            speeds.front_right,
            speeds.rear_left,
            speeds.rear_right,
        );
        let q = j * v;
        Twist::new(q[0], q[1], q[2])
    }
}

/// Angular wheel speeds in rad/s.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct WheelSpeeds {
    pub front_left: f64,
    pub front_right: f64,
    pub rear_left: f64,
    pub rear_right: f64,
}

impl WheelSpeeds {
    pub const fn new(front_left: f64, front_right: f64, rear_left: f64, rear_right: f64) -> Self {
        Self {
            front_left,
            front_right,
            rear_left,
            rear_right,
        }
    }
}
