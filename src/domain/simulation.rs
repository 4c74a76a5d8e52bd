//! Per-tick simulation of all robots.
//!
//! Each tick every robot senses the walls and the footprints of the other robots with its ToF
//! ring. A robot that comes closer than the reset distance to any obstacle is put back to the pose
//! it was spawned at. Robots are processed in spawn order and see the other robots where they are
//! at that moment, i.e. a robot reset earlier in the same tick is already seen at its spawn pose.

use std::time::Duration;

use log::{debug, info, warn};
use thiserror::Error;

use super::{
    DisplayTransform, Environment, Frame, GeometryError, Pixel, Pose, Position, Primitive, Ray,
    Reading, Robot, RobotConfig, RobotRegistry, Shape, Telemetry, Twist, WheelSpeeds,
};

/// Number of beams used to probe the free space around a point.
const CLEARANCE_PROBES: usize = 36;

#[derive(Error, Debug, PartialEq)]
pub enum SimulationError {
    #[error("robot {0:?} already exists")]
    DuplicateName(String),
    #[error("unknown robot {0:?}")]
    UnknownRobot(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    pub meter_to_pixel: f64,
    pub surface_width: f64,
    pub surface_height: f64,
    /// Robots closer than this to an obstacle are reset.
    pub reset_distance: f64,
    /// Length of beams drawn for sensors without a hit.
    pub tof_range: f64,
    /// Configuration of spawned robots.
    pub robot: RobotConfig,
}

#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
    transform: DisplayTransform,
    robots: RobotRegistry,
    environment: Environment,
    verbose: bool,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            transform: DisplayTransform::new(config.meter_to_pixel, config.surface_height),
            config,
            robots: RobotRegistry::new(),
            environment: Environment::new(),
            verbose: false,
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn transform(&self) -> &DisplayTransform {
        &self.transform
    }

    pub fn robots(&self) -> &RobotRegistry {
        &self.robots
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn robot(&self, name: &str) -> Result<&Robot, SimulationError> {
        self.robots.get(name)
    }

    pub fn robot_mut(&mut self, name: &str) -> Result<&mut Robot, SimulationError> {
        self.robots.get_mut(name)
    }

    /// Spawns a robot with the default robot configuration.
    pub fn spawn(
        &mut self,
        x: f64,
        y: f64,
        theta: f64,
        name: &str,
    ) -> Result<&Robot, SimulationError> {
        let robot = Robot::new(name, Pose::new(x, y, theta), self.config.robot.clone());
        self.spawn_robot(robot)
    }

    pub fn spawn_robot(&mut self, robot: Robot) -> Result<&Robot, SimulationError> {
        let robot = self.robots.spawn(robot)?;
        let pose = robot.spawn_pose();
        info!(
            "spawned robot {} at ({:.2}, {:.2}, {:.2})",
            robot.name(),
            pose.position.x(),
            pose.position.y(),
            Into::<f64>::into(pose.heading)
        );
        Ok(robot)
    }

    /// Shows or hides the robot footprints. Returns a message describing the change.
    pub fn set_verbose(&mut self, verbose: bool) -> &'static str {
        self.verbose = verbose;
        let message = if verbose {
            "Verbosity increased"
        } else {
            "Verbosity decreased"
        };
        info!("{message}");
        message
    }

    pub fn set_twist(&mut self, name: &str, twist: Twist) -> Result<(), SimulationError> {
        self.robot_mut(name)?.set_twist(twist);
        Ok(())
    }

    pub fn set_wheel_speeds(
        &mut self,
        name: &str,
        speeds: WheelSpeeds,
    ) -> Result<(), SimulationError> {
        self.robot_mut(name)?.set_wheel_speeds(speeds);
        Ok(())
    }

    /// Distances published for the robot in the last step.
    pub fn tof_distances(&self, name: &str) -> Result<Vec<f64>, SimulationError> {
        Ok(self.robot(name)?.tof_reading().to_telemetry())
    }

    pub fn add_line_segment(&mut self, p1: Position, p2: Position) -> Result<(), SimulationError> {
        Ok(self.environment.add_line_segment(p1, p2)?)
    }

    pub fn add_rectangle(&mut self, c1: Position, c2: Position) -> Result<(), SimulationError> {
        Ok(self.environment.add_rectangle(c1, c2)?)
    }

    pub fn add_line_segment_pixel(&mut self, p1: Pixel, p2: Pixel) -> Result<(), SimulationError> {
        Ok(self
            .environment
            .add_line_segment_pixel(&self.transform, p1, p2)?)
    }

    pub fn add_rectangle_pixel(&mut self, c1: Pixel, c2: Pixel) -> Result<(), SimulationError> {
        Ok(self
            .environment
            .add_rectangle_pixel(&self.transform, c1, c2)?)
    }

    /// Everything the given robot can see: the other robots' footprints and all walls.
    pub fn obstacles_for(&self, robot: &Robot) -> Vec<Shape> {
        self.robots
            .iter()
            .filter(|r| r.name() != robot.name())
            .map(Robot::shape)
            .chain(self.environment.shapes())
            .collect()
    }

    /// Free distance around a point, probed with a ring of beams against all obstacles.
    pub fn clearance(&self, position: Position) -> f64 {
        let rays = RobotConfig::evenly_spaced_tof_angles(CLEARANCE_PROBES)
            .into_iter()
            .map(|angle| Ray::new(position, angle))
            .collect::<Vec<_>>();
        let obstacles = self
            .robots
            .iter()
            .map(Robot::shape)
            .chain(self.environment.shapes())
            .collect::<Vec<_>>();
        Reading::sense(&rays, &obstacles).0.min_distance()
    }

    /// Moves all robots according to their commanded twist.
    pub fn advance(&mut self, dt: Duration) {
        for robot in self.robots.iter_mut() {
            robot.advance(dt);
        }
    }

    pub fn step(&mut self) -> Frame {
        let transform = self.transform;
        let show_footprints = self.verbose && self.robots.len() > 1;
        let mut frame = Frame::default();

        frame
            .primitives
            .extend(self.environment.walls().iter().map(|w| Primitive::Wall {
                start: transform.to_display(w.p1()),
                end: transform.to_display(w.p2()),
            }));

        for idx in 0..self.robots.len() {
            let robot = self.robots.by_index(idx);
            let name = robot.name().to_string();
            let sweep = robot.sweep(&self.obstacles_for(robot));

            if !sweep.faults().is_empty() {
                warn!(
                    "{} beam(s) of robot {name} ignored: {}",
                    sweep.faults().len(),
                    sweep.faults()[0]
                );
            }

            let min_distance = sweep.reading().min_distance();
            frame.primitives.extend(
                sweep
                    .rays()
                    .iter()
                    .zip(sweep.hit_points(self.config.tof_range))
                    .map(|(ray, hit_point)| Primitive::Beam {
                        start: transform.to_display(ray.origin),
                        end: transform.to_display(hit_point.position()),
                        hit: hit_point.is_hit(),
                    }),
            );

            let reading = sweep.into_reading();
            let distances = reading.to_telemetry();
            debug!("tof {name}: {distances:?}");
            frame.telemetry.push(Telemetry {
                name: name.clone(),
                distances,
            });

            let robot = self.robots.by_index_mut(idx);
            robot.update_tof(reading);

            if min_distance < self.config.reset_distance {
                info!("robot {name} collided at {min_distance:.3} m, resetting to spawn pose");
                robot.reset_pose();
                frame.resets.push(name.clone());
            }

            frame.primitives.push(Primitive::Sprite {
                name,
                center: transform.to_display(robot.position()),
                orientation: robot.heading(),
            });

            if show_footprints {
                frame.primitives.push(Primitive::Circle {
                    center: transform.to_display(robot.position()),
                    radius: transform.length_to_display(robot.obstacle_radius()),
                });
            }
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use std::{f64::consts::PI, time::Duration};

    use approx::assert_abs_diff_eq;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::super::{Angle, MecanumConfig};
    use super::*;
    use crate::tests::{cfg, simulation, single_beam_cfg};

    fn single_beam_robot(name: &str, x: f64, y: f64, theta: f64) -> Robot {
        Robot::new(name, Pose::new(x, y, theta), single_beam_cfg())
    }

    #[test]
    fn test_spawn_round_trip() {
        let mut simulation = simulation();
        simulation.spawn(1.0, 2.0, 0.0, "r1").unwrap();
        let robot = simulation.robot("r1").unwrap();
        assert_eq!(robot.pose(), Pose::new(1.0, 2.0, 0.0));
        assert_eq!(robot.tof_count(), cfg().tof_angles.len());
    }

    #[test]
    fn test_spawn_duplicate_is_rejected() {
        let mut simulation = simulation();
        simulation.spawn(1.0, 2.0, 0.0, "r1").unwrap();
        assert_eq!(
            simulation.spawn(3.0, 3.0, 0.0, "r1").map(|r| r.pose()),
            Err(SimulationError::DuplicateName("r1".to_string()))
        );
    }

    #[test]
    fn test_unknown_robot() {
        let mut simulation = simulation();
        assert_eq!(
            simulation.tof_distances("ghost"),
            Err(SimulationError::UnknownRobot("ghost".to_string()))
        );
        assert_eq!(
            simulation.set_twist("ghost", Twist::default()),
            Err(SimulationError::UnknownRobot("ghost".to_string()))
        );
        assert!(simulation
            .set_wheel_speeds("ghost", WheelSpeeds::default())
            .is_err());
    }

    #[test]
    fn test_set_verbose() {
        let mut simulation = simulation();
        assert_eq!(simulation.set_verbose(true), "Verbosity increased");
        assert!(simulation.is_verbose());
        assert_eq!(simulation.set_verbose(false), "Verbosity decreased");
        assert!(!simulation.is_verbose());
    }

    #[test]
    fn test_obstacles_for_excludes_self() {
        let mut simulation = simulation();
        simulation.spawn(0.0, 0.0, 0.0, "r1").unwrap();
        simulation.spawn(1.0, 0.0, 0.0, "r2").unwrap();
        simulation
            .add_line_segment(Position::new(3.0, -1.0), Position::new(3.0, 1.0))
            .unwrap();

        let obstacles = simulation.obstacles_for(simulation.robot("r1").unwrap());
        assert_eq!(
            obstacles,
            vec![
                simulation.robot("r2").unwrap().shape(),
                Shape::Segment {
                    p1: Position::new(3.0, -1.0),
                    p2: Position::new(3.0, 1.0)
                },
            ]
        );
    }

    #[rstest]
    #[case::reset(0.19, true)]
    #[case::no_reset(0.21, false)]
    fn test_step_resets_robot_near_obstacle(#[case] wall_distance: f64, #[case] reset: bool) {
        let mut simulation = simulation();
        simulation
            .spawn_robot(single_beam_robot("r1", -1.0, 0.0, 0.0))
            .unwrap();
        simulation
            .set_twist("r1", Twist::new(1.0, 0.0, 0.0))
            .unwrap();
        simulation.advance(Duration::from_secs(1));
        simulation
            .add_line_segment(
                Position::new(wall_distance, -1.0),
                Position::new(wall_distance, 1.0),
            )
            .unwrap();

        let frame = simulation.step();

        assert_abs_diff_eq!(frame.telemetry[0].distances[0], wall_distance, epsilon = 1e-12);
        let expected = if reset {
            Pose::new(-1.0, 0.0, 0.0)
        } else {
            Pose::new(0.0, 0.0, 0.0)
        };
        assert_eq!(simulation.robot("r1").unwrap().pose(), expected);
        assert_eq!(frame.resets.len(), usize::from(reset));
    }

    #[test]
    fn test_step_senses_other_robots() {
        let mut simulation = simulation();
        simulation
            .spawn_robot(single_beam_robot("r1", 0.0, 0.0, 0.0))
            .unwrap();
        simulation
            .spawn_robot(single_beam_robot("r2", 2.0, 0.0, PI))
            .unwrap();

        let frame = simulation.step();

        let radius = single_beam_cfg().obstacle_radius;
        for telemetry in &frame.telemetry {
            assert_eq!(telemetry.distances.len(), 1);
            assert_abs_diff_eq!(telemetry.distances[0], 2.0 - radius, epsilon = 1e-12);
        }
        assert!(frame.resets.is_empty());
        assert_eq!(
            simulation.tof_distances("r2").unwrap(),
            frame.telemetry[1].distances
        );
    }

    #[test]
    fn test_step_later_robot_sees_reset_pose() {
        let mut simulation = simulation();
        simulation
            .spawn_robot(single_beam_robot("r1", 5.0, 3.0, 0.0))
            .unwrap();
        simulation
            .spawn_robot(single_beam_robot("r2", 1.0, 2.0, 1.5 * PI))
            .unwrap();
        simulation
            .set_twist("r1", Twist::new(-4.0, -2.0, 0.0))
            .unwrap();
        simulation.advance(Duration::from_secs(1));
        assert_eq!(simulation.robot("r1").unwrap().pose(), Pose::new(1.0, 1.0, 0.0));
        // r1 faces the wall at 0.19 m, r2 looks down onto r1's footprint 0.75 m away
        simulation
            .add_line_segment(Position::new(1.19, 0.5), Position::new(1.19, 1.5))
            .unwrap();

        let frame = simulation.step();

        assert_eq!(frame.resets, vec!["r1".to_string()]);
        assert_eq!(simulation.robot("r1").unwrap().pose(), Pose::new(5.0, 3.0, 0.0));
        assert_eq!(frame.telemetry[1].name, "r2");
        assert_eq!(frame.telemetry[1].distances, vec![0.0]);
    }

    #[test]
    fn test_step_single_robot_has_no_footprint() {
        let mut simulation = simulation();
        simulation.spawn(1.0, 1.0, 0.0, "r1").unwrap();
        simulation.set_verbose(true);

        let frame = simulation.step();

        assert!(!frame
            .primitives
            .iter()
            .any(|p| matches!(p, Primitive::Circle { .. })));
        assert_eq!(frame.sprites().count(), 1);
    }

    #[test]
    fn test_step_publishes_one_distance_per_beam() {
        let mut simulation = simulation();
        simulation.spawn(5.0, 3.0, 0.0, "r1").unwrap();
        simulation
            .add_rectangle(Position::new(0.0, 0.0), Position::new(10.0, 6.0))
            .unwrap();

        let frame = simulation.step();

        assert_eq!(frame.telemetry.len(), 1);
        assert_eq!(frame.telemetry[0].distances.len(), cfg().tof_angles.len());
        assert!(frame.telemetry[0].distances.iter().all(|d| *d > 0.0));
        assert_abs_diff_eq!(frame.telemetry[0].distances[0], 5.0, epsilon = 1e-9);
        assert_abs_diff_eq!(frame.telemetry[0].distances[2], 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_step_survives_degenerate_obstacle() {
        let mut simulation = simulation();
        let broken = MecanumConfig::new(0.05, 0.15, 0.1);
        simulation
            .spawn_robot(Robot::new(
                "ghost",
                Pose::new(1.0, 0.0, 0.0),
                RobotConfig::new(0.0, vec![Angle::new(0.0)], broken),
            ))
            .unwrap();
        simulation
            .spawn_robot(single_beam_robot("r1", 0.0, 0.0, 0.0))
            .unwrap();
        simulation
            .add_line_segment(Position::new(3.0, -1.0), Position::new(3.0, 1.0))
            .unwrap();

        let frame = simulation.step();

        assert_eq!(frame.telemetry.len(), 2);
        assert_abs_diff_eq!(frame.telemetry[1].distances[0], 3.0, epsilon = 1e-12);
        assert!(frame.resets.is_empty());
    }

    #[test]
    fn test_step_primitives() {
        let mut simulation = simulation();
        simulation
            .spawn_robot(single_beam_robot("r1", 1.0, 1.0, 0.0))
            .unwrap();
        simulation
            .spawn_robot(single_beam_robot("r2", 1.0, 4.0, 0.0))
            .unwrap();
        simulation
            .add_line_segment(Position::new(3.0, 0.0), Position::new(3.0, 2.0))
            .unwrap();

        let frame = simulation.step();
        let count = |f: fn(&Primitive) -> bool| frame.primitives.iter().filter(|p| f(p)).count();

        assert_eq!(count(|p| matches!(p, Primitive::Wall { .. })), 1);
        assert_eq!(count(|p| matches!(p, Primitive::Sprite { .. })), 2);
        assert_eq!(count(|p| matches!(p, Primitive::Beam { .. })), 2);
        assert_eq!(count(|p| matches!(p, Primitive::Circle { .. })), 0);
        assert_eq!(
            frame.primitives[0],
            Primitive::Wall {
                start: Pixel::new(300.0, 600.0),
                end: Pixel::new(300.0, 400.0),
            }
        );

        let beams = frame
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Beam { start, end, hit } => Some((*start, *end, *hit)),
                _ => None,
            })
            .collect::<Vec<_>>();
        // r1 hits the wall, r2 passes above it and is drawn to maximum range
        assert_eq!(beams[0].0, Pixel::new(100.0, 500.0));
        assert_abs_diff_eq!(beams[0].1.x, 300.0, epsilon = 1e-9);
        assert!(beams[0].2);
        assert_abs_diff_eq!(
            beams[1].1.x,
            100.0 + simulation.config().tof_range * 100.0,
            epsilon = 1e-9
        );
        assert!(!beams[1].2);

        let sprites = frame.sprites().collect::<Vec<_>>();
        assert_eq!(sprites[0].0, "r1");
        assert_eq!(sprites[1].1, Pixel::new(100.0, 200.0));

        simulation.set_verbose(true);
        let frame = simulation.step();
        let circles = frame
            .primitives
            .iter()
            .filter_map(|p| match p {
                Primitive::Circle { radius, .. } => Some(*radius),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(circles.len(), 2);
        assert_abs_diff_eq!(circles[0], single_beam_cfg().obstacle_radius * 100.0);
    }

    #[test]
    fn test_advance() {
        let mut simulation = simulation();
        simulation.spawn(1.0, 1.0, 0.0, "r1").unwrap();
        simulation
            .set_twist("r1", Twist::new(0.5, 0.0, 0.0))
            .unwrap();
        simulation.advance(Duration::from_secs(2));
        assert_abs_diff_eq!(
            simulation.robot("r1").unwrap().position().x(),
            2.0,
            epsilon = 1e-12
        );
        assert_eq!(
            simulation.robot("r1").unwrap().spawn_pose(),
            Pose::new(1.0, 1.0, 0.0)
        );
    }

    #[test]
    fn test_clearance() {
        let mut simulation = simulation();
        simulation
            .add_rectangle(Position::new(0.0, 0.0), Position::new(4.0, 4.0))
            .unwrap();
        assert_abs_diff_eq!(simulation.clearance(Position::new(1.0, 2.0)), 1.0, epsilon = 1e-9);

        simulation.spawn(2.0, 2.0, 0.0, "r1").unwrap();
        assert_abs_diff_eq!(
            simulation.clearance(Position::new(1.0, 2.0)),
            1.0 - cfg().obstacle_radius,
            epsilon = 1e-9
        );
    }
}
