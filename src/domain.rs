//! The domain module encapsulates the core of the simulator: robots with their ToF sensor rings,
//! the walls of the arena, the distance computation between them and the per-tick step that
//! resets colliding robots and produces telemetry and drawing primitives.
//!
//! The module does not depend on the engine used for rendering and scheduling, so the simulation
//! can be driven and tested on its own.

mod basis;
mod collision;
mod command;
mod environment;
mod frame;
mod registry;
mod robot;
mod sensor;
mod simulation;
mod transform;

pub use basis::{Angle, Pose, Position, Twist};
pub use collision::{GeometryError, Ray, Shape};
pub use command::{execute, Command, CommandError, Reply};
pub use environment::{Environment, LineSegment};
pub use frame::{Frame, Primitive, Telemetry};
pub use registry::RobotRegistry;
pub use robot::{MecanumConfig, Robot, RobotConfig, WheelSpeeds};
pub use sensor::{HitPoint, Reading, Sweep};
pub use simulation::{Simulation, SimulationConfig, SimulationError};
pub use transform::{DisplayTransform, Pixel};
