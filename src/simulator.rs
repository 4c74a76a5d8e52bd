//! Simulation loop.
//!
//! Runs at a fixed rate. Each tick pending commands are applied, all robots are moved by their
//! commanded twist, and the simulation is stepped. The resulting frame is kept for publishing and
//! drawing.

use std::f64::consts::TAU;

use bevy::prelude::*;
use log::{error, info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{
    config,
    domain::{Pixel, Position, Simulation, SimulationError, Twist},
    resource::{FrameRes, SimulationRes},
};

pub struct Simulator;

/// Phases of a simulation tick, executed in order.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Command,
    Step,
    Publish,
}

impl Plugin for Simulator {
    fn build(&self, app: &mut App) {
        let simulation = match create_simulation() {
            Ok(simulation) => simulation,
            Err(e) => {
                error!("failed to set up the arena: {e}");
                Simulation::new(config::simulation_config())
            }
        };

        app.insert_resource(Time::<Fixed>::from_hz(config::tick_rate_hz()))
            .insert_resource(SimulationRes::from(simulation))
            .init_resource::<FrameRes>()
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Command,
                    SimulationSet::Step,
                    SimulationSet::Publish,
                )
                    .chain(),
            )
            .add_systems(FixedUpdate, simulate.in_set(SimulationSet::Step));
    }
}

fn simulate(time: Res<Time>, mut simulation: ResMut<SimulationRes>, mut frame: ResMut<FrameRes>) {
    simulation.advance(time.delta());
    *frame = simulation.step().into();
}

// Arena outline and interior walls in pixels
const BORDER: [(f64, f64); 2] = [(20.0, 20.0), (980.0, 580.0)];
const WALLS: [[(f64, f64); 2]; 3] = [
    [(250.0, 20.0), (250.0, 250.0)],
    [(500.0, 580.0), (500.0, 350.0)],
    [(700.0, 200.0), (850.0, 200.0)],
];

/// Attempts to find a free spot per demo robot.
const PLACEMENT_ATTEMPTS: usize = 100;

/// Extra free space required around a demo robot when it is placed.
const PLACEMENT_MARGIN: f64 = 0.2;

fn create_simulation() -> Result<Simulation, SimulationError> {
    let mut simulation = Simulation::new(config::simulation_config());

    let [c1, c2] = BORDER.map(|(x, y)| Pixel::new(x, y));
    simulation.add_rectangle_pixel(c1, c2)?;
    for [p1, p2] in WALLS {
        simulation.add_line_segment_pixel(Pixel::new(p1.0, p1.1), Pixel::new(p2.0, p2.1))?;
    }

    let seed = config::seed().unwrap_or_else(|| rand::rng().random());
    info!("demo arena seed {seed}");
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    spawn_demo_robots(&mut simulation, &mut rng, config::demo_robot_count())?;

    Ok(simulation)
}

fn spawn_demo_robots(
    simulation: &mut Simulation,
    rng: &mut ChaCha8Rng,
    count: usize,
) -> Result<(), SimulationError> {
    let transform = *simulation.transform();
    let min = transform.to_world(Pixel::new(BORDER[0].0, BORDER[1].1));
    let max = transform.to_world(Pixel::new(BORDER[1].0, BORDER[0].1));
    let required_clearance = simulation.config().robot.obstacle_radius
        + simulation.config().reset_distance
        + PLACEMENT_MARGIN;

    for i in 1..=count {
        let position = (0..PLACEMENT_ATTEMPTS)
            .map(|_| {
                Position::new(
                    rng.random_range(min.x()..max.x()),
                    rng.random_range(min.y()..max.y()),
                )
            })
            .find(|p| simulation.clearance(*p) > required_clearance);

        let Some(position) = position else {
            warn!("no free space left for demo robot {i}");
            break;
        };

        let name = format!("robot{i}");
        let theta = rng.random_range(0.0..TAU);
        simulation.spawn(position.x(), position.y(), theta, &name)?;
        simulation.set_twist(
            &name,
            Twist::new(
                rng.random_range(0.2..0.6),
                0.0,
                rng.random_range(-0.3..0.3),
            ),
        )?;
    }

    Ok(())
}
