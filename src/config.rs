//! Runtime configuration.
//!
//! The arena geometry and the robot model are fixed. The loop rate and the demo setup can be
//! overridden through environment variables read once at start-up.

use std::{env, ops::RangeInclusive, str::FromStr};

use log::warn;

use crate::domain::{MecanumConfig, RobotConfig, SimulationConfig};

pub const SURFACE_WIDTH: f64 = 1000.0;
pub const SURFACE_HEIGHT: f64 = 600.0;
pub const METER_TO_PIXEL: f64 = 100.0;

pub const RESET_DISTANCE: f64 = 0.2;
pub const TOF_RANGE: f64 = 5.0;

pub const ROBOT_OBSTACLE_RADIUS: f64 = 0.25;
pub const ROBOT_TOF_COUNT: usize = 8;
pub const ROBOT_WHEELS: MecanumConfig = MecanumConfig::new(0.05, 0.15, 0.1);

fn var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

const DEFAULT_TICK_RATE_HZ: f64 = 25.0;
const TICK_RATE_HZ_RANGE: RangeInclusive<f64> = 1.0..=1000.0;

/// Frequency of the simulation loop in Hz.
pub fn tick_rate_hz() -> f64 {
    checked_tick_rate_hz(var("SIM_TICK_HZ"))
}

fn checked_tick_rate_hz(hz: Option<f64>) -> f64 {
    match hz {
        None => DEFAULT_TICK_RATE_HZ,
        Some(hz) if TICK_RATE_HZ_RANGE.contains(&hz) => hz,
        Some(hz) if hz.is_finite() => {
            let clamped = hz.clamp(*TICK_RATE_HZ_RANGE.start(), *TICK_RATE_HZ_RANGE.end());
            warn!("tick rate {hz} Hz out of range, using {clamped} Hz");
            clamped
        }
        Some(hz) => {
            warn!("invalid tick rate {hz} Hz, using {DEFAULT_TICK_RATE_HZ} Hz");
            DEFAULT_TICK_RATE_HZ
        }
    }
}

/// Number of robots spawned into the demo arena at start-up.
pub fn demo_robot_count() -> usize {
    var("SIM_DEMO_ROBOTS").unwrap_or(3)
}

/// Seed of the demo arena. A fresh seed is drawn if unset.
pub fn seed() -> Option<u64> {
    var("SIM_SEED")
}

/// Whether telemetry of every tick is written to stdout.
pub fn telemetry_stdout() -> bool {
    env::var("SIM_TELEMETRY_STDOUT")
        .map(|value| matches!(value.trim(), "1" | "true" | "on"))
        .unwrap_or(false)
}

pub fn robot_config() -> RobotConfig {
    RobotConfig::new(
        ROBOT_OBSTACLE_RADIUS,
        RobotConfig::evenly_spaced_tof_angles(ROBOT_TOF_COUNT),
        ROBOT_WHEELS,
    )
}

pub fn simulation_config() -> SimulationConfig {
    SimulationConfig {
        meter_to_pixel: METER_TO_PIXEL,
        surface_width: SURFACE_WIDTH,
        surface_height: SURFACE_HEIGHT,
        reset_distance: RESET_DISTANCE,
        tof_range: TOF_RANGE,
        robot: robot_config(),
    }
}
