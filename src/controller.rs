//! Command channel.
//!
//! Commands are read line by line from standard input on a separate thread and applied to the
//! simulation at the start of the next tick. Replies, and optionally the telemetry of every tick,
//! are written to standard output.

use std::{
    fmt::Write as _,
    io::{self, BufRead, Write},
    sync::{
        mpsc::{self, Receiver},
        Mutex,
    },
    thread,
    time::Instant,
};

use bevy::prelude::*;
use log::{debug, warn};
use once_cell::sync::Lazy;

use crate::{
    config,
    domain::{self, Telemetry},
    resource::{FrameRes, SimulationRes},
    simulator::SimulationSet,
};

static EPOCH: Lazy<Instant> = Lazy::new(Instant::now);

pub struct Controller;

/// Receiving end of the lines read from standard input.
#[derive(Resource)]
struct CommandChannel(Mutex<Receiver<String>>);

#[derive(Resource)]
struct TelemetryOutput {
    stdout: bool,
}

impl Plugin for Controller {
    fn build(&self, app: &mut App) {
        Lazy::force(&EPOCH);

        app.insert_resource(CommandChannel(Mutex::new(spawn())))
            .insert_resource(TelemetryOutput {
                stdout: config::telemetry_stdout(),
            })
            .add_systems(
                FixedUpdate,
                (
                    handle_commands.in_set(SimulationSet::Command),
                    publish_telemetry.in_set(SimulationSet::Publish),
                ),
            );
    }
}

fn spawn() -> Receiver<String> {
    let (sender, receiver) = mpsc::channel();

    let _ = thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if sender.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stopped reading commands: {e}");
                    break;
                }
            }
        }
        debug!("command input closed");
    });

    receiver
}

fn handle_commands(channel: Res<CommandChannel>, mut simulation: ResMut<SimulationRes>) {
    let Ok(receiver) = channel.0.lock() else {
        return;
    };

    let mut stdout = io::stdout().lock();

    for line in receiver.try_iter() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match domain::execute(&mut simulation, line) {
            Ok(reply) => reply.to_string(),
            Err(e) => {
                warn!("rejected command {line:?}: {e}");
                format!("error {e}")
            }
        };

        if let Err(e) = writeln!(stdout, "{response}") {
            warn!("failed to write reply: {e}");
        }
    }
}

fn publish_telemetry(output: Res<TelemetryOutput>, frame: Res<FrameRes>) {
    if !output.stdout {
        return;
    }

    let stamp = EPOCH.elapsed().as_micros();
    let mut stdout = io::stdout().lock();

    for telemetry in &frame.telemetry {
        if let Err(e) = writeln!(stdout, "{}", telemetry_line(stamp, telemetry)) {
            warn!("failed to write telemetry: {e}");
            return;
        }
    }
}

fn telemetry_line(stamp: u128, telemetry: &Telemetry) -> String {
    let mut line = format!("tof {stamp} {}", telemetry.name);
    for d in &telemetry.distances {
        let _ = write!(line, " {d:.3}");
    }
    line
}
