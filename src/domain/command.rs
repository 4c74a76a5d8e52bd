//! Line-based command protocol.
//!
//! One command per line, arguments separated by whitespace:
//!
//! ```text
//! spawn <x> <y> <theta> <name>
//! verbose <true|false>
//! twist <name> <vx> <vy> <omega>
//! wheels <name> <front_left> <front_right> <rear_left> <rear_right>
//! tof <name>
//! ```

use std::{fmt, str::SplitWhitespace};

use thiserror::Error;

use super::{Simulation, SimulationError, Twist, WheelSpeeds};

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("unexpected argument {0:?}")]
    UnexpectedArgument(String),
    #[error("invalid number {value:?} for <{argument}>")]
    InvalidNumber {
        argument: &'static str,
        value: String,
    },
    #[error("invalid value {0:?}, expected true or false")]
    InvalidBool(String),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Spawn {
        x: f64,
        y: f64,
        theta: f64,
        name: String,
    },
    SetVerbose(bool),
    SetTwist {
        name: String,
        twist: Twist,
    },
    SetWheelSpeeds {
        name: String,
        speeds: WheelSpeeds,
    },
    QueryTof {
        name: String,
    },
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut args = Arguments(line.split_whitespace());
        let keyword = args.0.next().ok_or(CommandError::Empty)?;

        let command = match keyword {
            "spawn" => Command::Spawn {
                x: args.number("x")?,
                y: args.number("y")?,
                theta: args.number("theta")?,
                name: args.word("name")?,
            },
            "verbose" => Command::SetVerbose(args.bool("enabled")?),
            "twist" => Command::SetTwist {
                name: args.word("name")?,
                twist: Twist::new(
                    args.number("vx")?,
                    args.number("vy")?,
                    args.number("omega")?,
                ),
            },
            "wheels" => Command::SetWheelSpeeds {
                name: args.word("name")?,
                speeds: WheelSpeeds::new(
                    args.number("front_left")?,
                    args.number("front_right")?,
                    args.number("rear_left")?,
                    args.number("rear_right")?,
                ),
            },
            "tof" => Command::QueryTof {
                name: args.word("name")?,
            },
            _ => return Err(CommandError::Unknown(keyword.to_string())),
        };

        args.finish()?;
        Ok(command)
    }

    pub fn apply(self, simulation: &mut Simulation) -> Result<Reply, CommandError> {
        Ok(match self {
            Command::Spawn { x, y, theta, name } => {
                simulation.spawn(x, y, theta, &name)?;
                Reply::Spawn { x, y, theta, name }
            }
            Command::SetVerbose(verbose) => Reply::Verbose {
                success: true,
                message: simulation.set_verbose(verbose).to_string(),
            },
            Command::SetTwist { name, twist } => {
                simulation.set_twist(&name, twist)?;
                Reply::Twist { name }
            }
            Command::SetWheelSpeeds { name, speeds } => {
                simulation.set_wheel_speeds(&name, speeds)?;
                Reply::Wheels { name }
            }
            Command::QueryTof { name } => Reply::Tof {
                distances: simulation.tof_distances(&name)?,
                name,
            },
        })
    }
}

/// Parses and applies a single protocol line.
pub fn execute(simulation: &mut Simulation, line: &str) -> Result<Reply, CommandError> {
    Command::parse(line)?.apply(simulation)
}

/// Acknowledgement of a successfully applied command.
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    Spawn {
        x: f64,
        y: f64,
        theta: f64,
        name: String,
    },
    Verbose {
        success: bool,
        message: String,
    },
    Twist {
        name: String,
    },
    Wheels {
        name: String,
    },
    Tof {
        name: String,
        distances: Vec<f64>,
    },
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Spawn { x, y, theta, name } => write!(f, "ok spawn {x} {y} {theta} {name}"),
            Reply::Verbose { success, message } => write!(f, "ok verbose {success} {message}"),
            Reply::Twist { name } => write!(f, "ok twist {name}"),
            Reply::Wheels { name } => write!(f, "ok wheels {name}"),
            Reply::Tof { name, distances } => {
                write!(f, "ok tof {name}")?;
                for d in distances {
                    write!(f, " {d:.3}")?;
                }
                Ok(())
            }
        }
    }
}

struct Arguments<'a>(SplitWhitespace<'a>);

impl Arguments<'_> {
    fn word(&mut self, argument: &'static str) -> Result<String, CommandError> {
        self.0
            .next()
            .map(str::to_string)
            .ok_or(CommandError::MissingArgument(argument))
    }

    fn number(&mut self, argument: &'static str) -> Result<f64, CommandError> {
        let value = self.word(argument)?;
        match value.parse::<f64>() {
            Ok(number) if number.is_finite() => Ok(number),
            _ => Err(CommandError::InvalidNumber { argument, value }),
        }
    }

    fn bool(&mut self, argument: &'static str) -> Result<bool, CommandError> {
        let value = self.word(argument)?;
        match value.as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            _ => Err(CommandError::InvalidBool(value)),
        }
    }

    fn finish(mut self) -> Result<(), CommandError> {
        match self.0.next() {
            Some(extra) => Err(CommandError::UnexpectedArgument(extra.to_string())),
            None => Ok(()),
        }
    }
}
