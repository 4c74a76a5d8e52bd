//! Robots by name, kept in spawn order.

use super::{Robot, SimulationError};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RobotRegistry {
    robots: Vec<Robot>,
}

impl RobotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a robot. Names are unique: a second robot with a known name is rejected and the
    /// registered one stays untouched.
    pub fn spawn(&mut self, robot: Robot) -> Result<&Robot, SimulationError> {
        if self.contains(robot.name()) {
            return Err(SimulationError::DuplicateName(robot.name().to_string()));
        }
        self.robots.push(robot);
        Ok(&self.robots[self.robots.len() - 1])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.robots.iter().any(|r| r.name() == name)
    }

    pub fn get(&self, name: &str) -> Result<&Robot, SimulationError> {
        self.robots
            .iter()
            .find(|r| r.name() == name)
            .ok_or_else(|| SimulationError::UnknownRobot(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Robot, SimulationError> {
        self.robots
            .iter_mut()
            .find(|r| r.name() == name)
            .ok_or_else(|| SimulationError::UnknownRobot(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Robot> {
        self.robots.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Robot> {
        self.robots.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.robots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.robots.is_empty()
    }

    pub(super) fn by_index(&self, idx: usize) -> &Robot {
        &self.robots[idx]
    }

    pub(super) fn by_index_mut(&mut self, idx: usize) -> &mut Robot {
        &mut self.robots[idx]
    }
}
