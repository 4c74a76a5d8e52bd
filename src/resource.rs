//! The resource module encapsulates domain entities for use with Bevy.

use std::ops::{Deref, DerefMut};

use bevy::ecs::system::Resource;

use crate::domain;

#[derive(Resource)]
pub struct SimulationRes(domain::Simulation);

impl Deref for SimulationRes {
    type Target = domain::Simulation;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for SimulationRes {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<domain::Simulation> for SimulationRes {
    fn from(value: domain::Simulation) -> Self {
        Self(value)
    }
}

/// Output of the most recent simulation step.
#[derive(Resource, Default)]
pub struct FrameRes(domain::Frame);

impl Deref for FrameRes {
    type Target = domain::Frame;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<domain::Frame> for FrameRes {
    fn from(value: domain::Frame) -> Self {
        Self(value)
    }
}
