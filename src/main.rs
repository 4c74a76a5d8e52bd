use bevy::{prelude::*, window::WindowResolution};


mod config;
mod controller;
mod domain;
mod resource;
mod simulator;
mod visualizer;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Mecanum Arena".to_string(),
                resolution: WindowResolution::new(
                    config::SURFACE_WIDTH as f32,
                    config::SURFACE_HEIGHT as f32,
                ),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .add_plugins(controller::Controller)
        .add_plugins(visualizer::Visualizer)
        .add_plugins(simulator::Simulator)
        .run();
}
