//! 2D visualization.
//!
//! Draws the primitives of the latest simulation frame. Walls, beams and footprints are drawn with
//! gizmos each frame, robots are sprites that follow the poses of the frame.

use std::collections::HashSet;

use bevy::{prelude::*, sprite::Anchor};

use crate::{
    domain::{Pixel, Primitive},
    resource::{FrameRes, SimulationRes},
};

pub struct Visualizer;

impl Plugin for Visualizer {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, set_up)
            .add_systems(
                Update,
                (
                    handle_keyboard_input,
                    (draw_frame, update_robots, update_text),
                )
                    .chain(),
            )
            .insert_resource(ClearColor(BACKGROUND_COLOR))
            .init_resource::<Scene>();
    }
}

#[derive(Resource)]
struct Scene {
    show_text: bool,
}

impl Default for Scene {
    fn default() -> Self {
        Self { show_text: true }
    }
}

#[derive(Component)]
struct RobotSprite {
    name: String,
}

#[derive(Component)]
struct RobotLabel {
    name: String,
}

#[derive(Component)]
struct StatusText;

const BACKGROUND_COLOR: Color = Color::rgb(64.0 / 255.0, 64.0 / 255.0, 1.0);
const WALL_COLOR: Color = Color::BLACK;
const BEAM_HIT_COLOR: Color = Color::RED;
const BEAM_MISS_COLOR: Color = Color::rgba(1.0, 0.0, 0.0, 0.25);
const FOOTPRINT_COLOR: Color = Color::RED;
const ROBOT_COLOR: Color = Color::rgb(0.9, 0.9, 0.9);
const ROBOT_FRONT_COLOR: Color = Color::rgb(1.0, 0.6, 0.0);

/// Size of the robot symbol in pixels.
const ROBOT_SIZE: Vec2 = Vec2::new(40.0, 30.0);
const LABEL_OFFSET: f32 = 30.0;

fn set_up(mut commands: Commands, mut config_store: ResMut<GizmoConfigStore>) {
    commands.spawn(Camera2dBundle::default());

    let (config, _) = config_store.config_mut::<DefaultGizmoConfigGroup>();
    config.line_width = 2.0;

    commands.spawn((
        Text2dBundle {
            text: Text::from_section(
                "",
                TextStyle {
                    font_size: 16.0,
                    color: Color::WHITE,
                    ..default()
                },
            ),
            text_anchor: Anchor::BottomLeft,
            ..default()
        },
        StatusText,
    ));
}

fn draw_frame(frame: Res<FrameRes>, simulation: Res<SimulationRes>, mut gizmos: Gizmos) {
    let surface = surface_size(&simulation);

    for primitive in &frame.primitives {
        match primitive {
            Primitive::Wall { start, end } => {
                gizmos.line_2d(
                    to_bevy_position(*start, surface),
                    to_bevy_position(*end, surface),
                    WALL_COLOR,
                );
            }
            Primitive::Beam { start, end, hit } => {
                gizmos.line_2d(
                    to_bevy_position(*start, surface),
                    to_bevy_position(*end, surface),
                    if *hit { BEAM_HIT_COLOR } else { BEAM_MISS_COLOR },
                );
            }
            Primitive::Circle { center, radius } => {
                gizmos.circle_2d(
                    to_bevy_position(*center, surface),
                    *radius as f32,
                    FOOTPRINT_COLOR,
                );
            }
            Primitive::Sprite { .. } => {}
        }
    }
}

fn update_robots(
    mut commands: Commands,
    frame: Res<FrameRes>,
    simulation: Res<SimulationRes>,
    mut sprites: Query<(&RobotSprite, &mut Transform), Without<RobotLabel>>,
    mut labels: Query<(&RobotLabel, &mut Transform), Without<RobotSprite>>,
) {
    let surface = surface_size(&simulation);
    let mut known = HashSet::new();

    for (sprite, mut transform) in sprites.iter_mut() {
        if let Some((_, center, orientation)) = frame.sprites().find(|s| s.0 == sprite.name) {
            *transform = Transform {
                translation: to_bevy_position(center, surface).extend(1.0),
                rotation: Quat::from_rotation_z(orientation.into()),
                ..default()
            };
        }
        known.insert(sprite.name.clone());
    }

    for (label, mut transform) in labels.iter_mut() {
        if let Some((_, center, _)) = frame.sprites().find(|s| s.0 == label.name) {
            transform.translation =
                (to_bevy_position(center, surface) + Vec2::new(0.0, LABEL_OFFSET)).extend(2.0);
        }
    }

    for (name, center, orientation) in frame.sprites() {
        if known.contains(name) {
            continue;
        }
        create_robot(
            &mut commands,
            name,
            to_bevy_position(center, surface),
            orientation.into(),
        );
    }
}

fn create_robot(commands: &mut Commands, name: &str, position: Vec2, orientation: f32) {
    commands
        .spawn((
            SpriteBundle {
                sprite: Sprite {
                    color: ROBOT_COLOR,
                    custom_size: Some(ROBOT_SIZE),
                    ..default()
                },
                transform: Transform {
                    translation: position.extend(1.0),
                    rotation: Quat::from_rotation_z(orientation),
                    ..default()
                },
                ..default()
            },
            RobotSprite {
                name: name.to_string(),
            },
        ))
        .with_children(|parent| {
            // Marker on the front side
            parent.spawn(SpriteBundle {
                sprite: Sprite {
                    color: ROBOT_FRONT_COLOR,
                    custom_size: Some(Vec2::new(ROBOT_SIZE.x / 4.0, ROBOT_SIZE.y)),
                    ..default()
                },
                transform: Transform::from_xyz(ROBOT_SIZE.x * 3.0 / 8.0, 0.0, 0.1),
                ..default()
            });
        });

    commands.spawn((
        Text2dBundle {
            text: Text::from_section(
                name,
                TextStyle {
                    font_size: 14.0,
                    color: Color::WHITE,
                    ..default()
                },
            ),
            transform: Transform::from_translation(
                (position + Vec2::new(0.0, LABEL_OFFSET)).extend(2.0),
            ),
            ..default()
        },
        RobotLabel {
            name: name.to_string(),
        },
    ));
}

fn update_text(
    mut text: Query<(&mut Text, &mut Transform), With<StatusText>>,
    scene: Res<Scene>,
    frame: Res<FrameRes>,
    simulation: Res<SimulationRes>,
) {
    let Ok((mut text, mut transform)) = text.get_single_mut() else {
        return;
    };

    let surface = surface_size(&simulation);
    transform.translation = Vec3::new(-surface.x / 2.0 + 8.0, -surface.y / 2.0 + 4.0, 3.0);

    text.sections[0].value = if !scene.show_text {
        String::new()
    } else if simulation.robots().is_empty() {
        "no robots, spawn one with: spawn <x> <y> <theta> <name>  [T] text".to_string()
    } else {
        format!(
            "robots: {}  resets: {}  verbose: {}  [V] verbosity  [T] text",
            simulation.robots().len(),
            frame.resets.len(),
            simulation.is_verbose(),
        )
    };
}

fn handle_keyboard_input(
    keys: Res<ButtonInput<KeyCode>>,
    mut scene: ResMut<Scene>,
    mut simulation: ResMut<SimulationRes>,
) {
    if keys.just_pressed(KeyCode::KeyV) {
        let verbose = !simulation.is_verbose();
        simulation.set_verbose(verbose);
    }

    if keys.just_pressed(KeyCode::KeyT) {
        scene.show_text = !scene.show_text;
    }
}

fn surface_size(simulation: &SimulationRes) -> Vec2 {
    Vec2::new(
        simulation.config().surface_width as f32,
        simulation.config().surface_height as f32,
    )
}

/// Display pixels have their origin in the top left corner with y pointing down, the 2D camera
/// looks at the center of the window with y pointing up.
fn to_bevy_position(pixel: Pixel, surface: Vec2) -> Vec2 {
    let (x, y): (f32, f32) = pixel.into();
    Vec2::new(x - surface.x / 2.0, surface.y / 2.0 - y)
}
