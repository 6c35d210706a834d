use bevy::prelude::*;

mod ai;
mod camera;
mod clock;
mod config;
mod controls;
mod echo;
mod effects;
mod game;
mod hack;
mod input;
mod objects;
mod race;
mod services;
mod visual;
mod wire;

use bevy::window::WindowResolution;
use camera::CameraPlugin;
use input::InputPlugin;

use crate::visual::GlitchPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "The Glitch".into(),
            resolution: WindowResolution::new(1280, 720),
            resizable: true,
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CameraPlugin)
    .add_plugins(InputPlugin)
    .add_plugins(GlitchPlugin);

    app.run();
}
