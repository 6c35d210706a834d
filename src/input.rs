use crate::controls::{Buttons, Controls};
use bevy::input::InputSystems;
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;

pub const SCAN_KEY: KeyCode = KeyCode::KeyV;
pub const INTERACT_KEY: KeyCode = KeyCode::KeyE;
pub const CONFIRM_KEY: KeyCode = KeyCode::KeyQ;
pub const ECHO_KEY: KeyCode = KeyCode::KeyR;

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FrameInput>()
            .add_systems(PreUpdate, collect_frame_input.after(InputSystems));
    }
}

/// Device-independent controls for the current frame
#[derive(Resource, Debug, Default, Clone, Copy)]
pub struct FrameInput {
    pub controls: Controls,
    previous: Buttons,
}

impl FrameInput {
    /// Roll over to a new frame, deriving edges from the last one
    pub fn advance(&mut self, held: Buttons, echo_pressed: bool, pointer: Vec2, movement: Vec2) {
        let mut controls = Controls::from_held(held, self.previous).with_pointer(pointer);
        controls.echo_pressed = echo_pressed;
        controls.movement = movement;
        self.previous = held;
        self.controls = controls;
    }
}

pub fn held_buttons(keys: &ButtonInput<KeyCode>) -> Buttons {
    Buttons {
        scan: keys.pressed(SCAN_KEY),
        interact: keys.pressed(INTERACT_KEY),
        confirm: keys.pressed(CONFIRM_KEY),
    }
}

/// WASD or arrows, +y forward, at most unit length
pub fn movement_axis(keys: &ButtonInput<KeyCode>) -> Vec2 {
    let mut axis = Vec2::ZERO;
    if keys.any_pressed([KeyCode::KeyW, KeyCode::ArrowUp]) {
        axis.y += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyS, KeyCode::ArrowDown]) {
        axis.y -= 1.0;
    }
    if keys.any_pressed([KeyCode::KeyD, KeyCode::ArrowRight]) {
        axis.x += 1.0;
    }
    if keys.any_pressed([KeyCode::KeyA, KeyCode::ArrowLeft]) {
        axis.x -= 1.0;
    }
    axis.normalize_or_zero()
}

fn collect_frame_input(
    keys: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    mut input: ResMut<FrameInput>,
) {
    // Mouse motion is y-down, controls are y-up
    let pointer = Vec2::new(motion.delta.x, -motion.delta.y);
    input.advance(
        held_buttons(&keys),
        keys.just_pressed(ECHO_KEY),
        pointer,
        movement_axis(&keys),
    );
}
