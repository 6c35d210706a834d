use bevy::prelude::*;

use crate::{
    game::GlitchSession,
    hack::{Hackable, HackableEntity, ScanMode},
    input::FrameInput,
};

const WALK_SPEED: f32 = 5.0;
/// Radians per second at full stick
const TURN_RATE: f32 = 2.5;
const PLAYER_RADIUS: f32 = 0.4;
const DOOR_HALF_WIDTH: f32 = 1.5;
const DOOR_HALF_DEPTH: f32 = 0.15;

/// Tank-style step: x turns, y walks along the facing
pub fn step_pose(position: Vec3, rotation: Quat, movement: Vec2, dt: f32) -> (Vec3, Quat) {
    // Positive x turns right, which is clockwise seen from above
    let rotation = Quat::from_rotation_y(-movement.x * TURN_RATE * dt) * rotation;
    let forward = rotation * Vec3::Z;
    (position + forward * movement.y * WALK_SPEED * dt, rotation)
}

/// Whether a closed door slab overlaps the player's footprint
pub fn door_blocks(door_position: Vec3, point: Vec3) -> bool {
    let d = point - door_position;
    d.x.abs() < DOOR_HALF_WIDTH + PLAYER_RADIUS && d.z.abs() < DOOR_HALF_DEPTH + PLAYER_RADIUS
}

/// System: walk the player on the dilated clock; frozen while hacking
pub fn move_player(
    time: Res<Time>,
    input: Res<FrameInput>,
    mut session: ResMut<GlitchSession>,
) {
    if session.scanner().mode() == ScanMode::Hack {
        return;
    }
    let movement = input.controls.movement;
    if movement == Vec2::ZERO {
        return;
    }

    let pose = session.player();
    let (position, rotation) =
        step_pose(pose.position, pose.rotation, movement, time.delta_secs());

    let blocked = session.world().iter().any(|(_, entity, _)| match entity {
        HackableEntity::Door(door) => {
            let closed = door.is_blocking() && door.open_amount() < 0.9;
            closed && door_blocks(door.position(), position)
        }
        _ => false,
    });
    let position = if blocked { pose.position } else { position };
    session.set_player_pose(position, rotation);
}
