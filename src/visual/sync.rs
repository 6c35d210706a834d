use bevy::prelude::*;

use crate::{
    effects::lerp,
    game::GlitchSession,
    hack::{Hackable, HackableEntity},
    visual::components::{
        GhostAvatar, HackableVisual, PlayerAvatar, RivalAvatar, WireNodeVisual, hackable_color,
        highlight, to_color, wire_color,
    },
    visual::setup::AVATAR_LIFT,
};

/// How far an open door slides up into the ceiling
const DOOR_RISE: f32 = 2.8;
/// Axis pointing from a board toward the player reading it
const BOARD_NORMAL: Vec3 = Vec3::NEG_Z;
const WIRE_SCALE_RATE: f32 = 12.0;
const BREATH_RATE: f32 = 4.0;
const BREATH_AMPLITUDE: f32 = 0.06;

/// System: move, tint and hide hackable meshes from the world state
pub fn sync_hackables(
    session: Res<GlitchSession>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut visuals: Query<(
        &HackableVisual,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial3d<StandardMaterial>,
    )>,
) {
    let world = session.world();
    let scanner = session.scanner();

    for (visual, mut transform, mut visibility, material) in &mut visuals {
        let Some(entity) = world.get(visual.id) else {
            *visibility = Visibility::Hidden;
            continue;
        };
        let hackable = entity.as_hackable();
        let mut position = hackable.position() + Vec3::Y * visual.lift;

        let shown = match entity {
            HackableEntity::Door(door) => {
                position.y += door.open_amount() * DOOR_RISE;
                true
            }
            HackableEntity::Practice(node) => {
                let body = node.body();
                position = body.position;
                !body.vanished
            }
            HackableEntity::Enemy(enemy) => {
                let forward = enemy.agent().forward();
                if forward.length_squared() > 0.0 {
                    transform.look_to(-forward, Vec3::Y);
                }
                true
            }
            _ => true,
        };
        transform.translation = position;
        *visibility = if shown && world.is_live(visual.id) {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };

        let color = highlight(
            hackable_color(entity),
            hackable.scan_mark().is_lit(),
            scanner.aimed() == Some(visual.id),
            scanner.target() == Some(visual.id),
        );
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color = to_color(color);
        }
    }
}

/// System: ease wire tiles toward their presentation targets
pub fn sync_wire_nodes(
    time: Res<Time<Real>>,
    session: Res<GlitchSession>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut tiles: Query<(&mut WireNodeVisual, &mut Transform, &mut Visibility)>,
) {
    let dt = time.delta_secs();
    let now = time.elapsed_secs();
    let race = session.race();

    for (mut visual, mut transform, mut visibility) in &mut tiles {
        let Some(node) = race.board(visual.side).node(visual.node) else {
            continue;
        };

        if node.incoming_power_count != visual.last_incoming {
            visual.kick = visual.kick.max(node.power_pulse());
            visual.last_incoming = node.incoming_power_count;
        }
        visual.kick *= 0.95_f32.powf(dt * 60.0);
        if visual.kick < 0.01 {
            visual.kick = 0.0;
        }

        let blend = 1.0 - (-WIRE_SCALE_RATE * dt).exp();
        visual.scale = lerp(visual.scale, node.target_scale(), blend);
        let breath = if node.is_breathing() {
            1.0 + BREATH_AMPLITUDE * (now * BREATH_RATE).sin()
        } else {
            1.0
        };

        transform.scale = Vec3::splat(visual.scale * (1.0 + visual.kick) * breath);
        transform.rotation = Quat::from_axis_angle(BOARD_NORMAL, node.angle_degrees().to_radians());
        *visibility = if visual.scale < 0.01 {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };

        if let Some(material) = materials.get_mut(&visual.material) {
            material.base_color = to_color(wire_color(node));
        }
    }
}

/// System: place the player, rival and ghost capsules
pub fn sync_avatars(
    session: Res<GlitchSession>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut player: Query<&mut Transform, (With<PlayerAvatar>, Without<RivalAvatar>)>,
    mut rival: Query<&mut Transform, (With<RivalAvatar>, Without<GhostAvatar>)>,
    mut ghost: Query<
        (&mut Transform, &mut Visibility, &MeshMaterial3d<StandardMaterial>),
        (With<GhostAvatar>, Without<PlayerAvatar>),
    >,
) {
    let lift = Vec3::Y * AVATAR_LIFT;

    let pose = session.player();
    for mut transform in &mut player {
        transform.translation = pose.position + lift;
        transform.rotation = pose.rotation;
    }

    let rival_ai = session.race().rival();
    for mut transform in &mut rival {
        transform.translation = rival_ai.position() + lift;
        let forward = rival_ai.forward();
        if forward.length_squared() > 0.0 {
            transform.look_to(-forward, Vec3::Y);
        }
    }

    for (mut transform, mut visibility, material) in &mut ghost {
        let Some(replayer) = session.echo().ghost() else {
            *visibility = Visibility::Hidden;
            continue;
        };
        *visibility = Visibility::Inherited;
        transform.translation = replayer.position() + lift;
        transform.rotation = replayer.rotation();
        transform.scale = Vec3::splat(replayer.scale());
        if let Some(material) = materials.get_mut(&material.0) {
            material.base_color.set_alpha(replayer.alpha());
        }
    }
}
