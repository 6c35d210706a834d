use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::{
    game::GlitchSession,
    hack::{Hackable, HackableEntity},
    race::BoardLayout,
    visual::components::{
        GhostAvatar, HackableVisual, PlayerAvatar, RivalAvatar, ScanRing, SceneLight,
        WireNodeVisual, hackable_color, to_color,
    },
    visual::fx::BASE_ILLUMINANCE,
    wire::BoardSide,
};

/// Capsule origin above the feet of a standing character
pub const AVATAR_LIFT: f32 = 0.9;

/// Panel side as a fraction of the board cell
const PANEL_FRACTION: f32 = 0.8;
/// Arm length and offset from the tile center, as fractions of the cell
const ARM_LENGTH_FRACTION: f32 = 0.44;
const ARM_OFFSET_FRACTION: f32 = 0.22;

/// Shared handles for ghost shatter fragments
#[derive(Resource, Debug, Clone)]
pub struct ShatterAssets {
    pub mesh: Handle<Mesh>,
    pub material: Handle<StandardMaterial>,
}

/// System: spawn primitive stand-ins for everything the session simulates
pub fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    session: Res<GlitchSession>,
) {
    spawn_environment(&mut commands, &mut meshes, &mut materials, &session);
    spawn_hackables(&mut commands, &mut meshes, &mut materials, &session);
    for side in [BoardSide::Player, BoardSide::Rival] {
        spawn_board(&mut commands, &mut meshes, &mut materials, &session, side);
    }
    spawn_avatars(&mut commands, &mut meshes, &mut materials, &session);

    commands.insert_resource(ShatterAssets {
        mesh: meshes.add(Cuboid::new(0.08, 0.08, 0.08)),
        material: materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.3, 1.0, 1.0),
            emissive: LinearRgba::rgb(0.3, 1.5, 1.5),
            unlit: true,
            ..default()
        }),
    });

    info!("Scene created!");
}

fn spawn_environment(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &GlitchSession,
) {
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(40.0, 60.0))),
        MeshMaterial3d(materials.add(Color::linear_rgb(0.12, 0.12, 0.14))),
        Transform::from_xyz(0.0, 0.0, 18.0),
    ));

    // Tunnel floor tint and side walls over the jammer footprint
    let jammer = &session.zones().jammer;
    let (center, size) = (jammer.center(), jammer.size());
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::default().mesh().size(size.x, size.z))),
        MeshMaterial3d(materials.add(Color::linear_rgb(0.22, 0.06, 0.08))),
        Transform::from_xyz(center.x, 0.01, center.z),
    ));
    let wall_mesh = meshes.add(Cuboid::new(0.5, 5.0, size.z));
    let wall_material = materials.add(Color::linear_rgb(0.18, 0.18, 0.2));
    for x in [center.x - size.x * 0.5, center.x + size.x * 0.5] {
        commands.spawn((
            Mesh3d(wall_mesh.clone()),
            MeshMaterial3d(wall_material.clone()),
            Transform::from_xyz(x, 2.5, center.z),
        ));
    }

    commands.spawn((
        DirectionalLight {
            illuminance: BASE_ILLUMINANCE,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(4.0, 12.0, -6.0).looking_at(Vec3::new(0.0, 0.0, 15.0), Vec3::Y),
        SceneLight,
    ));
}

fn spawn_hackables(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &GlitchSession,
) {
    for (id, entity, _) in session.world().iter() {
        let (mesh, lift, alpha_mode) = match entity {
            HackableEntity::Box(_) => (meshes.add(Cuboid::new(1.0, 1.0, 1.0)), 0.0, None),
            HackableEntity::Door(_) => (meshes.add(Cuboid::new(3.0, 3.0, 0.3)), 0.0, None),
            HackableEntity::Laser(_) => (
                meshes.add(Cuboid::new(6.0, 0.08, 0.08)),
                0.0,
                Some(AlphaMode::Blend),
            ),
            HackableEntity::ChargeNode(_) => (meshes.add(Sphere::new(0.5)), 0.0, None),
            HackableEntity::Enemy(_) => {
                (meshes.add(Capsule3d::new(0.4, 1.0)), AVATAR_LIFT, None)
            }
            HackableEntity::Practice(_) => {
                (meshes.add(Sphere::new(0.45)), 0.0, Some(AlphaMode::Blend))
            }
        };
        let material = materials.add(StandardMaterial {
            base_color: to_color(hackable_color(entity)),
            alpha_mode: alpha_mode.unwrap_or(AlphaMode::Opaque),
            ..default()
        });
        let hackable = entity.as_hackable();
        commands.spawn((
            Mesh3d(mesh),
            MeshMaterial3d(material),
            Transform::from_translation(hackable.position() + Vec3::Y * lift),
            HackableVisual { id, lift },
        ));
        debug!("Spawned visual for {} ({})", hackable.display_name(), id);
    }
}

/// One panel per wire node with an arm child per port, drawn at rotation 0.
/// `sync_wire_nodes` turns the whole tile.
fn spawn_board(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &GlitchSession,
    side: BoardSide,
) {
    let race = session.race();
    let layout = race.layout(side);
    let cell = layout.cell_size;

    let panel_mesh = meshes.add(Cuboid::new(cell * PANEL_FRACTION, cell * PANEL_FRACTION, 0.1));
    let panel_material = materials.add(Color::linear_rgb(0.06, 0.06, 0.08));
    let arm_mesh = meshes.add(Cuboid::new(cell * 0.14, cell * ARM_LENGTH_FRACTION, 0.05));

    for (node_id, node) in race.board(side).nodes() {
        let arm_material = materials.add(StandardMaterial {
            base_color: Color::linear_rgb(0.25, 0.25, 0.3),
            unlit: true,
            ..default()
        });
        commands
            .spawn((
                Mesh3d(panel_mesh.clone()),
                MeshMaterial3d(panel_material.clone()),
                Transform::from_translation(layout.world_position(node.grid))
                    .with_scale(Vec3::ZERO),
                Visibility::Hidden,
                WireNodeVisual::new(side, node_id, arm_material.clone()),
            ))
            .with_children(|parent| {
                for dir in node.node_type.local_ports() {
                    let (dx, dy) = dir.offset();
                    let along = BoardLayout::RIGHT * dx as f32 + Vec3::Y * dy as f32;
                    // Arms sit on the face the player looks at
                    let mut transform = Transform::from_translation(
                        along * cell * ARM_OFFSET_FRACTION + Vec3::NEG_Z * 0.06,
                    );
                    if dx != 0 {
                        transform.rotation = Quat::from_rotation_z(FRAC_PI_2);
                    }
                    parent.spawn((
                        Mesh3d(arm_mesh.clone()),
                        MeshMaterial3d(arm_material.clone()),
                        transform,
                    ));
                }
            });
    }
    info!("Spawned {:?} board with {} nodes", side, race.board(side).len());
}

fn spawn_avatars(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    session: &GlitchSession,
) {
    let capsule = meshes.add(Capsule3d::new(0.4, 1.0));
    let lift = Vec3::Y * AVATAR_LIFT;

    commands.spawn((
        Mesh3d(capsule.clone()),
        MeshMaterial3d(materials.add(Color::linear_rgb(0.8, 0.85, 0.95))),
        Transform::from_translation(session.player().position + lift),
        PlayerAvatar,
    ));

    commands.spawn((
        Mesh3d(capsule.clone()),
        MeshMaterial3d(materials.add(Color::linear_rgb(0.95, 0.35, 0.1))),
        Transform::from_translation(session.race().rival().position() + lift),
        RivalAvatar,
    ));

    commands.spawn((
        Mesh3d(capsule),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgba(0.3, 0.9, 1.0, 0.0),
            emissive: LinearRgba::rgb(0.1, 0.4, 0.5),
            alpha_mode: AlphaMode::Blend,
            ..default()
        })),
        Transform::default(),
        Visibility::Hidden,
        GhostAvatar,
    ));

    let radius = session.config().scanner.scan_radius;
    commands.spawn((
        Mesh3d(meshes.add(Torus::new(0.94, 1.0))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::linear_rgba(0.3, 1.0, 1.0, 0.6),
            alpha_mode: AlphaMode::Blend,
            unlit: true,
            ..default()
        })),
        Transform::from_scale(Vec3::splat(radius)),
        Visibility::Hidden,
        ScanRing,
    ));
}
