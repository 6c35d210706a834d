use crate::game::GlitchSession;
use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GameCamera>()
            .add_systems(Startup, setup_camera);
    }
}

/// Third-person rig tuning
#[derive(Resource, Debug, Clone)]
pub struct GameCamera {
    /// Offset from the player in the player's frame (+z is forward)
    pub offset: Vec3,
    /// Point above the player's feet the camera looks at
    pub look_height: f32,
    /// Exponential follow rate, per second
    pub follow_rate: f32,
    pub fov_degrees: f32,
}

impl Default for GameCamera {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 4.5, -8.0),
            look_height: 1.2,
            follow_rate: 6.0,
            fov_degrees: 60.0,
        }
    }
}

impl GameCamera {
    /// Where the camera wants to be for a player pose
    pub fn desired_eye(&self, position: Vec3, rotation: Quat) -> Vec3 {
        position + rotation * self.offset
    }

    pub fn look_target(&self, position: Vec3) -> Vec3 {
        position + Vec3::Y * self.look_height
    }

    /// Frame-rate independent blend factor
    pub fn blend(&self, dt: f32) -> f32 {
        1.0 - (-self.follow_rate * dt).exp()
    }
}

#[derive(Component)]
pub struct MainCamera;

/// Perspective camera behind the player's start, facing +Z
///
/// Coordinate System (right-handed, Y-up):
/// ```text
///        Y (up)
///        ↑
///        |
///   ←---+
///   X   /
///      ↙ Z (forward, into the level)
/// ```
fn setup_camera(mut commands: Commands, game_camera: Res<GameCamera>) {
    let eye = game_camera.desired_eye(Vec3::ZERO, Quat::IDENTITY);
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: game_camera.fov_degrees.to_radians(),
            ..default()
        }),
        // No LUT assets are bundled
        Tonemapping::None,
        Transform::from_translation(eye).looking_at(game_camera.look_target(Vec3::ZERO), Vec3::Y),
        MainCamera,
    ));
}

/// System: ease the camera toward its spot behind the player.
/// Runs on real time so bullet time does not drag the view.
pub fn follow_player(
    time: Res<Time<Real>>,
    game_camera: Res<GameCamera>,
    session: Res<GlitchSession>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut transform) = cameras.single_mut() else {
        return;
    };
    let pose = session.player();
    let eye = game_camera.desired_eye(pose.position, pose.rotation);
    let t = game_camera.blend(time.delta_secs());
    transform.translation = transform.translation.lerp(eye, t);
    transform.look_at(game_camera.look_target(pose.position), Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eye_trails_behind_player() {
        let camera = GameCamera::default();
        let eye = camera.desired_eye(Vec3::new(0.0, 0.0, 10.0), Quat::IDENTITY);
        assert_eq!(eye, Vec3::new(0.0, 4.5, 2.0));

        // Turned to face +X, the camera swings to -X
        let turned = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let eye = camera.desired_eye(Vec3::ZERO, turned);
        assert!((eye - Vec3::new(-8.0, 4.5, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_blend_is_bounded() {
        let camera = GameCamera::default();
        assert_eq!(camera.blend(0.0), 0.0);
        let b = camera.blend(1.0 / 60.0);
        assert!(b > 0.0 && b < 1.0);
        assert!(camera.blend(100.0) > 0.999);
    }
}
