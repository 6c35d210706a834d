use bevy::prelude::*;

use crate::{
    game::GlitchSession,
    hack::FxProfile,
    visual::components::{ScanRing, SceneLight},
};

pub const BASE_ILLUMINANCE: f32 = 8_000.0;

/// Clear color before grading
const SKY: Vec3 = Vec3::new(0.05, 0.07, 0.12);
const LUMA: Vec3 = Vec3::new(0.2126, 0.7152, 0.0722);

/// Apply a grading profile to a linear color.
/// Saturation -100 is greyscale, exposure is in stops, vignette darkens.
pub fn grade(color: Vec3, profile: &FxProfile) -> Vec3 {
    let saturation = (1.0 + profile.saturation / 100.0).clamp(0.0, 2.0);
    let grey = Vec3::splat(color.dot(LUMA));
    let graded = grey.lerp(color, saturation) * 2f32.powf(profile.exposure);
    graded * (1.0 - profile.vignette * 0.5)
}

/// System: push the scanner's bullet time into Bevy's clocks
pub fn apply_time_scale(
    session: Res<GlitchSession>,
    mut virtual_time: ResMut<Time<Virtual>>,
    mut fixed_time: ResMut<Time<Fixed>>,
) {
    let scale = session.scanner().time_scale();
    if virtual_time.relative_speed() != scale {
        virtual_time.set_relative_speed(scale);
        debug!("Time scale {}", scale);
    }
    let step = session.scanner().fixed_step() as f64;
    if fixed_time.timestep().as_secs_f64() != step {
        fixed_time.set_timestep_seconds(step);
    }
}

/// System: grade the sky and dim the sun by the current FX profile
pub fn apply_screen_fx(
    session: Res<GlitchSession>,
    mut clear_color: ResMut<ClearColor>,
    mut lights: Query<&mut DirectionalLight, With<SceneLight>>,
) {
    let profile = session.scanner().fx().profile();
    let sky = grade(SKY, &profile);
    clear_color.0 = Color::linear_rgb(sky.x, sky.y, sky.z);
    for mut light in &mut lights {
        light.illuminance = BASE_ILLUMINANCE * 2f32.powf(profile.exposure);
    }
}

/// System: grow the reveal ring around the player during the scan intro
pub fn sync_scan_ring(
    session: Res<GlitchSession>,
    mut rings: Query<(&mut Transform, &mut Visibility), With<ScanRing>>,
) {
    let radius = session.config().scanner.scan_radius;
    let center = session.player().position + Vec3::Y * 0.05;
    for (mut transform, mut visibility) in &mut rings {
        match session.scanner().fx().scan_reveal() {
            Some(reveal) => {
                transform.translation = center;
                transform.scale = Vec3::splat(radius * reveal);
                *visibility = Visibility::Inherited;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normal_profile_is_identity() {
        let color = Vec3::new(0.2, 0.5, 0.8);
        let graded = grade(color, &FxProfile::NORMAL);
        assert!((graded - color).length() < 1e-6);
    }

    #[test]
    fn test_scan_profile_is_grey_and_darker() {
        let color = Vec3::new(0.2, 0.5, 0.8);
        let graded = grade(color, &FxProfile::SCAN);
        assert!((graded.x - graded.y).abs() < 1e-6 && (graded.y - graded.z).abs() < 1e-6);
        assert!(graded.x < color.dot(LUMA));

        let hack = grade(color, &FxProfile::HACK);
        assert!(hack.x < graded.x);
    }
}
