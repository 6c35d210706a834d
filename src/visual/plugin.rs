use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::camera::{MainCamera, follow_player};
use crate::echo::{EchoEvent, GhostEvent};
use crate::game::{FrameReport, GlitchSession};
use crate::hack::ScannerEvent;
use crate::input::FrameInput;
use crate::visual::fx::{apply_screen_fx, apply_time_scale, sync_scan_ring};
use crate::visual::player::move_player;
use crate::visual::setup::{setup_scene, setup_session};
use crate::visual::shatter::{Shatter, spawn_fragments, update_fragments};
use crate::visual::sync::{sync_avatars, sync_hackables, sync_wire_nodes};

pub struct GlitchPlugin;

impl Plugin for GlitchPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<Shatter>()
            // Build the session first, then mirror it into the scene
            .add_systems(Startup, (setup_session, setup_scene).chain())
            .add_systems(
                Update,
                (
                    move_player,
                    refresh_pick_volumes,
                    step_session,
                    apply_time_scale,
                    // Visual updates
                    sync_hackables,
                    sync_wire_nodes,
                    sync_avatars,
                    sync_scan_ring,
                    apply_screen_fx,
                    spawn_fragments,
                    update_fragments,
                    follow_player,
                )
                    .chain(),
            );
    }
}

/// System: hand the session this frame's camera and pick volumes
fn refresh_pick_volumes(
    cameras: Query<(&Camera, &GlobalTransform), With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut session: ResMut<GlitchSession>,
) {
    let (Ok((camera, transform)), Ok(window)) = (cameras.single(), windows.single()) else {
        return;
    };
    let view_proj = camera.clip_from_view() * Mat4::from(transform.affine().inverse());
    session.refresh_scene(view_proj, transform.translation(), window.size());
}

/// System: advance the simulation one wall-clock frame
fn step_session(
    time: Res<Time<Real>>,
    input: Res<FrameInput>,
    mut session: ResMut<GlitchSession>,
    mut shatters: MessageWriter<Shatter>,
) {
    let report = session.update(time.delta_secs(), &input.controls);
    log_report(&report);

    for event in &report.echo {
        if let EchoEvent::Ghost(GhostEvent::Shattered {
            origin,
            fragment_count,
            spawn_bounds,
        }) = event
        {
            shatters.write(Shatter {
                origin: *origin,
                fragment_count: *fragment_count,
                bounds: *spawn_bounds,
            });
        }
    }
}

fn log_report(report: &FrameReport) {
    for event in &report.scanner {
        match event {
            ScannerEvent::ModeChanged { from, to } => info!("Scanner {:?} -> {:?}", from, to),
            ScannerEvent::ActionExecuted { target, action_id } => {
                info!("Hacked {} with {}", target, action_id)
            }
            ScannerEvent::ActionFailed(e) => warn!("Hack failed: {}", e),
            other => debug!("{:?}", other),
        }
    }
    for event in &report.echo {
        match event {
            EchoEvent::GhostSpawned { origin } => info!("Echo ghost spawned at {}", origin),
            EchoEvent::Ghost(GhostEvent::Replayed { target, action_id }) => {
                info!("Ghost replayed {} on {}", action_id, target)
            }
            other => debug!("{:?}", other),
        }
    }
    for event in &report.race {
        info!("Race: {:?}", event);
    }
}
