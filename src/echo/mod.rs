//! Time echo: the recorder keeps the last few seconds of the player and the
//! ghost replays them, including the last committed hack.

mod frame;
mod ghost;
mod recorder;

pub use frame::RecordedFrame;
pub use ghost::{GhostEvent, GhostPhase, GhostReplayer};
pub use recorder::{EchoRecorder, EchoSnapshot, LastHackRecord};

use crate::clock::FrameTime;
use crate::config::{EchoConfig, GhostConfig};
use crate::controls::Controls;
use crate::hack::HackableWorld;
use crate::services::SpatialQuery;
use bevy::math::{Quat, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub enum EchoEvent {
    /// A new ghost replaced any previous one
    GhostSpawned { origin: Vec3 },
    Ghost(GhostEvent),
}

/// Recorder plus the single live ghost
#[derive(Debug, Clone)]
pub struct EchoSystem {
    recorder: EchoRecorder,
    ghost: Option<GhostReplayer>,
    ghost_config: GhostConfig,
}

impl EchoSystem {
    pub fn new(echo: EchoConfig, ghost: GhostConfig) -> Self {
        EchoSystem {
            recorder: EchoRecorder::new(echo),
            ghost: None,
            ghost_config: ghost,
        }
    }

    pub fn recorder(&self) -> &EchoRecorder {
        &self.recorder
    }

    pub fn recorder_mut(&mut self) -> &mut EchoRecorder {
        &mut self.recorder
    }

    pub fn ghost(&self) -> Option<&GhostReplayer> {
        self.ghost.as_ref()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.recorder.set_enabled(enabled);
    }

    /// Drop the live ghost without a dissolve
    pub fn cancel_ghost(&mut self) {
        if let Some(ghost) = self.ghost.as_mut() {
            ghost.cancel();
        }
        self.ghost = None;
    }

    /// Sample the player, spawn on the echo command, and step the ghost.
    /// The ghost keeps playing while the recorder is jammed.
    pub fn update(
        &mut self,
        time: &FrameTime,
        position: Vec3,
        rotation: Quat,
        controls: &Controls,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
    ) -> Vec<EchoEvent> {
        let mut events = Vec::new();

        if let Some(snapshot) = self.recorder.tick(time, position, rotation, controls) {
            self.cancel_ghost();
            let ghost = GhostReplayer::new(snapshot, self.ghost_config.clone());
            events.push(EchoEvent::GhostSpawned {
                origin: ghost.position(),
            });
            self.ghost = Some(ghost);
        }

        if let Some(ghost) = self.ghost.as_mut() {
            events.extend(
                ghost
                    .update(time, world, spatial)
                    .into_iter()
                    .map(EchoEvent::Ghost),
            );
            if ghost.is_finished() {
                self.ghost = None;
            }
        }

        events
    }
}
