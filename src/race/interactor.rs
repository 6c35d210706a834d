use super::{MirrorRace, RaceEvent};
use crate::controls::Controls;
use crate::services::SpatialQuery;
use crate::wire::{BoardSide, NodeId};
use bevy::math::Vec2;

/// Scan-held reticle for the tunnel boards. Interact turns the aimed node
/// when it belongs to the player.
#[derive(Debug, Clone)]
pub struct WireInteractor {
    enabled: bool,
    scanning: bool,
    reticle: Vec2,
    aimed: Option<(BoardSide, NodeId)>,
    interact_range: f32,
    sensitivity: f32,
}

impl WireInteractor {
    pub fn new(interact_range: f32, sensitivity: f32) -> Self {
        WireInteractor {
            enabled: false,
            scanning: false,
            reticle: Vec2::ZERO,
            aimed: None,
            interact_range,
            sensitivity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn reticle(&self) -> Vec2 {
        self.reticle
    }

    pub fn aimed(&self) -> Option<(BoardSide, NodeId)> {
        self.aimed
    }

    /// Disabling mid-scan hides the circuits again
    pub fn set_enabled(&mut self, enabled: bool, race: &mut MirrorRace) {
        if !enabled && self.scanning {
            self.stop(race);
        }
        self.enabled = enabled;
    }

    pub fn update(
        &mut self,
        controls: &Controls,
        spatial: &dyn SpatialQuery,
        race: &mut MirrorRace,
    ) -> Vec<RaceEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }

        match (controls.held.scan, self.scanning) {
            (true, false) => {
                self.scanning = true;
                self.reticle = spatial.screen_size() * 0.5;
                race.set_circuits_visible(true);
            }
            (false, true) => self.stop(race),
            _ => {}
        }
        if !self.scanning {
            return events;
        }

        self.reticle = (self.reticle + controls.pointer_delta * self.sensitivity)
            .clamp(Vec2::ZERO, spatial.screen_size());
        let aimed = spatial.raycast_wire_node(self.reticle, self.interact_range);
        if aimed != self.aimed {
            self.aimed = aimed;
            race.set_hovered(aimed);
        }

        if let (true, Some((side, node))) = (controls.pressed.interact, self.aimed) {
            events.extend(race.rotate_player_node(side, node));
        }
        events
    }

    fn stop(&mut self, race: &mut MirrorRace) {
        self.scanning = false;
        self.aimed = None;
        race.set_hovered(None);
        race.set_circuits_visible(false);
    }
}
