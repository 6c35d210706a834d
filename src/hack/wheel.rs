use super::entity::{QuickAction, QuickActionSet};
use crate::config::WheelConfig;
use crate::effects::lerp;
use bevy::math::Vec2;

/// Wheel slot, clockwise from Up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WheelDir {
    Up,
    Right,
    Down,
    Left,
}

impl WheelDir {
    pub const ALL: [WheelDir; 4] = [WheelDir::Up, WheelDir::Right, WheelDir::Down, WheelDir::Left];

    pub const fn index(self) -> usize {
        match self {
            WheelDir::Up => 0,
            WheelDir::Right => 1,
            WheelDir::Down => 2,
            WheelDir::Left => 3,
        }
    }

    /// Pick by the dominant axis, `None` inside the dead zone
    pub fn from_vector(v: Vec2, dead_zone: f32) -> Option<WheelDir> {
        if v.length() < dead_zone {
            return None;
        }
        if v.x.abs() > v.y.abs() {
            Some(if v.x > 0.0 { WheelDir::Right } else { WheelDir::Left })
        } else {
            Some(if v.y > 0.0 { WheelDir::Up } else { WheelDir::Down })
        }
    }
}

/// Directional selector driven by accumulated pointer motion
#[derive(Debug, Clone)]
pub struct HackWheel {
    config: WheelConfig,
    actions: QuickActionSet,
    pointer: Vec2,
    selected: Option<WheelDir>,
    charge_progress: f32,
}

impl HackWheel {
    pub fn new(config: WheelConfig) -> Self {
        HackWheel {
            config,
            actions: QuickActionSet::default(),
            pointer: Vec2::ZERO,
            selected: None,
            charge_progress: 0.0,
        }
    }

    /// Show a fresh action set with the pointer centered
    pub fn bind(&mut self, actions: QuickActionSet) {
        self.actions = actions;
        self.pointer = Vec2::ZERO;
        self.selected = None;
        self.charge_progress = 0.0;
    }

    /// Swap in a rebuilt action set, keeping pointer and selection
    pub fn set_actions(&mut self, actions: QuickActionSet) {
        self.actions = actions;
    }

    pub fn clear(&mut self) {
        self.bind(QuickActionSet::default());
    }

    pub fn actions(&self) -> &QuickActionSet {
        &self.actions
    }

    /// Accumulate pointer motion and return the selected slot
    pub fn feed(&mut self, delta: Vec2) -> Option<WheelDir> {
        self.pointer = (self.pointer + delta).clamp_length_max(self.config.max_radius);
        self.selected = WheelDir::from_vector(self.pointer, self.config.dead_zone);
        self.selected
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn selected(&self) -> Option<WheelDir> {
        self.selected
    }

    /// Action under the selected slot; empty slots give `None`
    pub fn selected_action(&self) -> Option<&QuickAction> {
        self.selected.and_then(|dir| self.actions.get(dir))
    }

    pub fn set_charge_progress(&mut self, progress: f32) {
        self.charge_progress = progress.clamp(0.0, 1.0);
    }

    pub fn charge_progress(&self) -> f32 {
        self.charge_progress
    }

    /// Pixel amplitude of the charge shake, zero while not charging
    pub fn shake_strength(&self) -> f32 {
        if self.charge_progress <= 0.0 {
            return 0.0;
        }
        lerp(
            self.config.shake_min,
            self.config.shake_max,
            self.charge_progress,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel() -> HackWheel {
        let mut wheel = HackWheel::new(WheelConfig::default());
        wheel.bind(
            QuickActionSet::new()
                .with(WheelDir::Up, QuickAction::instant("U", "up"))
                .with(WheelDir::Left, QuickAction::charged("L", "left", 1.0)),
        );
        wheel
    }

    #[test]
    fn test_dead_zone_selects_nothing() {
        let mut wheel = wheel();
        assert_eq!(wheel.feed(Vec2::new(20.0, 20.0)), None);
        assert!(wheel.selected_action().is_none());
    }

    #[test]
    fn test_larger_axis_wins() {
        assert_eq!(WheelDir::from_vector(Vec2::new(50.0, 40.0), 35.0), Some(WheelDir::Right));
        assert_eq!(WheelDir::from_vector(Vec2::new(-30.0, -60.0), 35.0), Some(WheelDir::Down));
        assert_eq!(WheelDir::from_vector(Vec2::new(-60.0, 10.0), 35.0), Some(WheelDir::Left));
        // Ties go vertical
        assert_eq!(WheelDir::from_vector(Vec2::new(40.0, 40.0), 35.0), Some(WheelDir::Up));
    }

    #[test]
    fn test_pointer_clamped_to_max_radius() {
        let mut wheel = wheel();
        wheel.feed(Vec2::new(0.0, 500.0));
        assert!((wheel.pointer().length() - 120.0).abs() < 1e-3);

        // Coming back from the clamp only needs one radius worth of motion
        assert_eq!(wheel.feed(Vec2::new(-240.0, -120.0)), Some(WheelDir::Left));
        assert_eq!(wheel.selected_action().map(|a| a.id.as_str()), Some("L"));
    }

    #[test]
    fn test_empty_slot_has_no_action() {
        let mut wheel = wheel();
        assert_eq!(wheel.feed(Vec2::new(80.0, 0.0)), Some(WheelDir::Right));
        assert!(wheel.selected_action().is_none());
    }

    #[test]
    fn test_shake_follows_charge() {
        let mut wheel = wheel();
        assert_eq!(wheel.shake_strength(), 0.0);
        wheel.set_charge_progress(0.5);
        assert_eq!(wheel.shake_strength(), 12.0);
        wheel.set_charge_progress(4.0);
        assert_eq!(wheel.charge_progress(), 1.0);
        assert_eq!(wheel.shake_strength(), 22.0);
    }
}
