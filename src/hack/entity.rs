use super::wheel::WheelDir;
use super::world::HackableId;
use crate::clock::FrameTime;
use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// Typed value of a hack field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FieldValue {
    Bool(bool),
    Float(f32),
    Enum { value: String, options: Vec<String> },
}

/// A named property a hackable exposes for inspection and editing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HackField {
    pub id: String,
    pub display_name: String,
    pub value: FieldValue,
}

impl HackField {
    pub fn bool(id: &str, display_name: &str, value: bool) -> Self {
        HackField {
            id: id.to_string(),
            display_name: display_name.to_string(),
            value: FieldValue::Bool(value),
        }
    }

    pub fn float(id: &str, display_name: &str, value: f32) -> Self {
        HackField {
            id: id.to_string(),
            display_name: display_name.to_string(),
            value: FieldValue::Float(value),
        }
    }

    pub fn choice(id: &str, display_name: &str, value: &str, options: &[&str]) -> Self {
        HackField {
            id: id.to_string(),
            display_name: display_name.to_string(),
            value: FieldValue::Enum {
                value: value.to_string(),
                options: options.iter().map(|s| s.to_string()).collect(),
            },
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self.value {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }

    /// Enum value, only if it is one of the listed options
    pub fn as_choice(&self) -> Option<&str> {
        match &self.value {
            FieldValue::Enum { value, options } if options.contains(value) => Some(value),
            _ => None,
        }
    }
}

/// One entry of the hack wheel
#[derive(Debug, Clone, PartialEq)]
pub struct QuickAction {
    pub id: String,
    pub display_name: String,
    pub requires_charge: bool,
    /// Seconds of held confirm; ignored without `requires_charge`
    pub charge_duration: f32,
}

impl QuickAction {
    pub fn instant(id: &str, display_name: &str) -> Self {
        QuickAction {
            id: id.to_string(),
            display_name: display_name.to_string(),
            requires_charge: false,
            charge_duration: 0.0,
        }
    }

    pub fn charged(id: &str, display_name: &str, charge_duration: f32) -> Self {
        QuickAction {
            id: id.to_string(),
            display_name: display_name.to_string(),
            requires_charge: true,
            charge_duration,
        }
    }
}

/// Up to four actions laid out on the wheel
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuickActionSet {
    slots: [Option<QuickAction>; 4],
}

impl QuickActionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, dir: WheelDir, action: QuickAction) -> Self {
        self.slots[dir.index()] = Some(action);
        self
    }

    pub fn get(&self, dir: WheelDir) -> Option<&QuickAction> {
        self.slots[dir.index()].as_ref()
    }

    pub fn find(&self, id: &str) -> Option<&QuickAction> {
        self.slots.iter().flatten().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (WheelDir, &QuickAction)> {
        WheelDir::ALL
            .into_iter()
            .filter_map(|dir| self.get(dir).map(|a| (dir, a)))
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }
}

/// Deferred world mutation requested by an entity
#[derive(Debug, Clone, PartialEq)]
pub enum WorldCommand {
    /// Remove the entity from quick actions and spatial queries
    Deactivate(HackableId),
    StunEnemiesAround {
        source: HackableId,
        origin: Vec3,
        radius: f32,
        duration: f32,
    },
}

/// Handed to `Hackable::execute`
#[derive(Debug)]
pub struct ActionContext {
    pub self_id: HackableId,
    pub commands: Vec<WorldCommand>,
}

impl ActionContext {
    pub fn new(self_id: HackableId) -> Self {
        ActionContext {
            self_id,
            commands: Vec::new(),
        }
    }

    pub fn push(&mut self, command: WorldCommand) {
        self.commands.push(command);
    }
}

/// Handed to `Hackable::tick` once per frame
#[derive(Debug)]
pub struct TickContext<'a> {
    pub self_id: HackableId,
    pub time: FrameTime,
    pub player_position: Option<Vec3>,
    /// Every other live enemy at the start of the frame
    pub enemies: &'a [(HackableId, Vec3)],
    pub commands: Vec<WorldCommand>,
}

/// Short glitch blink shown when an entity is scanned.
/// Runs on the undilated clock.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanMark {
    scanned: bool,
    blink_elapsed: Option<f32>,
    blinks: u32,
    half_period: f32,
}

impl ScanMark {
    pub fn new(blinks: u32, half_period: f32) -> Self {
        ScanMark {
            scanned: false,
            blink_elapsed: None,
            blinks,
            half_period,
        }
    }

    /// Starts the blink. False if already scanned since the last reset.
    pub fn trigger(&mut self) -> bool {
        if self.scanned {
            return false;
        }
        self.scanned = true;
        self.blink_elapsed = Some(0.0);
        true
    }

    pub fn reset(&mut self) {
        self.scanned = false;
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    pub fn tick(&mut self, unscaled: f32) {
        if let Some(elapsed) = self.blink_elapsed.as_mut() {
            *elapsed += unscaled;
            if *elapsed >= self.half_period * 2.0 * self.blinks as f32 {
                self.blink_elapsed = None;
            }
        }
    }

    /// True on the "on" half of each blink
    pub fn is_lit(&self) -> bool {
        match self.blink_elapsed {
            Some(elapsed) => ((elapsed / self.half_period) as u32) % 2 == 0,
            None => false,
        }
    }
}

impl Default for ScanMark {
    fn default() -> Self {
        ScanMark::new(3, 0.04)
    }
}

/// Capabilities shared by everything the scanner can target
pub trait Hackable {
    fn display_name(&self) -> &str;

    fn position(&self) -> Vec3;

    /// Radius of the bounding sphere used for picking
    fn bounds_radius(&self) -> f32 {
        0.75
    }

    fn fields(&self) -> Vec<HackField>;

    /// Write edited fields back; unknown ids and mistyped values are ignored
    fn apply_fields(&mut self, _fields: &[HackField]) {}

    fn scan_mark(&self) -> &ScanMark;

    fn scan_mark_mut(&mut self) -> &mut ScanMark;

    /// Play the scan blink once until the next `reset_scan_flag`
    fn on_scanned_once(&mut self) -> bool {
        self.scan_mark_mut().trigger()
    }

    fn reset_scan_flag(&mut self) {
        self.scan_mark_mut().reset();
    }

    /// Rebuilt on every call, labels may depend on current state
    fn quick_actions(&self) -> QuickActionSet;

    /// Run an action by id. Returns false if the id is unknown.
    fn execute(&mut self, action_id: &str, ctx: &mut ActionContext) -> bool;

    fn tick(&mut self, ctx: &mut TickContext);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_mark_fires_once_per_reset() {
        let mut mark = ScanMark::default();
        assert!(mark.trigger());
        assert!(!mark.trigger());
        assert!(mark.is_lit());

        mark.tick(0.05);
        assert!(!mark.is_lit());
        mark.tick(0.2);
        assert!(!mark.is_lit());

        mark.reset();
        assert!(mark.trigger());
    }

    #[test]
    fn test_action_set_lookup() {
        let set = QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("A", "a"))
            .with(WheelDir::Left, QuickAction::charged("B", "b", 0.8));

        assert_eq!(set.get(WheelDir::Left).map(|a| a.id.as_str()), Some("B"));
        assert!(set.get(WheelDir::Down).is_none());
        assert!(set.find("B").unwrap().requires_charge);
        assert!(set.find("C").is_none());
        assert_eq!(set.iter().count(), 2);
        assert!(QuickActionSet::new().is_empty());
    }

    #[test]
    fn test_field_accessors() {
        let field = HackField::choice("mode", "Laser.Mode", "Normal", &["Normal", "Disabled"]);
        assert_eq!(field.as_choice(), Some("Normal"));
        assert_eq!(field.as_bool(), None);

        let bogus = HackField::choice("mode", "Laser.Mode", "Melt", &["Normal"]);
        assert_eq!(bogus.as_choice(), None);

        let json = serde_json::to_string(&HackField::float("gravity", "Box.Gravity", 1.5)).unwrap();
        let back: HackField = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_float(), Some(1.5));
    }
}
