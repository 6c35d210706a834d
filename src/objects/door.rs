use crate::hack::{
    ActionContext, HackField, Hackable, QuickAction, QuickActionSet, ScanMark, TickContext,
    WheelDir,
};
use bevy::math::Vec3;

const OPEN_SPEED: f32 = 5.0;

#[derive(Debug, Clone)]
pub struct Door {
    name: String,
    position: Vec3,
    locked: bool,
    open: bool,
    /// 0 closed, 1 fully open; eases toward `open`
    open_amount: f32,
    /// Overloaded doors lose their collider for good
    blocking: bool,
    scan: ScanMark,
}

impl Door {
    pub fn new(name: &str, position: Vec3) -> Self {
        Door {
            name: name.to_string(),
            position,
            locked: true,
            open: false,
            open_amount: 0.0,
            blocking: true,
            scan: ScanMark::new(2, 0.05),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open_amount(&self) -> f32 {
        self.open_amount
    }

    /// True while the door stops the player
    pub fn is_blocking(&self) -> bool {
        self.blocking && self.open_amount < 0.9
    }

    /// Unlock and open, used when a puzzle is won
    pub fn force_open(&mut self) {
        self.locked = false;
        self.open = true;
    }
}

impl Hackable for Door {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn bounds_radius(&self) -> f32 {
        1.2
    }

    fn fields(&self) -> Vec<HackField> {
        vec![
            HackField::bool("locked", "Door.Locked", self.locked),
            HackField::bool("open", "Door.Open", self.open),
        ]
    }

    fn apply_fields(&mut self, fields: &[HackField]) {
        for field in fields {
            match (field.id.as_str(), field.as_bool()) {
                ("locked", Some(v)) => self.locked = v,
                ("open", Some(v)) => self.open = v,
                _ => {}
            }
        }
    }

    fn scan_mark(&self) -> &ScanMark {
        &self.scan
    }

    fn scan_mark_mut(&mut self) -> &mut ScanMark {
        &mut self.scan
    }

    fn quick_actions(&self) -> QuickActionSet {
        let lock_label = if self.locked { "Unlock" } else { "Lock" };
        let open_label = if self.open { "Close" } else { "Open" };
        QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("Door_ToggleLock", lock_label))
            .with(WheelDir::Right, QuickAction::instant("Door_ToggleOpen", open_label))
            .with(WheelDir::Down, QuickAction::instant("Door_JamOpen", "Jam Open"))
            .with(WheelDir::Left, QuickAction::charged("Door_Overload", "Overload", 1.0))
    }

    fn execute(&mut self, action_id: &str, _ctx: &mut ActionContext) -> bool {
        match action_id {
            "Door_ToggleLock" => self.locked = !self.locked,
            "Door_ToggleOpen" => {
                // Locked doors ignore the request
                if !self.locked {
                    self.open = !self.open;
                }
            }
            "Door_JamOpen" => {
                self.locked = true;
                self.open = true;
            }
            "Door_Overload" => {
                self.blocking = false;
                self.locked = true;
                self.open = true;
                self.open_amount = 1.0;
                log::info!("{} overloaded", self.name);
            }
            _ => return false,
        }
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);
        let target = if self.open { 1.0 } else { 0.0 };
        let k = (ctx.time.scaled * OPEN_SPEED).min(1.0);
        self.open_amount += (target - self.open_amount) * k;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hack::HackableId;

    fn ctx() -> ActionContext {
        ActionContext::new(HackableId::new(0, 0))
    }

    #[test]
    fn test_locked_door_refuses_to_open() {
        let mut door = Door::new("Door", Vec3::ZERO);
        door.execute("Door_ToggleOpen", &mut ctx());
        assert!(!door.is_open());

        door.execute("Door_ToggleLock", &mut ctx());
        door.execute("Door_ToggleOpen", &mut ctx());
        assert!(door.is_open());
    }

    #[test]
    fn test_labels_follow_state() {
        let mut door = Door::new("Door", Vec3::ZERO);
        let actions = door.quick_actions();
        assert_eq!(actions.get(WheelDir::Up).unwrap().display_name, "Unlock");
        door.execute("Door_ToggleLock", &mut ctx());
        let actions = door.quick_actions();
        assert_eq!(actions.get(WheelDir::Up).unwrap().display_name, "Lock");
        assert!(actions.get(WheelDir::Left).unwrap().requires_charge);
    }

    #[test]
    fn test_overload_snaps_open() {
        let mut door = Door::new("Door", Vec3::ZERO);
        door.execute("Door_Overload", &mut ctx());
        assert!(door.is_locked());
        assert_eq!(door.open_amount(), 1.0);
        assert!(!door.is_blocking());
    }

    #[test]
    fn test_fields_round_trip() {
        let mut door = Door::new("Door", Vec3::ZERO);
        let mut fields = door.fields();
        fields[0] = HackField::bool("locked", "Door.Locked", false);
        door.apply_fields(&fields);
        assert!(!door.is_locked());
    }
}
