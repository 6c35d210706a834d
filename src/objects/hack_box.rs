use crate::hack::{
    ActionContext, HackField, Hackable, QuickAction, QuickActionSet, ScanMark, TickContext,
    WheelDir, WorldCommand,
};
use bevy::math::Vec3;

const GRAVITY: f32 = 9.81;
const FLOAT_UP_SCALE: f32 = -0.3;
const HOVER_SCALE: f32 = 0.0;
const LOW_FRICTION_DRAG: f32 = 0.1;
/// Highest a floating box rises above its rest height
const CEILING: f32 = 3.0;

/// A pushable crate with hackable gravity and friction
#[derive(Debug, Clone)]
pub struct HackBox {
    rest: Vec3,
    position: Vec3,
    vertical_velocity: f32,
    gravity_scale: f32,
    default_gravity_scale: f32,
    drag: f32,
    default_drag: f32,
    scan: ScanMark,
}

impl HackBox {
    pub fn new(position: Vec3) -> Self {
        HackBox {
            rest: position,
            position,
            vertical_velocity: 0.0,
            gravity_scale: 1.0,
            default_gravity_scale: 1.0,
            drag: 1.5,
            default_drag: 1.5,
            scan: ScanMark::new(3, 0.04),
        }
    }

    pub fn gravity_scale(&self) -> f32 {
        self.gravity_scale
    }

    pub fn drag(&self) -> f32 {
        self.drag
    }

    /// Toggle between `preset` and the authored value
    fn toggle(value: &mut f32, preset: f32, default: f32) {
        *value = if (*value - preset).abs() < 1e-4 { default } else { preset };
    }
}

impl Hackable for HackBox {
    fn display_name(&self) -> &str {
        "Box"
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn fields(&self) -> Vec<HackField> {
        vec![HackField::float("gravity", "Box.Gravity", self.gravity_scale)]
    }

    fn apply_fields(&mut self, fields: &[HackField]) {
        for field in fields {
            if let ("gravity", Some(value)) = (field.id.as_str(), field.as_float()) {
                self.gravity_scale = value.clamp(-2.0, 2.0);
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
        QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("Box_LowG", "Low G"))
            .with(WheelDir::Right, QuickAction::instant("Box_LowFriction", "Low f"))
            .with(WheelDir::Down, QuickAction::instant("Box_Hover", "In Air"))
            .with(WheelDir::Left, QuickAction::charged("Box_Crack", "Crack (Charge)", 0.8))
    }

    fn execute(&mut self, action_id: &str, ctx: &mut ActionContext) -> bool {
        match action_id {
            "Box_LowG" => {
                Self::toggle(&mut self.gravity_scale, FLOAT_UP_SCALE, self.default_gravity_scale)
            }
            "Box_LowFriction" => Self::toggle(&mut self.drag, LOW_FRICTION_DRAG, self.default_drag),
            "Box_Hover" => {
                Self::toggle(&mut self.gravity_scale, HOVER_SCALE, self.default_gravity_scale)
            }
            "Box_Crack" => {
                log::info!("Box cracked open");
                ctx.push(WorldCommand::Deactivate(ctx.self_id));
            }
            _ => return false,
        }
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);

        let dt = ctx.time.scaled;
        self.vertical_velocity -= GRAVITY * self.gravity_scale * dt;
        self.vertical_velocity /= 1.0 + self.drag * dt;
        self.position.y += self.vertical_velocity * dt;

        let floor = self.rest.y;
        let ceiling = self.rest.y + CEILING;
        if self.position.y <= floor || self.position.y >= ceiling {
            self.position.y = self.position.y.clamp(floor, ceiling);
            self.vertical_velocity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameTime;
    use crate::hack::HackableId;

    fn tick(b: &mut HackBox, dt: f32) {
        let mut ctx = TickContext {
            self_id: HackableId::new(0, 0),
            time: FrameTime::uniform(dt, 0.0),
            player_position: None,
            enemies: &[],
            commands: Vec::new(),
        };
        b.tick(&mut ctx);
    }

    #[test]
    fn test_low_g_toggles_back() {
        let mut b = HackBox::new(Vec3::ZERO);
        let mut ctx = ActionContext::new(HackableId::new(0, 0));
        assert!(b.execute("Box_LowG", &mut ctx));
        assert_eq!(b.gravity_scale(), FLOAT_UP_SCALE);
        assert!(b.execute("Box_LowG", &mut ctx));
        assert_eq!(b.gravity_scale(), 1.0);
        assert!(!b.execute("Door_ToggleLock", &mut ctx));
    }

    #[test]
    fn test_low_g_floats_up_to_ceiling() {
        let mut b = HackBox::new(Vec3::ZERO);
        let mut ctx = ActionContext::new(HackableId::new(0, 0));
        b.execute("Box_LowG", &mut ctx);
        for _ in 0..600 {
            tick(&mut b, 0.05);
        }
        assert!(b.position().y > 0.5);
        assert!(b.position().y <= CEILING);
    }

    #[test]
    fn test_crack_deactivates_self() {
        let mut b = HackBox::new(Vec3::ZERO);
        let id = HackableId::new(4, 1);
        let mut ctx = ActionContext::new(id);
        b.execute("Box_Crack", &mut ctx);
        assert_eq!(ctx.commands, vec![WorldCommand::Deactivate(id)]);
    }

    #[test]
    fn test_gravity_field_clamped() {
        let mut b = HackBox::new(Vec3::ZERO);
        b.apply_fields(&[HackField::float("gravity", "Box.Gravity", 5.0)]);
        assert_eq!(b.gravity_scale(), 2.0);
        b.apply_fields(&[HackField::bool("gravity", "Box.Gravity", true)]);
        assert_eq!(b.gravity_scale(), 2.0);
    }
}
