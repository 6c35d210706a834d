use crate::hack::{
    ActionContext, HackField, Hackable, QuickAction, QuickActionSet, ScanMark, TickContext,
    WheelDir,
};
use bevy::math::Vec3;

const GLOW_SPEED: f32 = 10.0;

/// Holds a charge for a while after being hacked; doors can require
/// several nodes charged at once
#[derive(Debug, Clone)]
pub struct ChargeNode {
    name: String,
    position: Vec3,
    charge_time: f32,
    keep_alive: f32,
    refresh_if_charged: bool,
    remaining: f32,
    /// 0..1 color blend toward the charged tint
    glow: f32,
    scan: ScanMark,
}

impl ChargeNode {
    pub fn new(name: &str, position: Vec3) -> Self {
        ChargeNode {
            name: name.to_string(),
            position,
            charge_time: 0.8,
            keep_alive: 10.0,
            refresh_if_charged: true,
            remaining: 0.0,
            glow: 0.0,
            scan: ScanMark::new(3, 0.04),
        }
    }

    pub fn with_keep_alive(mut self, seconds: f32) -> Self {
        self.keep_alive = seconds;
        self
    }

    pub fn is_charged(&self) -> bool {
        self.remaining > 0.0
    }

    pub fn remaining(&self) -> f32 {
        self.remaining.max(0.0)
    }

    pub fn glow(&self) -> f32 {
        self.glow
    }

    fn mark_charged(&mut self) {
        if self.is_charged() && !self.refresh_if_charged {
            return;
        }
        self.remaining = self.keep_alive;
    }
}

impl Hackable for ChargeNode {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn fields(&self) -> Vec<HackField> {
        vec![
            HackField::bool("charged", "Node.Charged", self.is_charged()),
            HackField::float("remain", "Node.Remain", self.remaining()),
        ]
    }

    fn scan_mark(&self) -> &ScanMark {
        &self.scan
    }

    fn scan_mark_mut(&mut self) -> &mut ScanMark {
        &mut self.scan
    }

    fn quick_actions(&self) -> QuickActionSet {
        QuickActionSet::new().with(
            WheelDir::Up,
            QuickAction::charged("Node_Charge", "Charge", self.charge_time),
        )
    }

    fn execute(&mut self, action_id: &str, _ctx: &mut ActionContext) -> bool {
        if action_id != "Node_Charge" {
            return false;
        }
        self.mark_charged();
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);
        let dt = ctx.time.scaled;
        if self.remaining > 0.0 {
            self.remaining -= dt;
        }
        let target = if self.is_charged() { 1.0 } else { 0.0 };
        self.glow += (target - self.glow) * (dt * GLOW_SPEED).min(1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameTime;
    use crate::hack::HackableId;

    fn tick(node: &mut ChargeNode, dt: f32) {
        let mut ctx = TickContext {
            self_id: HackableId::new(0, 0),
            time: FrameTime::uniform(dt, 0.0),
            player_position: None,
            enemies: &[],
            commands: Vec::new(),
        };
        node.tick(&mut ctx);
    }

    #[test]
    fn test_charge_expires_after_keep_alive() {
        let mut node = ChargeNode::new("Charge Node", Vec3::ZERO).with_keep_alive(1.0);
        let mut ctx = ActionContext::new(HackableId::new(0, 0));
        assert!(node.execute("Node_Charge", &mut ctx));
        assert!(node.is_charged());

        tick(&mut node, 0.6);
        assert!(node.is_charged());
        // Re-charging refreshes the timer
        node.execute("Node_Charge", &mut ctx);
        tick(&mut node, 0.6);
        assert!(node.is_charged());
        tick(&mut node, 0.6);
        assert!(!node.is_charged());
    }

    #[test]
    fn test_only_up_slot() {
        let node = ChargeNode::new("Charge Node", Vec3::ZERO);
        let actions = node.quick_actions();
        assert_eq!(actions.iter().count(), 1);
        let up = actions.get(WheelDir::Up).unwrap();
        assert!(up.requires_charge);
        assert_eq!(up.charge_duration, 0.8);
    }
}
