use crate::effects::{ActiveEffects, Effect, EffectStep, ease_in_out, lerp};
use crate::hack::{
    ActionContext, HackField, Hackable, QuickAction, QuickActionSet, ScanMark, TickContext,
    WheelDir, WorldCommand,
};
use bevy::math::Vec3;

const SLIDE_DURATION: f32 = 0.45;
const FADE_TO_GHOST: f32 = 0.12;
const GHOST_FADE_OUT: f32 = 0.9;
const GHOST_ALPHA: f32 = 0.18;

/// What the practice node's effects animate
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeBody {
    pub position: Vec3,
    pub alpha: f32,
    pub moving: bool,
    pub vanishing: bool,
    pub vanished: bool,
}

struct Slide {
    from: Vec3,
    to: Vec3,
    elapsed: f32,
}

impl Effect<PracticeBody> for Slide {
    fn advance(&mut self, body: &mut PracticeBody, dt: f32) -> EffectStep {
        self.elapsed += dt;
        let k = (self.elapsed / SLIDE_DURATION).min(1.0);
        body.position = self.from.lerp(self.to, ease_in_out(k));
        if k >= 1.0 {
            body.moving = false;
            EffectStep::Done
        } else {
            EffectStep::Continue
        }
    }

    fn cancel(&mut self, body: &mut PracticeBody) {
        body.position = self.to;
        body.moving = false;
    }
}

/// Quick fade to a faint afterimage, then a slow fade to nothing
struct Vanish {
    elapsed: f32,
}

impl Effect<PracticeBody> for Vanish {
    fn advance(&mut self, body: &mut PracticeBody, dt: f32) -> EffectStep {
        self.elapsed += dt;
        if self.elapsed < FADE_TO_GHOST {
            body.alpha = lerp(1.0, GHOST_ALPHA, self.elapsed / FADE_TO_GHOST);
            return EffectStep::Continue;
        }
        let t = self.elapsed - FADE_TO_GHOST;
        body.alpha = lerp(GHOST_ALPHA, 0.0, t / GHOST_FADE_OUT);
        if t >= GHOST_FADE_OUT {
            body.vanishing = false;
            body.vanished = true;
            EffectStep::Done
        } else {
            EffectStep::Continue
        }
    }

    fn cancel(&mut self, body: &mut PracticeBody) {
        body.alpha = 0.0;
        body.vanishing = false;
        body.vanished = true;
    }
}

/// Tutorial target: slides back and forth, or phases out after a charge
#[derive(Debug)]
pub struct PracticeNode {
    name: String,
    start: Vec3,
    move_to: Option<Vec3>,
    moved: bool,
    body: PracticeBody,
    effects: ActiveEffects<PracticeBody>,
    scan: ScanMark,
}

impl PracticeNode {
    pub fn new(name: &str, position: Vec3, move_to: Option<Vec3>) -> Self {
        PracticeNode {
            name: name.to_string(),
            start: position,
            move_to,
            moved: false,
            body: PracticeBody {
                position,
                alpha: 1.0,
                moving: false,
                vanishing: false,
                vanished: false,
            },
            effects: ActiveEffects::new(),
            scan: ScanMark::new(3, 0.04),
        }
    }

    pub fn body(&self) -> &PracticeBody {
        &self.body
    }

    /// Stop every running animation, leaving the node at its end state
    pub fn cancel_effects(&mut self) {
        self.effects.cancel_all(&mut self.body);
    }
}

impl Hackable for PracticeNode {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.body.position
    }

    fn fields(&self) -> Vec<HackField> {
        Vec::new()
    }

    fn scan_mark(&self) -> &ScanMark {
        &self.scan
    }

    fn scan_mark_mut(&mut self) -> &mut ScanMark {
        &mut self.scan
    }

    fn quick_actions(&self) -> QuickActionSet {
        QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("Practice_Move", "Slide"))
            .with(
                WheelDir::Left,
                QuickAction::charged("Practice_Vanish", "Phase (Charge)", 0.8),
            )
    }

    fn execute(&mut self, action_id: &str, _ctx: &mut ActionContext) -> bool {
        match action_id {
            "Practice_Move" => {
                if self.body.vanishing || self.body.moving {
                    return true;
                }
                let Some(move_to) = self.move_to else {
                    return true;
                };
                let to = if self.moved { self.start } else { move_to };
                self.moved = !self.moved;
                self.body.moving = true;
                self.effects.push(Slide {
                    from: self.body.position,
                    to,
                    elapsed: 0.0,
                });
            }
            "Practice_Vanish" => {
                if self.body.moving || self.body.vanishing {
                    return true;
                }
                self.body.vanishing = true;
                self.effects.push(Vanish { elapsed: 0.0 });
            }
            _ => return false,
        }
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);
        self.effects.tick(&mut self.body, ctx.time.scaled);
        if self.body.vanished {
            ctx.commands.push(WorldCommand::Deactivate(ctx.self_id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameTime;
    use crate::hack::HackableId;

    fn run(node: &mut PracticeNode, action: &str) {
        assert!(node.execute(action, &mut ActionContext::new(HackableId::new(0, 0))));
    }

    fn tick(node: &mut PracticeNode, dt: f32) -> Vec<WorldCommand> {
        let mut ctx = TickContext {
            self_id: HackableId::new(0, 0),
            time: FrameTime::uniform(dt, 0.0),
            player_position: None,
            enemies: &[],
            commands: Vec::new(),
        };
        node.tick(&mut ctx);
        ctx.commands
    }

    #[test]
    fn test_slide_there_and_back() {
        let target = Vec3::new(2.0, 0.0, 0.0);
        let mut node = PracticeNode::new("Practice Node", Vec3::ZERO, Some(target));

        run(&mut node, "Practice_Move");
        tick(&mut node, 0.2);
        assert!(node.body().moving);
        // Ignored while sliding
        run(&mut node, "Practice_Move");
        tick(&mut node, 0.3);
        assert_eq!(node.position(), target);
        assert!(!node.body().moving);

        run(&mut node, "Practice_Move");
        tick(&mut node, 0.5);
        assert_eq!(node.position(), Vec3::ZERO);
    }

    #[test]
    fn test_vanish_fades_then_deactivates() {
        let mut node = PracticeNode::new("Practice Node", Vec3::ZERO, None);
        run(&mut node, "Practice_Vanish");

        assert!(tick(&mut node, 0.12).is_empty());
        assert!((node.body().alpha - GHOST_ALPHA).abs() < 1e-4);
        assert!(tick(&mut node, 0.5).is_empty());

        let commands = tick(&mut node, 0.5);
        assert_eq!(commands, vec![WorldCommand::Deactivate(HackableId::new(0, 0))]);
        assert_eq!(node.body().alpha, 0.0);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut node = PracticeNode::new("Practice Node", Vec3::ZERO, Some(Vec3::X));
        run(&mut node, "Practice_Move");
        tick(&mut node, 0.1);

        node.cancel_effects();
        assert_eq!(node.position(), Vec3::X);
        assert!(!node.body().moving);
        node.cancel_effects();
        assert_eq!(node.position(), Vec3::X);
    }
}
