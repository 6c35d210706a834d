use crate::effects::{ActiveEffects, Effect, EffectStep};
use crate::hack::{
    ActionContext, HackField, Hackable, QuickAction, QuickActionSet, ScanMark, TickContext,
    WheelDir,
};
use bevy::math::Vec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FLICKER_DURATION: f32 = 2.0;
const FLICKER_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaserMode {
    Normal,
    LowDamage,
    Disabled,
}

impl LaserMode {
    const NAMES: [&'static str; 3] = ["Normal", "LowDamage", "Disabled"];

    pub fn name(self) -> &'static str {
        match self {
            LaserMode::Normal => "Normal",
            LaserMode::LowDamage => "LowDamage",
            LaserMode::Disabled => "Disabled",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "Normal" => Some(LaserMode::Normal),
            "LowDamage" => Some(LaserMode::LowDamage),
            "Disabled" => Some(LaserMode::Disabled),
            _ => None,
        }
    }
}

/// Random on/off strobe on the undilated clock, ends back on Normal
#[derive(Debug)]
struct Flicker {
    rng: StdRng,
    elapsed: f32,
    next_toggle: f32,
}

impl Effect<LaserMode> for Flicker {
    fn advance(&mut self, mode: &mut LaserMode, dt: f32) -> EffectStep {
        self.elapsed += dt;
        if self.elapsed >= FLICKER_DURATION {
            *mode = LaserMode::Normal;
            return EffectStep::Done;
        }
        while self.next_toggle <= self.elapsed {
            *mode = if self.rng.random_bool(0.5) {
                LaserMode::Disabled
            } else {
                LaserMode::Normal
            };
            self.next_toggle += FLICKER_STEP;
        }
        EffectStep::Continue
    }

    fn cancel(&mut self, mode: &mut LaserMode) {
        *mode = LaserMode::Normal;
    }
}

/// Damaging beam whose mode can be hacked
#[derive(Debug)]
pub struct Laser {
    position: Vec3,
    mode: LaserMode,
    effects: ActiveEffects<LaserMode>,
    rng: StdRng,
    scan: ScanMark,
}

impl Laser {
    pub fn new(position: Vec3) -> Self {
        Self::with_rng(position, StdRng::from_rng(&mut rand::rng()))
    }

    pub fn with_rng(position: Vec3, rng: StdRng) -> Self {
        Laser {
            position,
            mode: LaserMode::Normal,
            effects: ActiveEffects::new(),
            rng,
            scan: ScanMark::new(2, 0.05),
        }
    }

    pub fn mode(&self) -> LaserMode {
        self.mode
    }

    pub fn is_flickering(&self) -> bool {
        !self.effects.is_empty()
    }

    /// Damage multiplier for anything touching the beam
    pub fn damage_factor(&self) -> f32 {
        match self.mode {
            LaserMode::Normal => 1.0,
            LaserMode::LowDamage => 0.25,
            LaserMode::Disabled => 0.0,
        }
    }

    /// Any direct mode change wins over a running flicker
    fn set_mode(&mut self, mode: LaserMode) {
        self.effects.cancel_all(&mut self.mode);
        self.mode = mode;
    }
}

impl Hackable for Laser {
    fn display_name(&self) -> &str {
        "Laser"
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn fields(&self) -> Vec<HackField> {
        vec![HackField::choice(
            "mode",
            "Laser.Mode",
            self.mode.name(),
            &LaserMode::NAMES,
        )]
    }

    fn apply_fields(&mut self, fields: &[HackField]) {
        for field in fields {
            if field.id != "mode" {
                continue;
            }
            if let Some(mode) = field.as_choice().and_then(LaserMode::from_name) {
                self.set_mode(mode);
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
        let damage_label = if self.mode == LaserMode::Normal {
            "LowDamage"
        } else {
            "Normal"
        };
        let power_label = if self.mode == LaserMode::Disabled {
            "Enable"
        } else {
            "Disable"
        };
        QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("Laser_ToggleDamage", damage_label))
            .with(WheelDir::Right, QuickAction::instant("Laser_TogglePower", power_label))
            .with(WheelDir::Down, QuickAction::instant("Laser_Flicker", "Flicker"))
            .with(WheelDir::Left, QuickAction::charged("Laser_Overload", "Overload", 1.0))
    }

    fn execute(&mut self, action_id: &str, _ctx: &mut ActionContext) -> bool {
        match action_id {
            "Laser_ToggleDamage" => self.set_mode(if self.mode == LaserMode::Normal {
                LaserMode::LowDamage
            } else {
                LaserMode::Normal
            }),
            "Laser_TogglePower" => self.set_mode(if self.mode == LaserMode::Disabled {
                LaserMode::Normal
            } else {
                LaserMode::Disabled
            }),
            "Laser_Flicker" => {
                self.effects.cancel_all(&mut self.mode);
                self.effects.push(Flicker {
                    rng: StdRng::from_rng(&mut self.rng),
                    elapsed: 0.0,
                    next_toggle: 0.0,
                });
            }
            "Laser_Overload" => {
                self.set_mode(LaserMode::Disabled);
                log::info!("Laser overloaded");
            }
            _ => return false,
        }
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);
        self.effects.tick(&mut self.mode, ctx.time.unscaled);
    }
}
