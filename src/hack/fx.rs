use crate::effects::{ease_in_out, lerp};

/// Post-processing targets for one mode
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FxProfile {
    /// -100 is greyscale
    pub saturation: f32,
    pub exposure: f32,
    pub vignette: f32,
    pub grain: f32,
}

impl FxProfile {
    pub const NORMAL: FxProfile = FxProfile {
        saturation: 0.0,
        exposure: 0.0,
        vignette: 0.0,
        grain: 0.0,
    };

    pub const SCAN: FxProfile = FxProfile {
        saturation: -100.0,
        exposure: -0.35,
        vignette: 0.18,
        grain: 0.45,
    };

    pub const HACK: FxProfile = FxProfile {
        saturation: -100.0,
        exposure: -0.55,
        vignette: 0.35,
        grain: 0.7,
    };

    fn lerp(self, to: FxProfile, t: f32) -> FxProfile {
        FxProfile {
            saturation: lerp(self.saturation, to.saturation, t),
            exposure: lerp(self.exposure, to.exposure, t),
            vignette: lerp(self.vignette, to.vignette, t),
            grain: lerp(self.grain, to.grain, t),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FxMode {
    Normal,
    ScanIntro,
    Scan,
    Hack,
}

impl FxMode {
    fn profile(self) -> FxProfile {
        match self {
            FxMode::Normal => FxProfile::NORMAL,
            FxMode::ScanIntro | FxMode::Scan => FxProfile::SCAN,
            FxMode::Hack => FxProfile::HACK,
        }
    }

    fn blend_time(self) -> f32 {
        match self {
            FxMode::Hack => 0.22,
            _ => 0.18,
        }
    }
}

/// Screen grading driven by the scanner, blended on the undilated clock.
///
/// Entering the scan intro also starts a radial reveal that grows from the
/// player outward over the intro duration.
#[derive(Debug, Clone)]
pub struct ScreenFx {
    mode: FxMode,
    current: FxProfile,
    from: FxProfile,
    blend_elapsed: f32,
    reveal_duration: f32,
    reveal_elapsed: Option<f32>,
}

const REVEAL_START: f32 = 0.2;
const REVEAL_END: f32 = 1.8;

impl ScreenFx {
    pub fn new(reveal_duration: f32) -> Self {
        ScreenFx {
            mode: FxMode::Normal,
            current: FxProfile::NORMAL,
            from: FxProfile::NORMAL,
            blend_elapsed: 0.0,
            reveal_duration,
            reveal_elapsed: None,
        }
    }

    pub fn mode(&self) -> FxMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: FxMode) {
        if mode == self.mode {
            return;
        }
        self.from = self.current;
        self.blend_elapsed = 0.0;
        self.mode = mode;
        if mode == FxMode::ScanIntro {
            self.reveal_elapsed = Some(0.0);
        }
    }

    pub fn tick(&mut self, unscaled: f32) {
        let duration = self.mode.blend_time();
        self.blend_elapsed = (self.blend_elapsed + unscaled).min(duration);
        self.current = if self.blend_elapsed >= duration {
            self.mode.profile()
        } else {
            self.from
                .lerp(self.mode.profile(), self.blend_elapsed / duration)
        };

        if let Some(elapsed) = self.reveal_elapsed.as_mut() {
            *elapsed += unscaled;
            if *elapsed >= self.reveal_duration {
                self.reveal_elapsed = None;
            }
        }
    }

    pub fn profile(&self) -> FxProfile {
        self.current
    }

    /// Reveal scale while the ring is expanding
    pub fn scan_reveal(&self) -> Option<f32> {
        let elapsed = self.reveal_elapsed?;
        let k = ease_in_out(elapsed / self.reveal_duration.max(1e-4));
        Some(lerp(REVEAL_START, REVEAL_END, k))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_reaches_target() {
        let mut fx = ScreenFx::new(0.35);
        fx.set_mode(FxMode::Hack);
        fx.tick(0.11);
        let halfway = fx.profile();
        assert!(halfway.saturation < 0.0 && halfway.saturation > -100.0);

        fx.tick(0.5);
        assert_eq!(fx.profile(), FxProfile::HACK);

        fx.set_mode(FxMode::Normal);
        fx.tick(1.0);
        assert_eq!(fx.profile(), FxProfile::NORMAL);
    }

    #[test]
    fn test_reveal_only_during_intro() {
        let mut fx = ScreenFx::new(0.35);
        assert_eq!(fx.scan_reveal(), None);

        fx.set_mode(FxMode::ScanIntro);
        assert_eq!(fx.scan_reveal(), Some(REVEAL_START));
        fx.tick(0.2);
        let mid = fx.scan_reveal().unwrap();
        assert!(mid > REVEAL_START && mid < REVEAL_END);

        fx.tick(0.2);
        assert_eq!(fx.scan_reveal(), None);
    }
}
