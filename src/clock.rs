/// Delta times handed to every step function for one frame.
///
/// `scaled` follows the global time scale (bullet time slows it down),
/// `unscaled` is wall-clock and drives UI, cooldowns, fades and charging.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    pub scaled: f32,
    pub unscaled: f32,
    /// Scaled seconds since startup
    pub now: f32,
}

impl FrameTime {
    pub fn new(scaled: f32, unscaled: f32, now: f32) -> Self {
        FrameTime {
            scaled,
            unscaled,
            now,
        }
    }

    /// A frame where both clocks advance by `dt`
    pub fn uniform(dt: f32, now: f32) -> Self {
        FrameTime::new(dt, dt, now)
    }
}

/// Global time scale owned by the scanner.
/// The fixed physics step is scaled with it so simulation stays stable.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeDilation {
    slow_scale: f32,
    normal_fixed_step: f32,
    active: bool,
}

impl TimeDilation {
    pub fn new(slow_scale: f32, normal_fixed_step: f32) -> Self {
        TimeDilation {
            slow_scale,
            normal_fixed_step,
            active: false,
        }
    }

    pub fn enter(&mut self) {
        self.active = true;
    }

    pub fn exit(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn time_scale(&self) -> f32 {
        if self.active { self.slow_scale } else { 1.0 }
    }

    pub fn fixed_step(&self) -> f32 {
        self.normal_fixed_step * self.time_scale()
    }

    /// Build this frame's times from a wall-clock delta
    pub fn frame(&self, unscaled: f32, now: f32) -> FrameTime {
        FrameTime::new(unscaled * self.time_scale(), unscaled, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bullet_time_scales_fixed_step() {
        let mut dilation = TimeDilation::new(0.2, 0.02);
        assert_eq!(dilation.time_scale(), 1.0);
        assert!((dilation.fixed_step() - 0.02).abs() < 1e-6);

        dilation.enter();
        assert_eq!(dilation.time_scale(), 0.2);
        assert!((dilation.fixed_step() - 0.004).abs() < 1e-6);

        let frame = dilation.frame(0.1, 3.0);
        assert!((frame.scaled - 0.02).abs() < 1e-6);
        assert_eq!(frame.unscaled, 0.1);

        dilation.exit();
        assert_eq!(dilation.frame(0.1, 3.0).scaled, 0.1);
    }
}
