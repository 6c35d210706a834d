//! Multi-frame effects as resumable step objects.
//!
//! An effect is advanced once per frame against the state it animates and
//! reports whether it wants more frames. Cancelling drops every pending effect
//! after giving each one a chance to put its target back into a clean state.

/// Outcome of one `Effect::advance` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectStep {
    Continue,
    Done,
}

pub trait Effect<T>: Send + Sync {
    fn advance(&mut self, target: &mut T, dt: f32) -> EffectStep;

    /// Called when the effect is dropped before finishing
    fn cancel(&mut self, _target: &mut T) {}
}

/// Ordered list of running effects over one target type
pub struct ActiveEffects<T> {
    effects: Vec<Box<dyn Effect<T>>>,
}

impl<T> Default for ActiveEffects<T> {
    fn default() -> Self {
        ActiveEffects {
            effects: Vec::new(),
        }
    }
}

impl<T> std::fmt::Debug for ActiveEffects<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveEffects")
            .field("len", &self.effects.len())
            .finish()
    }
}

impl<T> ActiveEffects<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: impl Effect<T> + 'static) {
        self.effects.push(Box::new(effect));
    }

    /// Advance every effect once, dropping those that finished
    pub fn tick(&mut self, target: &mut T, dt: f32) {
        self.effects
            .retain_mut(|effect| effect.advance(target, dt) == EffectStep::Continue);
    }

    /// Stop everything now. Safe to call repeatedly.
    pub fn cancel_all(&mut self, target: &mut T) {
        for mut effect in self.effects.drain(..) {
            effect.cancel(target);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }
}

/// Linear interpolation with `t` clamped to [0, 1]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t.clamp(0.0, 1.0)
}

/// Smooth ease-in-out over [0, 1]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts up by `dt` until reaching `limit`, resets on cancel
    struct CountTo {
        limit: f32,
    }

    impl Effect<f32> for CountTo {
        fn advance(&mut self, target: &mut f32, dt: f32) -> EffectStep {
            *target += dt;
            if *target >= self.limit {
                EffectStep::Done
            } else {
                EffectStep::Continue
            }
        }

        fn cancel(&mut self, target: &mut f32) {
            *target = 0.0;
        }
    }

    #[test]
    fn test_finished_effects_are_dropped() {
        let mut effects = ActiveEffects::new();
        let mut value = 0.0;
        effects.push(CountTo { limit: 0.25 });

        effects.tick(&mut value, 0.1);
        effects.tick(&mut value, 0.1);
        assert_eq!(effects.len(), 1);
        effects.tick(&mut value, 0.1);
        assert!(effects.is_empty());
    }

    #[test]
    fn test_cancel_all_is_idempotent() {
        let mut effects = ActiveEffects::new();
        let mut value = 0.0;
        effects.push(CountTo { limit: 10.0 });
        effects.tick(&mut value, 1.0);
        assert_eq!(value, 1.0);

        effects.cancel_all(&mut value);
        assert_eq!(value, 0.0);
        assert!(effects.is_empty());

        value = 5.0;
        effects.cancel_all(&mut value);
        assert_eq!(value, 5.0);

        // Nothing left to advance
        effects.tick(&mut value, 1.0);
        assert_eq!(value, 5.0);
    }

    #[test]
    fn test_lerp_and_ease_clamp() {
        assert_eq!(lerp(2.0, 22.0, 0.5), 12.0);
        assert_eq!(lerp(2.0, 22.0, 3.0), 22.0);
        assert_eq!(ease_in_out(0.0), 0.0);
        assert_eq!(ease_in_out(1.0), 1.0);
        assert_eq!(ease_in_out(0.5), 0.5);
    }
}
