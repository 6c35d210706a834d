use super::frame::{EdgeAccumulator, RecordedFrame};
use crate::clock::FrameTime;
use crate::config::EchoConfig;
use crate::controls::{Buttons, Controls};
use crate::hack::HackableId;
use bevy::math::{Quat, Vec3};
use std::collections::VecDeque;

/// The most recent committed hack
#[derive(Debug, Clone, PartialEq)]
pub struct LastHackRecord {
    pub target: HackableId,
    pub action_id: String,
    /// Scaled time of the commit
    pub timestamp: f32,
}

/// Everything a ghost needs, decoupled from the live recorder
#[derive(Debug, Clone, PartialEq)]
pub struct EchoSnapshot {
    pub frames: Vec<RecordedFrame>,
    pub interval: f32,
    pub last_hack: Option<LastHackRecord>,
}

/// Rolling history of the player's last few seconds.
///
/// Sampling follows the scaled clock, so bullet time records fewer frames per
/// wall second and the replay plays them back at gameplay speed. The cooldown
/// runs on the undilated clock.
#[derive(Debug, Clone)]
pub struct EchoRecorder {
    config: EchoConfig,
    capacity: usize,
    frames: VecDeque<RecordedFrame>,
    sample_timer: f32,
    last_held: Buttons,
    edges: EdgeAccumulator,
    cooldown_remaining: f32,
    last_hack: Option<LastHackRecord>,
    locked: bool,
    enabled: bool,
}

impl EchoRecorder {
    pub fn new(config: EchoConfig) -> Self {
        let capacity = config.capacity();
        EchoRecorder {
            config,
            capacity,
            frames: VecDeque::with_capacity(capacity + 1),
            sample_timer: 0.0,
            last_held: Buttons::NONE,
            edges: EdgeAccumulator::default(),
            cooldown_remaining: 0.0,
            last_hack: None,
            locked: false,
            enabled: true,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> impl Iterator<Item = &RecordedFrame> {
        self.frames.iter()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// A disabled recorder neither samples, spawns nor cools down
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!("Echo recorder {}", if enabled { "resumed" } else { "jammed" });
        }
        self.enabled = enabled;
    }

    pub fn cooldown_remaining(&self) -> f32 {
        self.cooldown_remaining.max(0.0)
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= 0.0
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn last_hack(&self) -> Option<&LastHackRecord> {
        self.last_hack.as_ref()
    }

    /// Remember a committed hack unless a ghost spawned during this cooldown
    pub fn record_last_hack(&mut self, target: HackableId, action_id: &str, timestamp: f32) {
        if self.locked || action_id.is_empty() {
            return;
        }
        self.last_hack = Some(LastHackRecord {
            target,
            action_id: action_id.to_string(),
            timestamp,
        });
    }

    /// Advance one frame. Returns a snapshot when the echo command spawns a ghost.
    pub fn tick(
        &mut self,
        time: &FrameTime,
        position: Vec3,
        rotation: Quat,
        controls: &Controls,
    ) -> Option<EchoSnapshot> {
        if !self.enabled {
            return None;
        }

        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining -= time.unscaled;
        }
        if self.is_ready() && self.locked {
            self.locked = false;
        }

        self.sample(time.scaled, position, rotation, controls);

        if controls.echo_pressed && self.is_ready() {
            return self.spawn_snapshot();
        }
        None
    }

    fn sample(&mut self, dt: f32, position: Vec3, rotation: Quat, controls: &Controls) {
        self.edges.add(controls.pressed, controls.released);
        self.sample_timer += dt;
        if self.sample_timer < self.config.record_interval {
            return;
        }
        self.sample_timer = 0.0;

        let (pressed, released) = self.edges.take(controls.held, self.last_held);
        self.last_held = controls.held;
        self.frames.push_back(RecordedFrame {
            position,
            rotation,
            held: controls.held,
            pressed,
            released,
        });
        while self.frames.len() > self.capacity {
            self.frames.pop_front();
        }
    }

    fn spawn_snapshot(&mut self) -> Option<EchoSnapshot> {
        if self.frames.len() < 2 {
            return None;
        }
        self.locked = true;
        self.cooldown_remaining = self.config.cooldown;
        log::info!(
            "Echo spawned from {} frames, last hack {:?}",
            self.frames.len(),
            self.last_hack.as_ref().map(|h| h.action_id.as_str())
        );
        Some(EchoSnapshot {
            frames: self.frames.iter().copied().collect(),
            interval: self.config.record_interval,
            last_hack: self.last_hack.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EchoConfig {
        EchoConfig {
            record_duration: 1.0,
            record_interval: 0.1,
            cooldown: 2.05,
        }
    }

    fn step(recorder: &mut EchoRecorder, controls: &Controls) -> Option<EchoSnapshot> {
        recorder.tick(
            &FrameTime::uniform(0.1, 0.0),
            Vec3::ZERO,
            Quat::IDENTITY,
            controls,
        )
    }

    #[test]
    fn test_length_never_exceeds_capacity() {
        let mut recorder = EchoRecorder::new(config());
        assert_eq!(recorder.capacity(), 10);
        for _ in 0..50 {
            step(&mut recorder, &Controls::default());
            assert!(recorder.len() <= 10);
        }
        assert_eq!(recorder.len(), 10);
    }

    #[test]
    fn test_needs_two_frames_to_spawn() {
        let mut recorder = EchoRecorder::new(config());
        assert!(step(&mut recorder, &Controls::default().with_echo()).is_none());
        assert!(recorder.is_ready());
        assert!(!recorder.is_locked());

        assert!(step(&mut recorder, &Controls::default().with_echo()).is_some());
        assert!(!recorder.is_ready());
    }

    #[test]
    fn test_lock_holds_until_cooldown_elapsed() {
        let mut recorder = EchoRecorder::new(config());
        let target = HackableId::new(1, 0);
        recorder.record_last_hack(target, "Door_ToggleLock", 0.0);
        step(&mut recorder, &Controls::default());
        step(&mut recorder, &Controls::default());

        let snapshot = step(&mut recorder, &Controls::default().with_echo()).unwrap();
        assert_eq!(
            snapshot.last_hack.map(|h| h.action_id),
            Some("Door_ToggleLock".to_string())
        );
        assert!(recorder.is_locked());

        // The ghost's own hacks must not overwrite the record
        recorder.record_last_hack(target, "Door_JamOpen", 1.0);
        assert_eq!(recorder.last_hack().unwrap().action_id, "Door_ToggleLock");

        // Pressing echo again during cooldown does nothing
        assert!(step(&mut recorder, &Controls::default().with_echo()).is_none());
        for _ in 0..19 {
            step(&mut recorder, &Controls::default());
        }
        assert!(recorder.is_locked());
        step(&mut recorder, &Controls::default());
        assert!(!recorder.is_locked());

        recorder.record_last_hack(target, "Door_JamOpen", 3.0);
        assert_eq!(recorder.last_hack().unwrap().action_id, "Door_JamOpen");
    }

    #[test]
    fn test_disabled_recorder_is_inert() {
        let mut recorder = EchoRecorder::new(config());
        recorder.set_enabled(false);
        for _ in 0..5 {
            assert!(step(&mut recorder, &Controls::default().with_echo()).is_none());
        }
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_frames_carry_edges() {
        let mut recorder = EchoRecorder::new(config());
        let interact = Buttons {
            interact: true,
            ..Buttons::NONE
        };
        step(&mut recorder, &Controls::from_held(interact, Buttons::NONE));
        step(&mut recorder, &Controls::from_held(interact, interact));
        step(&mut recorder, &Controls::from_held(Buttons::NONE, interact));

        let frames: Vec<_> = recorder.frames().collect();
        assert!(frames[0].pressed.interact);
        assert!(!frames[1].pressed.interact && frames[1].held.interact);
        assert!(frames[2].released.interact);
    }
}
