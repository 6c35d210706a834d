use super::frame::RecordedFrame;
use super::recorder::{EchoSnapshot, LastHackRecord};
use crate::clock::FrameTime;
use crate::config::GhostConfig;
use crate::effects::lerp;
use crate::hack::{ExecuteError, HackableId, HackableWorld};
use crate::services::SpatialQuery;
use bevy::math::{Quat, Vec3};

const SPAWN_SCALE: f32 = 0.95;
const JITTER_FREQUENCY: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GhostPhase {
    /// Fading in, frozen on the first frame
    Appearing { elapsed: f32 },
    Playing,
    Dissolving { elapsed: f32 },
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GhostEvent {
    /// Silent proximity scan, with how many entities blinked
    Scanned { origin: Vec3, blinked: usize },
    Replayed { target: HackableId, action_id: String },
    ReplayFailed(ExecuteError),
    /// Burst into fragments at the end of the dissolve
    Shattered {
        origin: Vec3,
        fragment_count: usize,
        spawn_bounds: Vec3,
    },
}

/// Re-walks a recorded path and re-runs the recorded hack against the live
/// world. Fades and dissolve use the undilated clock, the path itself plays
/// at the recorder's interval on the scaled clock.
#[derive(Debug, Clone)]
pub struct GhostReplayer {
    config: GhostConfig,
    frames: Vec<RecordedFrame>,
    interval: f32,
    last_hack: Option<LastHackRecord>,
    replayed: bool,
    index: usize,
    timer: f32,
    phase: GhostPhase,
    position: Vec3,
    rotation: Quat,
    alpha: f32,
    scale: f32,
}

impl GhostReplayer {
    pub fn new(snapshot: EchoSnapshot, config: GhostConfig) -> Self {
        let (position, rotation) = snapshot
            .frames
            .first()
            .map(|f| (f.position, f.rotation))
            .unwrap_or((Vec3::ZERO, Quat::IDENTITY));
        GhostReplayer {
            config,
            frames: snapshot.frames,
            interval: snapshot.interval,
            last_hack: snapshot.last_hack,
            replayed: false,
            index: 0,
            timer: 0.0,
            phase: GhostPhase::Appearing { elapsed: 0.0 },
            position,
            rotation,
            alpha: 0.0,
            scale: SPAWN_SCALE,
        }
    }

    pub fn phase(&self) -> GhostPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == GhostPhase::Finished
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Index of the next frame to play
    pub fn frame_index(&self) -> usize {
        self.index
    }

    /// Recorded positions, for drawing the time trail
    pub fn path(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.frames.iter().map(|f| f.position)
    }

    /// Remove the ghost right away, skipping the dissolve. Idempotent.
    pub fn cancel(&mut self) {
        if self.phase != GhostPhase::Finished {
            log::debug!("Ghost cancelled at frame {}", self.index);
        }
        self.phase = GhostPhase::Finished;
        self.alpha = 0.0;
    }

    pub fn update(
        &mut self,
        time: &FrameTime,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
    ) -> Vec<GhostEvent> {
        let mut events = Vec::new();
        match self.phase {
            GhostPhase::Appearing { elapsed } => self.appear(elapsed + time.unscaled),
            GhostPhase::Playing => self.play(time.scaled, world, spatial, &mut events),
            GhostPhase::Dissolving { elapsed } => {
                self.dissolve(elapsed + time.unscaled, &mut events)
            }
            GhostPhase::Finished => {}
        }
        events
    }

    fn appear(&mut self, elapsed: f32) {
        let duration = self.config.spawn_duration.max(1e-4);
        let k = (elapsed / duration).min(1.0);
        if k >= 1.0 {
            self.alpha = 1.0;
            self.scale = 1.0;
            self.phase = GhostPhase::Playing;
            return;
        }
        let jitter = (elapsed * JITTER_FREQUENCY).sin() * self.config.spawn_jitter * (1.0 - k);
        self.alpha = k;
        self.scale = lerp(SPAWN_SCALE, 1.0, k) + jitter;
        self.phase = GhostPhase::Appearing { elapsed };
    }

    fn play(
        &mut self,
        dt: f32,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
        events: &mut Vec<GhostEvent>,
    ) {
        self.timer += dt;
        if self.timer < self.interval {
            return;
        }
        self.timer = 0.0;

        let Some(frame) = self.frames.get(self.index).copied() else {
            self.phase = GhostPhase::Dissolving { elapsed: 0.0 };
            return;
        };
        self.position = frame.position;
        self.rotation = frame.rotation;

        if frame.pressed.scan {
            events.push(self.scan_once(world, spatial));
        }
        if frame.pressed.interact {
            if let Some(event) = self.replay_hack(world) {
                events.push(event);
            }
        }

        self.index += 1;
        if self.index >= self.frames.len() {
            self.phase = GhostPhase::Dissolving { elapsed: 0.0 };
        }
    }

    fn dissolve(&mut self, elapsed: f32, events: &mut Vec<GhostEvent>) {
        let duration = self.config.dissolve_duration.max(1e-4);
        let k = (elapsed / duration).min(1.0);
        self.alpha = 1.0 - k;
        if k < 1.0 {
            self.phase = GhostPhase::Dissolving { elapsed };
            return;
        }
        events.push(GhostEvent::Shattered {
            origin: self.position,
            fragment_count: self.config.fragment_count,
            spawn_bounds: self.config.fragment_bounds(),
        });
        self.phase = GhostPhase::Finished;
    }

    fn scan_once(&self, world: &mut HackableWorld, spatial: &dyn SpatialQuery) -> GhostEvent {
        let blinked = spatial
            .overlap_sphere(self.position, self.config.scan_radius)
            .into_iter()
            .filter(|&id| world.on_scanned_once(id))
            .count();
        GhostEvent::Scanned {
            origin: self.position,
            blinked,
        }
    }

    /// Runs at most once per ghost
    fn replay_hack(&mut self, world: &mut HackableWorld) -> Option<GhostEvent> {
        if self.replayed {
            return None;
        }
        let record = self.last_hack.as_ref()?;
        self.replayed = true;

        match world.execute_action(record.target, &record.action_id) {
            Ok(()) => {
                log::debug!("Ghost replayed {} on {}", record.action_id, record.target);
                Some(GhostEvent::Replayed {
                    target: record.target,
                    action_id: record.action_id.clone(),
                })
            }
            Err(e) => {
                log::debug!("Ghost could not replay hack: {}", e);
                Some(GhostEvent::ReplayFailed(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::Buttons;
    use crate::hack::HackableEntity;
    use crate::objects::{Door, Laser};
    use crate::services::SceneQuery;

    const INTERACT: Buttons = Buttons {
        scan: false,
        interact: true,
        confirm: false,
    };

    fn snapshot(frames: Vec<RecordedFrame>, last_hack: Option<LastHackRecord>) -> EchoSnapshot {
        EchoSnapshot {
            frames,
            interval: 0.05,
            last_hack,
        }
    }

    fn walk(len: usize, press_at: &[usize]) -> Vec<RecordedFrame> {
        (0..len)
            .map(|i| {
                let frame = RecordedFrame::at(Vec3::new(i as f32, 0.0, 0.0), Quat::IDENTITY);
                if press_at.contains(&i) {
                    frame.with_pressed(INTERACT)
                } else {
                    frame
                }
            })
            .collect()
    }

    fn record(target: HackableId, action_id: &str) -> Option<LastHackRecord> {
        Some(LastHackRecord {
            target,
            action_id: action_id.to_string(),
            timestamp: 0.0,
        })
    }

    /// Durations that are exact multiples of the test step
    fn fast() -> GhostConfig {
        GhostConfig {
            spawn_duration: 0.1,
            dissolve_duration: 0.1,
            ..GhostConfig::default()
        }
    }

    fn run(
        ghost: &mut GhostReplayer,
        world: &mut HackableWorld,
        frames: usize,
    ) -> Vec<GhostEvent> {
        let scene = SceneQuery::new();
        let mut events = Vec::new();
        for _ in 0..frames {
            events.extend(ghost.update(&FrameTime::uniform(0.05, 0.0), world, &scene));
        }
        events
    }

    fn door_locked(world: &HackableWorld, id: HackableId) -> bool {
        match world.get(id) {
            Some(HackableEntity::Door(door)) => door.is_locked(),
            _ => panic!("door missing"),
        }
    }

    #[test]
    fn test_appears_frozen_on_first_frame() {
        let mut world = HackableWorld::new();
        let mut ghost = GhostReplayer::new(snapshot(walk(4, &[]), None), GhostConfig::default());
        assert_eq!(ghost.alpha(), 0.0);
        assert_eq!(ghost.scale(), SPAWN_SCALE);

        run(&mut ghost, &mut world, 3);
        assert!(matches!(ghost.phase(), GhostPhase::Appearing { .. }));
        assert!(ghost.alpha() > 0.0 && ghost.alpha() < 1.0);
        assert_eq!(ghost.position(), Vec3::ZERO);

        run(&mut ghost, &mut world, 4);
        assert_eq!(ghost.phase(), GhostPhase::Playing);
        assert_eq!(ghost.alpha(), 1.0);
        assert_eq!(ghost.scale(), 1.0);
    }

    #[test]
    fn test_replay_executes_exactly_once() {
        let mut world = HackableWorld::new();
        let door = world.spawn(HackableEntity::Door(Door::new("Door", Vec3::ZERO)));
        // Two interact presses in the recording, one replayed hack
        let frames = walk(6, &[1, 4]);
        let mut ghost = GhostReplayer::new(
            snapshot(frames, record(door, "Door_ToggleLock")),
            GhostConfig::default(),
        );

        let events = run(&mut ghost, &mut world, 40);
        let replays = events
            .iter()
            .filter(|e| matches!(e, GhostEvent::Replayed { .. }))
            .count();
        assert_eq!(replays, 1);
        assert!(!door_locked(&world, door));
    }

    #[test]
    fn test_missing_action_runs_nothing() {
        let mut world = HackableWorld::new();
        let laser = world.spawn(HackableEntity::Laser(Laser::new(Vec3::ZERO)));
        let mut ghost = GhostReplayer::new(
            snapshot(walk(3, &[0]), record(laser, "Door_ToggleLock")),
            GhostConfig::default(),
        );

        let events = run(&mut ghost, &mut world, 20);
        assert!(events.iter().any(|e| matches!(
            e,
            GhostEvent::ReplayFailed(ExecuteError::ActionUnavailable { .. })
        )));
        match world.get(laser) {
            Some(HackableEntity::Laser(l)) => assert_eq!(l.damage_factor(), 1.0),
            _ => panic!("laser missing"),
        }
    }

    #[test]
    fn test_gone_target_fails_softly() {
        let mut world = HackableWorld::new();
        let door = world.spawn(HackableEntity::Door(Door::new("Door", Vec3::ZERO)));
        world.despawn(door);
        let mut ghost = GhostReplayer::new(
            snapshot(walk(3, &[0]), record(door, "Door_ToggleLock")),
            GhostConfig::default(),
        );

        let events = run(&mut ghost, &mut world, 20);
        assert!(events.contains(&GhostEvent::ReplayFailed(ExecuteError::TargetGone(door))));
    }

    #[test]
    fn test_dissolves_then_shatters() {
        let mut world = HackableWorld::new();
        let mut ghost = GhostReplayer::new(snapshot(walk(2, &[]), None), fast());

        // Two ticks to appear, then one per frame
        run(&mut ghost, &mut world, 2);
        assert_eq!(ghost.phase(), GhostPhase::Playing);
        run(&mut ghost, &mut world, 2);
        assert!(matches!(ghost.phase(), GhostPhase::Dissolving { .. }));
        assert_eq!(ghost.position(), Vec3::new(1.0, 0.0, 0.0));

        let events = run(&mut ghost, &mut world, 2);
        assert!(ghost.is_finished());
        assert_eq!(
            events,
            vec![GhostEvent::Shattered {
                origin: Vec3::new(1.0, 0.0, 0.0),
                fragment_count: 60,
                spawn_bounds: Vec3::new(0.7, 1.8, 0.4),
            }]
        );
        assert!(run(&mut ghost, &mut world, 3).is_empty());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut world = HackableWorld::new();
        let mut ghost = GhostReplayer::new(snapshot(walk(5, &[]), None), GhostConfig::default());
        run(&mut ghost, &mut world, 8);

        ghost.cancel();
        assert!(ghost.is_finished());
        ghost.cancel();
        assert!(ghost.is_finished());
        assert_eq!(ghost.alpha(), 0.0);
        assert!(run(&mut ghost, &mut world, 20).is_empty());
    }
}
